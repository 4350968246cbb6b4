use std::error;
use std::fmt;

/// Convenient result type for engine operations using [`MigError`] as the error type.
pub type MigResult<T> = Result<T, MigError>;

/// Main error type for the migration engine.
///
/// [`MigError`] can represent single errors, errors with additional detail,
/// or multiple aggregated errors, which is what the orchestrator reports
/// when more than one table worker fails.
#[derive(Debug, Clone)]
pub struct MigError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Error with kind and static description.
    WithDescription(ErrorKind, &'static str),
    /// Error with kind, static description, and dynamic detail.
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
    /// Multiple aggregated errors.
    Many(Vec<MigError>),
}

/// Categories of errors that can occur during a migration run.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Listing tables or counting rows failed.
    SchemaQueryFailed,
    /// A batch or scan-window select failed.
    BatchReadFailed,
    /// A batch insert or row update against the target database failed.
    BatchWriteFailed,
    /// A checkpoint store read or write failed.
    CheckpointFailed,
    /// The operation was cancelled by the host runtime.
    Cancelled,
    /// Configuration was missing or invalid.
    ConfigError,
    /// A row value could not be decoded or encoded.
    InvalidData,
    /// Unknown / uncategorized.
    Unknown,
}

impl MigError {
    /// Creates a [`MigError`] containing multiple aggregated errors.
    pub fn many(errors: Vec<MigError>) -> MigError {
        MigError {
            repr: ErrorRepr::Many(errors),
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For multiple errors, returns the kind of the first error or
    /// [`ErrorKind::Unknown`] if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => kind,
            ErrorRepr::Many(ref errors) => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => vec![kind],
            ErrorRepr::Many(ref errors) => errors
                .iter()
                .flat_map(|err| err.kinds())
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the detailed error information if available.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::WithDescriptionAndDetail(_, _, ref detail) => Some(detail.as_str()),
            ErrorRepr::Many(ref errors) => errors.iter().find_map(|e| e.detail()),
            _ => None,
        }
    }
}

impl fmt::Display for MigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)
            }
            ErrorRepr::WithDescriptionAndDetail(kind, desc, ref detail) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;
                f.write_str(" -> ")?;
                detail.fmt(f)
            }
            ErrorRepr::Many(ref errors) => {
                if errors.is_empty() {
                    write!(f, "Multiple errors occurred (empty)")
                } else if errors.len() == 1 {
                    errors[0].fmt(f)
                } else {
                    write!(f, "Multiple errors occurred ({} total):", errors.len())?;
                    for (i, error) in errors.iter().enumerate() {
                        write!(f, "\n  {}: {}", i + 1, error)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

impl error::Error for MigError {}

/// Creates a [`MigError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for MigError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> MigError {
        MigError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

/// Creates a [`MigError`] from an error kind, static description, and dynamic detail.
impl From<(ErrorKind, &'static str, String)> for MigError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> MigError {
        MigError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

/// Creates a [`MigError`] from a vector of errors for aggregation.
impl<E> From<Vec<E>> for MigError
where
    E: Into<MigError>,
{
    fn from(errors: Vec<E>) -> MigError {
        MigError::many(errors.into_iter().map(Into::into).collect())
    }
}

/// Converts [`redis::RedisError`] to [`MigError`] with [`ErrorKind::CheckpointFailed`].
///
/// Redis is only ever reached for checkpoints, so the mapping is unambiguous.
impl From<redis::RedisError> for MigError {
    fn from(err: redis::RedisError) -> MigError {
        MigError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::CheckpointFailed,
                "Checkpoint store operation failed",
                err.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bail, mig_error};

    #[test]
    fn simple_error_creation() {
        let err = MigError::from((ErrorKind::SchemaQueryFailed, "Listing tables failed"));
        assert_eq!(err.kind(), ErrorKind::SchemaQueryFailed);
        assert_eq!(err.detail(), None);
        assert_eq!(err.kinds(), vec![ErrorKind::SchemaQueryFailed]);
    }

    #[test]
    fn error_with_detail() {
        let err = MigError::from((
            ErrorKind::BatchReadFailed,
            "Batch select failed",
            "relation \"users\" does not exist".to_string(),
        ));
        assert_eq!(err.kind(), ErrorKind::BatchReadFailed);
        assert_eq!(err.detail(), Some("relation \"users\" does not exist"));
    }

    #[test]
    fn multiple_errors() {
        let errors = vec![
            MigError::from((ErrorKind::BatchWriteFailed, "Insert failed")),
            MigError::from((ErrorKind::CheckpointFailed, "Offset write failed")),
        ];
        let multi_err = MigError::many(errors);

        assert_eq!(multi_err.kind(), ErrorKind::BatchWriteFailed);
        assert_eq!(
            multi_err.kinds(),
            vec![ErrorKind::BatchWriteFailed, ErrorKind::CheckpointFailed]
        );
    }

    #[test]
    fn from_vector_aggregates() {
        let errors = vec![
            MigError::from((ErrorKind::BatchReadFailed, "Read failed")),
            MigError::from((ErrorKind::BatchWriteFailed, "Write failed")),
        ];
        let multi_err: MigError = errors.into();
        assert_eq!(multi_err.kinds().len(), 2);
    }

    #[test]
    fn empty_multiple_errors() {
        let multi_err = MigError::many(vec![]);
        assert_eq!(multi_err.kind(), ErrorKind::Unknown);
        assert_eq!(multi_err.kinds(), vec![]);
        assert_eq!(multi_err.detail(), None);
    }

    #[test]
    fn multiple_errors_display() {
        let errors = vec![
            MigError::from((ErrorKind::BatchReadFailed, "Read failed")),
            MigError::from((ErrorKind::Cancelled, "Worker cancelled")),
        ];
        let display_str = format!("{}", MigError::many(errors));
        assert!(display_str.contains("Multiple errors"));
        assert!(display_str.contains("2 total"));
    }

    #[test]
    fn macro_usage() {
        let err = mig_error!(ErrorKind::InvalidData, "Unsupported column type");
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert_eq!(err.detail(), None);

        let err_with_detail = mig_error!(
            ErrorKind::InvalidData,
            "Unsupported column type",
            "macaddr"
        );
        assert_eq!(err_with_detail.detail(), Some("macaddr"));
    }

    #[test]
    fn bail_macro() {
        fn fails() -> MigResult<i32> {
            bail!(ErrorKind::Cancelled, "Test cancellation");
        }

        let err = fails().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }
}
