//! Macros for engine error handling.
//!
//! Convenience macros for creating and returning [`crate::error::MigError`]
//! instances with reduced boilerplate.

/// Creates a [`crate::error::MigError`] from an error kind and description.
#[macro_export]
macro_rules! mig_error {
    ($kind:expr, $desc:expr) => {
        MigError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        MigError::from(($kind, $desc, $detail.to_string()))
    };
}

/// Creates and returns a [`crate::error::MigError`] from the current function.
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return Err($crate::mig_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return Err($crate::mig_error!($kind, $desc, $detail))
    };
}
