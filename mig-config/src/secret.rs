use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A password loaded from the environment.
///
/// Wraps [`Secret<String>`] so the value is redacted in debug output.
/// Only deserialization is implemented: the validator reads credentials
/// in, it never writes them back out.
#[derive(Clone)]
pub struct Password(Secret<String>);

impl Password {
    /// Exposes the underlying password for building connection options.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self(Secret::new(value))
    }
}

impl<'de> Deserialize<'de> for Password {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_value() {
        let password = Password::from("hunter2".to_string());
        let debug = format!("{password:?}");

        assert!(!debug.contains("hunter2"));
        assert_eq!(password.expose(), "hunter2");
    }
}
