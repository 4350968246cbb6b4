use std::fmt;
use std::io::Error;
use std::str::FromStr;

/// Environment variable name containing the environment identifier.
const APP_ENVIRONMENT_ENV_NAME: &str = "APP_ENVIRONMENT";

/// Runtime environment for the validator.
///
/// The validator changes behavior on a single axis: deployed instances
/// log JSON for collection, local ones log for a terminal. Unset defaults
/// to [`Environment::Prod`] so a deployment that forgets the variable
/// still logs something a collector can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Deployed instance.
    Prod,
    /// Local development.
    Dev,
}

impl Environment {
    /// Loads the environment from the `APP_ENVIRONMENT` environment variable.
    pub fn load() -> Result<Environment, Error> {
        match std::env::var(APP_ENVIRONMENT_ENV_NAME) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Environment::Prod),
        }
    }

    /// Sets the `APP_ENVIRONMENT` environment variable to this environment's value.
    pub fn set(&self) {
        unsafe { std::env::set_var(APP_ENVIRONMENT_ENV_NAME, self.as_str()) }
    }

    /// Returns whether this is a deployed instance.
    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Dev => "dev",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prod" => Ok(Self::Prod),
            "dev" => Ok(Self::Dev),
            other => Err(Error::other(format!(
                "{other} is not a supported environment, use `prod` or `dev`",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
    }

    #[test]
    fn only_prod_counts_as_deployed() {
        assert!(Environment::Prod.is_prod());
        assert!(!Environment::Dev.is_prod());
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!("staging".parse::<Environment>().is_err());
    }
}
