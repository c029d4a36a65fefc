use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] fintools_core::ConfigError),

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Argument(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

/// Exit code when a tool returned an `Error: ...` result.
pub const TOOL_FAILURE_EXIT_CODE: u8 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_problems_exit_with_two() {
        let error = CliError::from(fintools_core::ConfigError::Missing("MASSIVE_API_KEY"));
        assert_eq!(error.exit_code(), 2);
        assert_eq!(CliError::Argument(String::from("x")).exit_code(), 2);
    }

    #[test]
    fn io_errors_exit_with_ten() {
        let error = CliError::from(std::io::Error::other("closed pipe"));
        assert_eq!(error.exit_code(), 10);
    }
}
