//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use rideview_config::ConfigError;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const STARTUP: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(rideview::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             URL: {url}\n\
             Try: rideview ping"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: rideview_api::Error,
    },

    #[error("The backend did not provide a usable base-map style")]
    #[diagnostic(
        code(rideview::no_style),
        help(
            "The map cannot initialize without a style URL.\n\
             Check the backend's /tileserver-url endpoint."
        )
    )]
    StyleUnavailable {
        #[source]
        source: rideview_api::Error,
    },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rideview::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(rideview::config))]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(code(rideview::api))]
    Api(#[from] rideview_api::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::StyleUnavailable { .. } => exit_code::STARTUP,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}
