use thiserror::Error;

use crate::config::ConfigError;

/// Why a single fetch produced no reading. Recovered locally by the scheduler.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("endpoint returned status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Payload(String),
}

impl FetchError {
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        FetchError::Payload(value.to_string())
    }
}

/// Errors that end the process.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("display error: {0}")]
    Display(String),

    #[error("indicator error: {0}")]
    Indicator(String),

    #[cfg(feature = "gpio_buttons")]
    #[error("input error: {0}")]
    Input(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not build http client: {0}")]
    Client(reqwest::Error),

    #[error("could not install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
