use std::time::Duration;

use crate::error::{FetchError, PanelError};

pub fn build_client(timeout: Duration) -> Result<reqwest::Client, PanelError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(PanelError::Client)
}

/// Body of a successful response; anything outside 2xx is reported as a status failure.
pub async fn success_body(response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
    let status = response.status();

    if !status.is_success() {
        log::warn!("Request to {} responded with status {}", response.url(), status);
        return Err(FetchError::Status(status.as_u16()));
    }

    Ok(response.bytes().await?.to_vec())
}
