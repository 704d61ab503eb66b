use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::http::success_body;
use crate::readings::InverterReading;

/// Solax cloud realtime endpoint for a single inverter, identified by its wifi dongle serial.
pub struct SolaxApi {
    api_url: String,
    token_id: String,
    wifi_sn: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RealtimeRequest<'a> {
    wifi_sn: &'a str,
}

#[derive(Deserialize)]
struct RealtimeResult {
    acpower: f64,
    yieldtoday: f64,
}

#[derive(Deserialize)]
struct RealtimeResponse {
    success: bool,
    #[serde(default)]
    exception: Option<String>,
    #[serde(default)]
    result: Option<RealtimeResult>,
}

impl TryFrom<RealtimeResponse> for InverterReading {
    type Error = FetchError;

    fn try_from(response: RealtimeResponse) -> Result<Self, Self::Error> {
        if !response.success {
            return Err(FetchError::Payload(format!(
                "api reported failure: {}",
                response.exception.as_deref().unwrap_or("no reason given")
            )));
        }

        let result = response
            .result
            .ok_or_else(|| FetchError::Payload("success without a result".into()))?;

        Ok(InverterReading {
            power_kw: result.acpower / 1000.0,
            yield_today_kwh: result.yieldtoday,
        })
    }
}

pub fn parse_realtime(body: &[u8]) -> Result<InverterReading, FetchError> {
    serde_json::from_slice::<RealtimeResponse>(body)?.try_into()
}

impl SolaxApi {
    pub fn new(
        api_url: String,
        token_id: String,
        wifi_sn: String,
        client: reqwest::Client,
    ) -> SolaxApi {
        SolaxApi {
            api_url,
            token_id,
            wifi_sn,
            client,
        }
    }

    pub async fn get_reading(&self) -> Result<InverterReading, FetchError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("tokenId", &self.token_id)
            .json(&RealtimeRequest {
                wifi_sn: &self.wifi_sn,
            })
            .send()
            .await?;
        let body = success_body(response).await?;

        parse_realtime(&body)
    }
}
