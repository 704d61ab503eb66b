use serde::Deserialize;

use crate::error::FetchError;
use crate::http::success_body;
use crate::readings::EnergyReading;

const GRID_CHANNEL: usize = 0;
const SOLAR_CHANNEL: usize = 1;
const UNKNOWN_TIME: &str = "--:--";

/// Local Shelly EM energy meter, read through its `/status` endpoint.
pub struct ShellyEmApi {
    status_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct Emeter {
    power: f64,
}

#[derive(Deserialize)]
struct StatusResponse {
    emeters: Vec<Emeter>,
    #[serde(default)]
    time: Option<String>,
}

impl TryFrom<StatusResponse> for EnergyReading {
    type Error = FetchError;

    fn try_from(status: StatusResponse) -> Result<Self, Self::Error> {
        let channel_kw = |index: usize| {
            status
                .emeters
                .get(index)
                .map(|meter| meter.power / 1000.0)
                .ok_or_else(|| {
                    FetchError::Payload(format!(
                        "expected at least {} meter channels, got {}",
                        SOLAR_CHANNEL + 1,
                        status.emeters.len()
                    ))
                })
        };

        let grid_kw = channel_kw(GRID_CHANNEL)?;
        let solar_kw = channel_kw(SOLAR_CHANNEL)?;

        let time = match status.time {
            Some(time) if !time.trim().is_empty() => time,
            _ => UNKNOWN_TIME.to_owned(),
        };

        Ok(EnergyReading::new(grid_kw, solar_kw, time))
    }
}

pub fn parse_status(body: &[u8]) -> Result<EnergyReading, FetchError> {
    serde_json::from_slice::<StatusResponse>(body)?.try_into()
}

impl ShellyEmApi {
    pub fn new(status_url: String, client: reqwest::Client) -> ShellyEmApi {
        ShellyEmApi { status_url, client }
    }

    pub async fn get_reading(&self) -> Result<EnergyReading, FetchError> {
        let response = self.client.get(&self.status_url).send().await?;
        let body = success_body(response).await?;

        parse_status(&body)
    }
}
