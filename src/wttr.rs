use crate::error::FetchError;
use crate::http::success_body;
use crate::readings::WeatherReading;

/// wttr.in one-line format: condition and temperature.
const FORMAT: &str = "%C,%t";

pub struct WttrApi {
    url: String,
    client: reqwest::Client,
}

pub fn report_url(base_url: &str, city: &str) -> String {
    format!(
        "{}/{}?format={}",
        base_url.trim_end_matches('/'),
        city.trim().replace(' ', "+"),
        FORMAT
    )
}

/// Parses a `condition,temperature` line.
pub fn parse_report(body: &str) -> Result<WeatherReading, FetchError> {
    let (description, temperature) = body
        .trim()
        .split_once(',')
        .ok_or_else(|| FetchError::Payload(format!("expected condition,temperature: {body:?}")))?;

    let (description, temperature) = (description.trim(), temperature.trim());

    if description.is_empty() || temperature.is_empty() {
        return Err(FetchError::Payload(format!(
            "empty field in weather report: {body:?}"
        )));
    }

    Ok(WeatherReading {
        description: description.to_owned(),
        temperature: temperature.to_owned(),
    })
}

impl WttrApi {
    pub fn new(base_url: &str, city: &str, client: reqwest::Client) -> WttrApi {
        WttrApi {
            url: report_url(base_url, city),
            client,
        }
    }

    pub async fn get_reading(&self) -> Result<WeatherReading, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let body = success_body(response).await?;
        let text = String::from_utf8(body)
            .map_err(|e| FetchError::Payload(format!("report is not utf-8: {e}")))?;

        parse_report(&text)
    }
}
