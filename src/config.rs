use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_SOLAX_API_URL: &str =
    "https://global.solaxcloud.com/api/v2/dataAccess/realtimeInfo/get";
pub const DEFAULT_WEATHER_API_URL: &str = "https://wttr.in";
pub const DEFAULT_WEATHER_CITY: &str = "Albury";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

/// Which remote source the panel polls, with everything needed to reach it.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    ShellyEm {
        status_url: String,
    },
    SolaxCloud {
        api_url: String,
        token_id: String,
        wifi_sn: String,
    },
    Wttr {
        base_url: String,
        city: String,
    },
}

impl Source {
    fn default_refresh_interval(&self) -> Duration {
        match self {
            Source::Wttr { .. } => Duration::from_secs(900),
            _ => Duration::from_secs(60),
        }
    }
}

/// Settings for the whole process. Built once at startup and only ever borrowed afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: Source,
    pub wifi: Option<WifiCredentials>,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    /// Number of link status checks made per connect attempt.
    pub connect_attempts: u32,
    pub connect_poll: Duration,
    pub reconnect_settle: Duration,
    pub idle_poll: Duration,
    pub manual_debounce: Duration,
    pub startup_delay: Duration,
    pub fail_blink: Duration,
    pub button_pins: Vec<u64>,
    pub display_i2c_device: String,
    pub led_spi_device: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let source = match require("PANEL_SOURCE")?.trim().to_ascii_lowercase().as_str() {
            "shelly" => Source::ShellyEm {
                status_url: require("SHELLY_URL")?,
            },
            "solax" => Source::SolaxCloud {
                api_url: get("SOLAX_API_URL").unwrap_or_else(|| DEFAULT_SOLAX_API_URL.into()),
                token_id: require("SOLAX_TOKEN_ID")?,
                wifi_sn: require("SOLAX_WIFI_SN")?,
            },
            "weather" => Source::Wttr {
                base_url: get("WEATHER_API_URL").unwrap_or_else(|| DEFAULT_WEATHER_API_URL.into()),
                city: get("WEATHER_CITY").unwrap_or_else(|| DEFAULT_WEATHER_CITY.into()),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "PANEL_SOURCE",
                    value: other.to_owned(),
                })
            }
        };

        let wifi = get("WIFI_SSID").map(|ssid| WifiCredentials {
            ssid,
            password: lookup("WIFI_PASSWORD").unwrap_or_default(),
        });

        let refresh_interval = match parse::<u64>(&get, "REFRESH_INTERVAL_SECS")? {
            Some(secs) => Duration::from_secs(secs),
            None => source.default_refresh_interval(),
        };

        let button_pins = match get("BUTTON_PINS") {
            Some(raw) => raw
                .split(',')
                .map(|pin| {
                    pin.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                        key: "BUTTON_PINS",
                        value: raw.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => vec![12, 13, 14, 15],
        };

        Ok(Config {
            source,
            wifi,
            refresh_interval,
            request_timeout: Duration::from_secs(
                parse(&get, "REQUEST_TIMEOUT_SECS")?.unwrap_or(10),
            ),
            connect_attempts: parse(&get, "CONNECT_ATTEMPTS")?.unwrap_or(15),
            connect_poll: Duration::from_secs(1),
            reconnect_settle: Duration::from_secs(10),
            idle_poll: Duration::from_millis(100),
            manual_debounce: Duration::from_millis(500),
            startup_delay: Duration::from_secs(2),
            fail_blink: Duration::from_secs(1),
            button_pins,
            display_i2c_device: get("DISPLAY_I2C_DEVICE").unwrap_or_else(|| "/dev/i2c-1".into()),
            led_spi_device: get("LED_SPI_DEVICE").unwrap_or_else(|| "/dev/spidev0.0".into()),
        })
    }
}

fn parse<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    get(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::Invalid { key, value })
        })
        .transpose()
}
