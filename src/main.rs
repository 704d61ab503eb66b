// this dependency side steps a cross compilation error where the default reqwest crate depends on openssl
extern crate reqwest_rustls_tls as reqwest;

mod buttons;
mod config;
#[cfg(not(feature = "i2c_display"))]
mod console_display;
mod energy_panel;
mod error;
mod graphics_surface;
mod http;
#[cfg(feature = "i2c_display")]
mod i2c_display;
mod indicator;
mod inverter_panel;
mod panel;
mod readings;
mod scheduler;
mod shelly_em;
mod solax_cloud;
mod surface;
#[cfg(test)]
mod testing;
mod weather_panel;
mod wifi;
mod wttr;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dotenv::dotenv;

use crate::buttons::RefreshInputs;
use crate::config::{Config, Source};
use crate::energy_panel::EnergyPanel;
use crate::error::PanelError;
use crate::indicator::StatusLight;
use crate::inverter_panel::InverterPanel;
use crate::panel::Panel;
use crate::scheduler::{RefreshScheduler, Startup};
use crate::shelly_em::ShellyEmApi;
use crate::solax_cloud::SolaxApi;
use crate::surface::Surface;
use crate::weather_panel::WeatherPanel;
use crate::wifi::{Connectivity, HostLink, NmcliLink, SystemLink};
use crate::wttr::WttrApi;

#[cfg(feature = "i2c_display")]
fn open_surface(config: &Config) -> Result<Box<dyn Surface>, PanelError> {
    Ok(Box::new(i2c_display::RaspiDisplay::open(
        &config.display_i2c_device,
    )?))
}

#[cfg(not(feature = "i2c_display"))]
fn open_surface(_config: &Config) -> Result<Box<dyn Surface>, PanelError> {
    Ok(Box::new(console_display::ConsoleDisplay::new(
        surface::PANEL_FRAME.width,
        surface::PANEL_FRAME.height,
    )))
}

#[cfg(feature = "rgb_led")]
fn open_light(config: &Config) -> Result<Box<dyn StatusLight>, PanelError> {
    Ok(Box::new(indicator::Ws2812Light::open(&config.led_spi_device)?))
}

#[cfg(not(feature = "rgb_led"))]
fn open_light(_config: &Config) -> Result<Box<dyn StatusLight>, PanelError> {
    Ok(Box::<indicator::ConsoleLight>::default())
}

#[cfg(feature = "gpio_buttons")]
fn open_inputs(config: &Config) -> Result<RefreshInputs, PanelError> {
    let buttons = config
        .button_pins
        .iter()
        .map(|&pin| {
            buttons::SysfsButton::open(pin).map(|b| Box::new(b) as Box<dyn buttons::Button>)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RefreshInputs::new(buttons))
}

#[cfg(not(feature = "gpio_buttons"))]
fn open_inputs(_config: &Config) -> Result<RefreshInputs, PanelError> {
    log::info!("Press enter to refresh");
    Ok(RefreshInputs::new(vec![Box::new(buttons::StdinButton::spawn())]))
}

async fn run_panel<P: Panel>(
    config: &Config,
    panel: P,
    shutdown: &AtomicBool,
) -> Result<(), PanelError> {
    let link = match config.wifi {
        Some(_) => SystemLink::Nmcli(NmcliLink::default()),
        None => SystemLink::Host(HostLink),
    };

    let mut scheduler = RefreshScheduler::new(
        config,
        panel,
        open_surface(config)?,
        open_light(config)?,
        open_inputs(config)?,
        Connectivity::new(link, config),
    );

    if scheduler.start(shutdown).await? == Startup::Connected {
        scheduler.run(shutdown).await?;
    }

    scheduler.shutdown()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), PanelError> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_copy = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        log::info!("received ctrl+c");
        shutdown_copy.store(true, Ordering::Relaxed);
    })?;

    let client = http::build_client(config.request_timeout)?;

    match &config.source {
        Source::ShellyEm { status_url } => {
            let api = ShellyEmApi::new(status_url.clone(), client);
            run_panel(&config, EnergyPanel::new(api), &shutdown).await
        }
        Source::SolaxCloud {
            api_url,
            token_id,
            wifi_sn,
        } => {
            let api = SolaxApi::new(api_url.clone(), token_id.clone(), wifi_sn.clone(), client);
            run_panel(&config, InverterPanel::new(api), &shutdown).await
        }
        Source::Wttr { base_url, city } => {
            let api = WttrApi::new(base_url, city, client);
            run_panel(&config, WeatherPanel::new(api, city.clone()), &shutdown).await
        }
    }
}
