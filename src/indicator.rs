use std::time::Duration;

use crate::error::PanelError;

/// Full indicator brightness. The LED accepts up to 255 per channel; this keeps it easy on the eyes.
pub const FULL: u8 = 32;
pub const HALF: u8 = FULL / 2;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct LedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LedColor {
    pub const OFF: LedColor = LedColor::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> LedColor {
        LedColor { r, g, b }
    }
}

/// Outcome of the most recent fetch, as far as the indicator is concerned.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

pub fn phase_color(phase: FetchPhase) -> LedColor {
    match phase {
        FetchPhase::Idle => LedColor::OFF,
        FetchPhase::InFlight => LedColor::new(0, 0, FULL),
        FetchPhase::Succeeded => LedColor::new(0, FULL, 0),
        FetchPhase::Failed => LedColor::new(FULL, 0, 0),
    }
}

/// Colour for a net power flow in kW. Exporting pulses green once a second,
/// heavy import (5 kW and up) flashes red five times faster.
pub fn flow_color(flow_kw: f64, elapsed: Duration) -> LedColor {
    let secs = elapsed.as_secs_f64();

    if flow_kw < 0.0 {
        if (secs as u64) % 2 == 0 {
            LedColor::new(0, HALF, 0)
        } else {
            LedColor::OFF
        }
    } else if flow_kw < 3.0 {
        LedColor::new(0, 0, HALF)
    } else if flow_kw < 5.0 {
        LedColor::new(HALF, HALF / 2, 0)
    } else if ((secs * 5.0) as u64) % 2 == 0 {
        LedColor::new(HALF, 0, 0)
    } else {
        LedColor::OFF
    }
}

pub trait StatusLight {
    fn set(&mut self, color: LedColor) -> Result<(), PanelError>;
}

/// Logs colour changes instead of driving an LED.
#[derive(Default)]
pub struct ConsoleLight {
    current: Option<LedColor>,
}

impl StatusLight for ConsoleLight {
    fn set(&mut self, color: LedColor) -> Result<(), PanelError> {
        if self.current != Some(color) {
            log::debug!("Status light -> ({}, {}, {})", color.r, color.g, color.b);
            self.current = Some(color);
        }
        Ok(())
    }
}

#[cfg(feature = "rgb_led")]
pub use ws2812::Ws2812Light;

#[cfg(feature = "rgb_led")]
mod ws2812 {
    use ws2818_rgb_led_spi_driver::adapter_gen::WS28xxAdapter;
    use ws2818_rgb_led_spi_driver::adapter_spi::WS28xxSpiAdapter;
    use ws2818_rgb_led_spi_driver::encoding::encode_rgb;

    use super::{LedColor, StatusLight};
    use crate::error::PanelError;

    /// A single WS2812 pixel on the Pi's SPI bus.
    pub struct Ws2812Light {
        adapter: WS28xxSpiAdapter,
        current: Option<LedColor>,
    }

    impl Ws2812Light {
        pub fn open(device: &str) -> Result<Ws2812Light, PanelError> {
            let adapter = WS28xxSpiAdapter::new(device).map_err(PanelError::Indicator)?;
            log::info!("Opened status LED on {device}");
            Ok(Ws2812Light {
                adapter,
                current: None,
            })
        }
    }

    impl StatusLight for Ws2812Light {
        fn set(&mut self, color: LedColor) -> Result<(), PanelError> {
            // the loop pushes a colour every tick; only touch the bus on change
            if self.current == Some(color) {
                return Ok(());
            }

            self.adapter
                .write_encoded_rgb(&encode_rgb(color.r, color.g, color.b))
                .map_err(PanelError::Indicator)?;
            self.current = Some(color);
            Ok(())
        }
    }
}
