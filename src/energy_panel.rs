use std::time::Duration;

use crate::error::{FetchError, PanelError};
use crate::indicator::{flow_color, phase_color, FetchPhase, LedColor};
use crate::panel::Panel;
use crate::readings::EnergyReading;
use crate::shelly_em::ShellyEmApi;
use crate::surface::{Pen, Surface};

/// Below this the solar channel is treated as idle noise.
const SOLAR_IDLE_KW: f64 = 0.005;

pub struct EnergyPanel {
    api: ShellyEmApi,
}

impl EnergyPanel {
    pub fn new(api: ShellyEmApi) -> EnergyPanel {
        EnergyPanel { api }
    }
}

pub fn draw_energy(reading: &EnergyReading, surface: &mut dyn Surface) -> Result<(), PanelError> {
    let (_, height) = surface.bounds();

    surface.clear(Pen::Black)?;

    surface.set_pen(Pen::Yellow);
    surface.text(&format!("HOME: {:.2} kW", reading.home_kw), 10, 10, 3, None)?;

    surface.set_pen(Pen::Green);
    let solar = if reading.solar_kw < SOLAR_IDLE_KW {
        "SOLAR: - kW".to_owned()
    } else {
        format!("SOLAR: {:.2} kW", reading.solar_kw)
    };
    surface.text(&solar, 10, 40, 3, None)?;

    // cyan while exporting to the grid
    surface.set_pen(if reading.grid_kw < 0.0 { Pen::Cyan } else { Pen::Orange });
    surface.text(&format!("FLOW: {:.2} kW", reading.grid_kw), 10, 70, 3, None)?;

    surface.set_pen(Pen::White);
    surface.text(
        &format!("Update time: {}", reading.time),
        10,
        height as i32 - 20,
        2,
        None,
    )?;

    surface.update()
}

impl Panel for EnergyPanel {
    type Reading = EnergyReading;

    fn title(&self) -> &str {
        "Shelly Display"
    }

    async fn fetch(&self) -> Result<EnergyReading, FetchError> {
        self.api.get_reading().await
    }

    fn render(&self, reading: &EnergyReading, surface: &mut dyn Surface) -> Result<(), PanelError> {
        draw_energy(reading, surface)
    }

    fn announces_refresh(&self) -> bool {
        true
    }

    fn indicator(
        &self,
        reading: Option<&EnergyReading>,
        phase: FetchPhase,
        elapsed: Duration,
    ) -> LedColor {
        match (phase, reading) {
            (FetchPhase::Failed, _) => phase_color(FetchPhase::Failed),
            (_, Some(reading)) => flow_color(reading.home_kw, elapsed),
            (_, None) => LedColor::OFF,
        }
    }
}
