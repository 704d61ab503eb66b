use std::time::Duration;

use crate::error::{FetchError, PanelError};
use crate::indicator::{phase_color, FetchPhase, LedColor};
use crate::panel::Panel;
use crate::readings::WeatherReading;
use crate::surface::{Pen, Surface};
use crate::wttr::WttrApi;

pub struct WeatherPanel {
    api: WttrApi,
    city: String,
}

impl WeatherPanel {
    pub fn new(api: WttrApi, city: String) -> WeatherPanel {
        WeatherPanel { api, city }
    }
}

pub fn draw_weather(
    city: &str,
    reading: &WeatherReading,
    surface: &mut dyn Surface,
) -> Result<(), PanelError> {
    let (width, _) = surface.bounds();
    let wrap = Some(width.saturating_sub(20));

    surface.clear(Pen::Black)?;

    surface.set_pen(Pen::Green);
    surface.text(city, 10, 10, 3, wrap)?;

    surface.set_pen(Pen::White);
    surface.text(reading.display_temperature(), 10, 40, 7, None)?;
    surface.text(&reading.description, 10, 110, 2, wrap)?;

    surface.update()
}

impl Panel for WeatherPanel {
    type Reading = WeatherReading;

    fn title(&self) -> &str {
        "Weather Display"
    }

    async fn fetch(&self) -> Result<WeatherReading, FetchError> {
        self.api.get_reading().await
    }

    fn render(&self, reading: &WeatherReading, surface: &mut dyn Surface) -> Result<(), PanelError> {
        draw_weather(&self.city, reading, surface)
    }

    fn failure_message(&self) -> &str {
        "Failed to fetch\nweather data"
    }

    /// The weather panel only lights up to report a problem.
    fn indicator(
        &self,
        _reading: Option<&WeatherReading>,
        phase: FetchPhase,
        _elapsed: Duration,
    ) -> LedColor {
        match phase {
            FetchPhase::Succeeded => LedColor::OFF,
            phase => phase_color(phase),
        }
    }
}
