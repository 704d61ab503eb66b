use crate::error::{FetchError, PanelError};
use crate::panel::Panel;
use crate::readings::InverterReading;
use crate::solax_cloud::SolaxApi;
use crate::surface::{Pen, Surface};

pub struct InverterPanel {
    api: SolaxApi,
}

impl InverterPanel {
    pub fn new(api: SolaxApi) -> InverterPanel {
        InverterPanel { api }
    }
}

pub fn draw_inverter(
    reading: &InverterReading,
    surface: &mut dyn Surface,
) -> Result<(), PanelError> {
    surface.clear(Pen::Black)?;

    // current power is the headline figure
    surface.set_pen(Pen::Green);
    surface.text("Current Power", 10, 10, 2, None)?;
    surface.set_pen(Pen::White);
    surface.text(&format!("{:.2}kW", reading.power_kw), 10, 30, 4, None)?;

    surface.set_pen(Pen::Blue);
    surface.text("Today's Yield", 10, 70, 2, None)?;
    surface.set_pen(Pen::White);
    surface.text(&format!("{:.2}kWh", reading.yield_today_kwh), 10, 90, 3, None)?;

    surface.update()
}

impl Panel for InverterPanel {
    type Reading = InverterReading;

    fn title(&self) -> &str {
        "Solar Display"
    }

    async fn fetch(&self) -> Result<InverterReading, FetchError> {
        self.api.get_reading().await
    }

    fn render(
        &self,
        reading: &InverterReading,
        surface: &mut dyn Surface,
    ) -> Result<(), PanelError> {
        draw_inverter(reading, surface)
    }

    fn failure_message(&self) -> &str {
        "Failed to get\nsolar data"
    }
}
