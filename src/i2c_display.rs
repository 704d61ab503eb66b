use display_interface::DisplayError;
use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use linux_embedded_hal::I2cdev;
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

use crate::error::PanelError;
use crate::graphics_surface::{Flush, GraphicsSurface};
use crate::surface::PANEL_FRAME;

type Oled =
    Ssd1306<I2CInterface<I2cdev>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// SSD1306 128x64 OLED on the Pi's I2C bus. Panels still lay out in `PANEL_FRAME`.
pub struct RaspiDisplay {
    display: Oled,
}

impl From<DisplayError> for PanelError {
    fn from(value: DisplayError) -> Self {
        PanelError::Display(format!("{value:?}"))
    }
}

impl RaspiDisplay {
    pub fn open(device: &str) -> Result<GraphicsSurface<RaspiDisplay>, PanelError> {
        let i2c = I2cdev::new(device).map_err(|e| PanelError::Display(e.to_string()))?;

        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init()?;

        log::info!("Opened SSD1306 display on {device}");

        Ok(GraphicsSurface::scaled(RaspiDisplay { display }, PANEL_FRAME))
    }
}

impl Flush for RaspiDisplay {
    fn flush_frame(&mut self) -> Result<(), PanelError> {
        Ok(self.display.flush()?)
    }
}

impl OriginDimensions for RaspiDisplay {
    fn size(&self) -> Size {
        let (width, height) = self.display.dimensions();
        Size::new(width as u32, height as u32)
    }
}

impl DrawTarget for RaspiDisplay {
    type Color = BinaryColor;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        DrawTarget::draw_iter(&mut self.display, pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        DrawTarget::clear(&mut self.display, color)
    }
}
