use std::fmt::Debug;

use embedded_graphics::{
    mono_font::{
        iso_8859_1::{
            FONT_10X20, FONT_4X6, FONT_5X7, FONT_5X8, FONT_6X10, FONT_6X13, FONT_6X9, FONT_7X13,
            FONT_7X14, FONT_8X13, FONT_9X15, FONT_9X18,
        },
        MonoFont, MonoTextStyle,
    },
    prelude::*,
    primitives::Rectangle,
    text::{Baseline, Text},
};

use crate::error::PanelError;
use crate::surface::{wrap_text, Pen, Surface, BASE_GLYPH_HEIGHT, BASE_GLYPH_WIDTH};

/// Ordered by glyph height.
const FONTS: [&MonoFont<'static>; 12] = [
    &FONT_4X6, &FONT_5X7, &FONT_5X8, &FONT_6X9, &FONT_6X10, &FONT_6X13, &FONT_7X13, &FONT_8X13,
    &FONT_7X14, &FONT_9X15, &FONT_9X18, &FONT_10X20,
];

const MAX_MAGNIFY: u32 = 4;

/// Pushes a buffered frame out to the physical panel.
pub trait Flush {
    fn flush_frame(&mut self) -> Result<(), PanelError>;
}

/// Adapts any `embedded-graphics` draw target to the panel's pen-and-text surface.
///
/// Callers lay out in `frame` coordinates; positions, wrap widths and text
/// scales are mapped onto whatever size the target really is.
pub struct GraphicsSurface<D> {
    target: D,
    frame: Size,
    pen: Pen,
}

/// Largest font whose glyph cell fits in `cell`. Cells big enough to hold the
/// largest font twice over magnify it instead.
fn font_for_cell(cell: Size) -> (&'static MonoFont<'static>, u32) {
    let largest = FONT_10X20.character_size;
    let factor = (cell.width / largest.width)
        .min(cell.height / largest.height)
        .clamp(1, MAX_MAGNIFY);

    let font = FONTS
        .iter()
        .rev()
        .find(|font| {
            let glyph = font.character_size * factor;
            glyph.width <= cell.width && glyph.height <= cell.height
        })
        .copied()
        .unwrap_or(FONTS[0]);

    (font, factor)
}

fn draw_error(err: impl Debug) -> PanelError {
    PanelError::Display(format!("{err:?}"))
}

/// Draws every pixel as a `factor` x `factor` block, offset by `origin`.
struct Magnified<'a, D> {
    target: &'a mut D,
    origin: Point,
    factor: i32,
}

impl<D: DrawTarget> Dimensions for Magnified<'_, D> {
    fn bounding_box(&self) -> Rectangle {
        self.target.bounding_box()
    }
}

impl<D: DrawTarget> DrawTarget for Magnified<'_, D> {
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (origin, k) = (self.origin, self.factor);

        self.target
            .draw_iter(pixels.into_iter().flat_map(move |Pixel(point, color)| {
                let corner = origin + point * k;
                (0..k).flat_map(move |dy| {
                    (0..k).map(move |dx| Pixel(corner + Point::new(dx, dy), color))
                })
            }))
    }
}

impl<D: OriginDimensions> GraphicsSurface<D> {
    /// Lays out directly in target pixels.
    pub fn new(target: D) -> GraphicsSurface<D> {
        let frame = target.size();
        GraphicsSurface::scaled(target, frame)
    }

    pub fn scaled(target: D, frame: Size) -> GraphicsSurface<D> {
        GraphicsSurface {
            target,
            frame,
            pen: Pen::White,
        }
    }

    fn map_x(&self, x: i64) -> i32 {
        (x * self.target.size().width as i64 / self.frame.width.max(1) as i64) as i32
    }

    fn map_y(&self, y: i64) -> i32 {
        (y * self.target.size().height as i64 / self.frame.height.max(1) as i64) as i32
    }

    #[cfg(test)]
    pub fn target(&self) -> &D {
        &self.target
    }
}

impl<D, C> Surface for GraphicsSurface<D>
where
    D: DrawTarget<Color = C> + OriginDimensions + Flush,
    D::Error: Debug,
    C: PixelColor + From<Pen>,
{
    fn bounds(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn clear(&mut self, pen: Pen) -> Result<(), PanelError> {
        self.target.clear(pen.into()).map_err(draw_error)
    }

    fn set_pen(&mut self, pen: Pen) {
        self.pen = pen;
    }

    fn text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        scale: u32,
        wrap: Option<u32>,
    ) -> Result<(), PanelError> {
        let scale = scale.max(1) as i64;
        let cell = Size::new(
            self.map_x(BASE_GLYPH_WIDTH as i64 * scale).max(0) as u32,
            self.map_y(BASE_GLYPH_HEIGHT as i64 * scale).max(0) as u32,
        );
        let (font, factor) = font_for_cell(cell);
        let glyph = font.character_size * factor;

        let lines = match wrap {
            Some(width) => {
                let width = self.map_x(width as i64).max(0) as u32;
                wrap_text(text, (width / glyph.width) as usize)
            }
            None => vec![text.to_owned()],
        };

        let style = MonoTextStyle::new(font, C::from(self.pen));
        let mut target = Magnified {
            origin: Point::new(self.map_x(x as i64), self.map_y(y as i64)),
            factor: factor as i32,
            target: &mut self.target,
        };

        for (index, line) in lines.iter().enumerate() {
            let position = Point::new(0, index as i32 * font.character_size.height as i32);
            Text::with_baseline(line, position, style, Baseline::Top)
                .draw(&mut target)
                .map_err(draw_error)?;
        }

        Ok(())
    }

    fn update(&mut self) -> Result<(), PanelError> {
        self.target.flush_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{show_message, PANEL_FRAME};
    use crate::testing::PixelCounter;
    use embedded_graphics::mock_display::MockDisplay;
    use embedded_graphics::pixelcolor::BinaryColor;

    impl Flush for MockDisplay<BinaryColor> {
        fn flush_frame(&mut self) -> Result<(), PanelError> {
            Ok(())
        }
    }

    fn lit_rows(display: &MockDisplay<BinaryColor>) -> Vec<i32> {
        (0..64)
            .filter(|&y| (0..64).any(|x| display.get_pixel(Point::new(x, y)) == Some(BinaryColor::On)))
            .collect()
    }

    fn surface() -> GraphicsSurface<MockDisplay<BinaryColor>> {
        let mut display = MockDisplay::new();
        display.set_allow_overdraw(true);
        display.set_allow_out_of_bounds_drawing(true);
        GraphicsSurface::new(display)
    }

    fn oled() -> GraphicsSurface<PixelCounter> {
        GraphicsSurface::scaled(PixelCounter::new(128, 64), PANEL_FRAME)
    }

    #[test]
    fn reports_layout_frame_as_bounds() {
        assert_eq!(surface().bounds(), (64, 64));
        assert_eq!(oled().bounds(), (240, 135));
    }

    #[test]
    fn draws_text_in_current_pen() {
        let mut surface = surface();
        surface.clear(Pen::Black).unwrap();
        surface.set_pen(Pen::Yellow);
        surface.text("42", 0, 0, 2, None).unwrap();
        surface.update().unwrap();

        let rows = lit_rows(surface.target());
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|&y| y < 15));
    }

    #[test]
    fn black_pen_draws_nothing_visible() {
        let mut surface = surface();
        surface.clear(Pen::Black).unwrap();
        surface.set_pen(Pen::Black);
        surface.text("hidden", 0, 0, 1, None).unwrap();

        assert!(lit_rows(surface.target()).is_empty());
    }

    #[test]
    fn wrapped_text_continues_on_following_lines() {
        let mut surface = surface();
        surface.clear(Pen::Black).unwrap();
        surface.set_pen(Pen::White);
        // scale 2 picks 9x15 glyphs here, so 30px holds three characters a line
        surface.text("Hello world", 0, 0, 2, Some(30)).unwrap();

        let rows = lit_rows(surface.target());
        assert!(rows.iter().any(|&y| y < 15));
        assert!(rows.iter().any(|&y| (15..30).contains(&y)));
    }

    fn glyph_for(width: u32, height: u32) -> (Size, u32) {
        let (font, factor) = font_for_cell(Size::new(width, height));
        (font.character_size, factor)
    }

    #[test]
    fn font_grows_with_scale() {
        assert_eq!(glyph_for(6, 7), (Size::new(5, 7), 1));
        assert_eq!(glyph_for(9, 11), (Size::new(6, 10), 1));
        assert_eq!(glyph_for(12, 16), (Size::new(9, 15), 1));
        assert_eq!(glyph_for(24, 32), (Size::new(10, 20), 1));
        assert_eq!(glyph_for(42, 56), (Size::new(10, 20), 2));
        // nothing fits, fall back to the smallest font
        assert_eq!(glyph_for(3, 3), (Size::new(4, 6), 1));
    }

    #[test]
    fn headline_scale_is_taller_than_body() {
        let height_at = |scale| {
            let mut surface = GraphicsSurface::new(PixelCounter::new(240, 135));
            surface.text("88", 0, 0, scale, None).unwrap();
            surface.target().lit_height()
        };

        assert!(height_at(7) > height_at(4));
        assert!(height_at(4) > height_at(1));
    }

    #[test]
    fn frame_positions_map_onto_a_smaller_target() {
        let mut oled = oled();
        oled.text("Update time: 14:05", 10, 115, 2, None).unwrap();

        let counter = oled.target();
        assert_eq!(counter.clipped(), 0);
        assert!(counter.lit() > 0);
        // 115 of 135 rows down lands at 54 of 64
        assert!(counter.lit_rows().all(|y| (54..64).contains(&y)));
    }

    #[test]
    fn messages_fit_a_small_target() {
        for message in ["WiFi Connection\nFailed!", "Failed to fetch\nweather data", "Refreshing..."] {
            let mut oled = oled();
            show_message(&mut oled, message, Pen::Red).unwrap();

            assert_eq!(oled.target().clipped(), 0, "{message}");
            assert!(oled.target().lit() > 0, "{message}");
        }
    }
}
