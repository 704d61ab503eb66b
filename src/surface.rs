use embedded_graphics::pixelcolor::{BinaryColor, Rgb565, Rgb888};
use embedded_graphics::prelude::*;

use crate::error::PanelError;

/// Layout frame every panel draws in. Surfaces of another size map it onto their own pixels.
pub const PANEL_FRAME: Size = Size::new(240, 135);

/// Glyph cell at scale 1, used to turn pixel wrap widths into character counts.
pub const BASE_GLYPH_WIDTH: u32 = 6;
pub const BASE_GLYPH_HEIGHT: u32 = 8;

const MESSAGE_X: i32 = 10;
const MESSAGE_SCALE: u32 = 2;
const MESSAGE_LINE_HEIGHT: i32 = 20;
const MESSAGE_LINE_ADVANCE: i32 = 25;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Pen {
    White,
    Black,
    Green,
    Yellow,
    Blue,
    Red,
    Orange,
    Cyan,
}

impl Pen {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Pen::White => (255, 255, 255),
            Pen::Black => (0, 0, 0),
            Pen::Green => (0, 255, 0),
            Pen::Yellow => (255, 255, 0),
            Pen::Blue => (0, 0, 255),
            Pen::Red => (255, 0, 0),
            Pen::Orange => (255, 128, 0),
            Pen::Cyan => (0, 255, 255),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pen::White => "white",
            Pen::Black => "black",
            Pen::Green => "green",
            Pen::Yellow => "yellow",
            Pen::Blue => "blue",
            Pen::Red => "red",
            Pen::Orange => "orange",
            Pen::Cyan => "cyan",
        }
    }
}

impl From<Pen> for Rgb565 {
    fn from(pen: Pen) -> Self {
        let (r, g, b) = pen.rgb();
        Rgb888::new(r, g, b).into()
    }
}

/// Monochrome panels light every pixel that is not drawn in black.
impl From<Pen> for BinaryColor {
    fn from(pen: Pen) -> Self {
        match pen {
            Pen::Black => BinaryColor::Off,
            _ => BinaryColor::On,
        }
    }
}

/// A pen-and-text drawing surface. Nothing is visible until `update` presents the frame.
pub trait Surface {
    fn bounds(&self) -> (u32, u32);
    fn clear(&mut self, pen: Pen) -> Result<(), PanelError>;
    fn set_pen(&mut self, pen: Pen);
    /// Draws `text` with its top-left corner at (`x`, `y`). `wrap` is a line width in pixels.
    fn text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        scale: u32,
        wrap: Option<u32>,
    ) -> Result<(), PanelError>;
    fn update(&mut self) -> Result<(), PanelError>;
}

/// Greedy word wrap to at most `max_chars` per line. Words longer than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = vec![];
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let line_len = line.chars().count();
        if !line.is_empty() && line_len + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.extend(word);
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }

    lines
}

/// Repaints the whole surface with a vertically centred block of text.
pub fn show_message(surface: &mut dyn Surface, message: &str, pen: Pen) -> Result<(), PanelError> {
    let (width, height) = surface.bounds();
    let lines: Vec<&str> = message.split('\n').collect();

    surface.clear(Pen::Black)?;
    surface.set_pen(pen);

    let mut y = height as i32 / 2 - (lines.len() as i32 * MESSAGE_LINE_HEIGHT / 2);
    for line in lines {
        surface.text(
            line,
            MESSAGE_X,
            y,
            MESSAGE_SCALE,
            Some(width.saturating_sub(20)),
        )?;
        y += MESSAGE_LINE_ADVANCE;
    }

    surface.update()
}
