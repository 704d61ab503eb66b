use crate::error::PanelError;
use crate::surface::{wrap_text, Pen, Surface, BASE_GLYPH_WIDTH};

/// Stand-in for the panel when no display hardware is attached: frames are printed to stdout.
pub struct ConsoleDisplay {
    width: u32,
    height: u32,
    pen: Pen,
    background: Pen,
    // (y, x, pen, text) in draw order; sorted by position when presented
    frame: Vec<(i32, i32, Pen, String)>,
}

impl ConsoleDisplay {
    pub fn new(width: u32, height: u32) -> ConsoleDisplay {
        ConsoleDisplay {
            width,
            height,
            pen: Pen::White,
            background: Pen::Black,
            frame: vec![],
        }
    }

    fn render_frame(&self) -> String {
        let mut rows = self.frame.clone();
        rows.sort_by_key(|(y, x, _, _)| (*y, *x));

        let rule = "-".repeat(40);
        let mut out = format!("+{rule}\n");
        for (_, _, pen, text) in rows {
            out.push_str(&format!("| [{:>6}] {}\n", pen.name(), text));
        }
        out.push_str(&format!("+{rule} ({})\n", self.background.name()));
        out
    }
}

impl Surface for ConsoleDisplay {
    fn bounds(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, pen: Pen) -> Result<(), PanelError> {
        self.background = pen;
        self.frame.clear();
        Ok(())
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
        let line_height = 8 * scale.max(1) as i32;
        let lines = match wrap {
            Some(width) => wrap_text(text, (width / (BASE_GLYPH_WIDTH * scale.max(1))) as usize),
            None => vec![text.to_owned()],
        };

        for (index, line) in lines.into_iter().enumerate() {
            self.frame
                .push((y + index as i32 * line_height, x, self.pen, line));
        }

        Ok(())
    }

    fn update(&mut self) -> Result<(), PanelError> {
        log::debug!("Presenting frame with {} text runs", self.frame.len());
        print!("{}", self.render_frame());
        Ok(())
    }
}
