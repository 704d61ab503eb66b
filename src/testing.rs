//! Test doubles for the hardware and network seams.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::buttons::{Button, ButtonState};
use crate::config::{Config, WifiCredentials};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::error::{FetchError, PanelError};
use crate::graphics_surface::Flush;
use crate::indicator::{LedColor, StatusLight};
use crate::panel::Panel;
use crate::surface::{Pen, Surface};
use crate::wifi::{Link, LinkError};

/// Config with every delay zeroed so loops run instantly.
pub fn test_config() -> Config {
    let mut config = Config::from_lookup(|key| match key {
        "PANEL_SOURCE" => Some("shelly".into()),
        "SHELLY_URL" => Some("http://127.0.0.1:9/status".into()),
        _ => None,
    })
    .unwrap();

    config.connect_poll = Duration::ZERO;
    config.reconnect_settle = Duration::ZERO;
    config.idle_poll = Duration::ZERO;
    config.manual_debounce = Duration::ZERO;
    config.startup_delay = Duration::ZERO;
    config.fail_blink = Duration::ZERO;
    config
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear(Pen),
    Text {
        text: String,
        pen: Pen,
        x: i32,
        y: i32,
        scale: u32,
        wrap: Option<u32>,
    },
    Update,
}

/// Records draw calls. Clones share the same log.
#[derive(Clone)]
pub struct RecordingSurface {
    size: (u32, u32),
    pen: Rc<Cell<Pen>>,
    ops: Rc<RefCell<Vec<DrawOp>>>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> RecordingSurface {
        RecordingSurface {
            size: (width, height),
            pen: Rc::new(Cell::new(Pen::White)),
            ops: Rc::default(),
        }
    }

    pub fn ops(&self) -> Vec<DrawOp> {
        self.ops.borrow().clone()
    }

    pub fn take_ops(&self) -> Vec<DrawOp> {
        std::mem::take(&mut *self.ops.borrow_mut())
    }

    /// (text, pen, y) of every text draw, in order.
    pub fn texts(&self) -> Vec<(String, Pen, i32)> {
        self.ops
            .borrow()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, pen, y, .. } => Some((text.clone(), *pen, *y)),
                _ => None,
            })
            .collect()
    }

    /// Every text line of the last presented frame joined with newlines.
    pub fn last_frame_text(&self) -> String {
        let ops = self.ops.borrow();
        let start = ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::Clear(_)))
            .unwrap_or(0);

        ops[start..]
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One clear first, one update last, nothing presented in between.
    pub fn is_complete_frame(&self) -> bool {
        let ops = self.ops.borrow();
        let updates = ops.iter().filter(|op| **op == DrawOp::Update).count();
        matches!(ops.first(), Some(DrawOp::Clear(Pen::Black)))
            && ops.last() == Some(&DrawOp::Update)
            && updates == 1
    }
}

impl Surface for RecordingSurface {
    fn bounds(&self) -> (u32, u32) {
        self.size
    }

    fn clear(&mut self, pen: Pen) -> Result<(), PanelError> {
        self.ops.borrow_mut().push(DrawOp::Clear(pen));
        Ok(())
    }

    fn set_pen(&mut self, pen: Pen) {
        self.pen.set(pen);
    }

    fn text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        scale: u32,
        wrap: Option<u32>,
    ) -> Result<(), PanelError> {
        self.ops.borrow_mut().push(DrawOp::Text {
            text: text.to_owned(),
            pen: self.pen.get(),
            x,
            y,
            scale,
            wrap,
        });
        Ok(())
    }

    fn update(&mut self) -> Result<(), PanelError> {
        self.ops.borrow_mut().push(DrawOp::Update);
        Ok(())
    }
}

/// Monochrome draw target that counts lit pixels and anything drawn off its edges.
pub struct PixelCounter {
    size: Size,
    lit: Vec<Point>,
    clipped: usize,
}

impl PixelCounter {
    pub fn new(width: u32, height: u32) -> PixelCounter {
        PixelCounter {
            size: Size::new(width, height),
            lit: vec![],
            clipped: 0,
        }
    }

    pub fn lit(&self) -> usize {
        self.lit.len()
    }

    pub fn clipped(&self) -> usize {
        self.clipped
    }

    pub fn lit_rows(&self) -> impl Iterator<Item = i32> + '_ {
        self.lit.iter().map(|point| point.y)
    }

    pub fn lit_height(&self) -> i32 {
        match (self.lit_rows().min(), self.lit_rows().max()) {
            (Some(top), Some(bottom)) => bottom - top + 1,
            _ => 0,
        }
    }
}

impl OriginDimensions for PixelCounter {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for PixelCounter {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let inside = point.x >= 0
                && point.y >= 0
                && (point.x as u32) < self.size.width
                && (point.y as u32) < self.size.height;

            if !inside {
                self.clipped += 1;
            } else if color == BinaryColor::On {
                self.lit.push(point);
            }
        }
        Ok(())
    }
}

impl Flush for PixelCounter {
    fn flush_frame(&mut self) -> Result<(), PanelError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingLight {
    colors: Rc<RefCell<Vec<LedColor>>>,
}

impl RecordingLight {
    pub fn colors(&self) -> Vec<LedColor> {
        self.colors.borrow().clone()
    }

    pub fn last(&self) -> Option<LedColor> {
        self.colors.borrow().last().copied()
    }
}

impl StatusLight for RecordingLight {
    fn set(&mut self, color: LedColor) -> Result<(), PanelError> {
        self.colors.borrow_mut().push(color);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct ScriptedButton {
    pressed: Rc<Cell<bool>>,
}

impl ScriptedButton {
    pub fn new() -> ScriptedButton {
        ScriptedButton::default()
    }

    pub fn set(&self, pressed: bool) {
        self.pressed.set(pressed);
    }
}

impl Button for ScriptedButton {
    fn state(&self) -> ButtonState {
        if self.pressed.get() {
            ButtonState::Pressed
        } else {
            ButtonState::Released
        }
    }
}

#[derive(Default)]
struct FakeLinkState {
    associated: bool,
    // status checks needed after an association request; None never comes up
    checks_to_associate: Option<u32>,
    remaining: Option<u32>,
    associate_calls: u32,
    disassociate_calls: u32,
    status_checks: u32,
}

/// Scriptable link. Clones share state so tests can inspect it after handing one over.
#[derive(Clone)]
pub struct FakeLink {
    state: Rc<RefCell<FakeLinkState>>,
}

impl FakeLink {
    pub fn associating_after(checks: u32) -> FakeLink {
        FakeLink {
            state: Rc::new(RefCell::new(FakeLinkState {
                checks_to_associate: Some(checks),
                ..Default::default()
            })),
        }
    }

    /// Already associated; comes straight back after an association request.
    pub fn up() -> FakeLink {
        FakeLink {
            state: Rc::new(RefCell::new(FakeLinkState {
                associated: true,
                checks_to_associate: Some(1),
                ..Default::default()
            })),
        }
    }

    pub fn never_associating() -> FakeLink {
        FakeLink {
            state: Rc::default(),
        }
    }

    pub fn drop_association(&self) {
        let mut state = self.state.borrow_mut();
        state.associated = false;
        state.remaining = None;
    }

    pub fn associate_calls(&self) -> u32 {
        self.state.borrow().associate_calls
    }

    pub fn disassociate_calls(&self) -> u32 {
        self.state.borrow().disassociate_calls
    }

    pub fn status_checks(&self) -> u32 {
        self.state.borrow().status_checks
    }
}

impl Link for FakeLink {
    async fn associate(&mut self, _credentials: &WifiCredentials) -> Result<(), LinkError> {
        let mut state = self.state.borrow_mut();
        state.associate_calls += 1;
        state.remaining = state.checks_to_associate;
        Ok(())
    }

    async fn disassociate(&mut self) -> Result<(), LinkError> {
        let mut state = self.state.borrow_mut();
        state.disassociate_calls += 1;
        state.associated = false;
        Ok(())
    }

    async fn is_associated(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.status_checks += 1;

        if !state.associated {
            let remaining = state.remaining;
            match remaining {
                Some(remaining) if remaining <= 1 => {
                    state.associated = true;
                    state.remaining = None;
                }
                Some(remaining) => state.remaining = Some(remaining - 1),
                None => {}
            }
        }

        state.associated
    }
}

/// Panel whose fetches return scripted outcomes; readings are plain numbers.
pub struct FakePanel {
    outcomes: RefCell<VecDeque<Result<i32, FetchError>>>,
    fetches: Cell<u32>,
    stop_when_exhausted: Option<Arc<AtomicBool>>,
}

impl FakePanel {
    pub fn new(outcomes: Vec<Result<i32, FetchError>>) -> FakePanel {
        FakePanel {
            outcomes: RefCell::new(outcomes.into()),
            fetches: Cell::new(0),
            stop_when_exhausted: None,
        }
    }

    /// Raises `shutdown` once the last scripted outcome has been handed out.
    pub fn stopping(mut self, shutdown: Arc<AtomicBool>) -> FakePanel {
        self.stop_when_exhausted = Some(shutdown);
        self
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.get()
    }
}

impl Panel for FakePanel {
    type Reading = i32;

    fn title(&self) -> &str {
        "Fake Display"
    }

    async fn fetch(&self) -> Result<i32, FetchError> {
        self.fetches.set(self.fetches.get() + 1);
        let mut outcomes = self.outcomes.borrow_mut();
        let outcome = outcomes
            .pop_front()
            .unwrap_or(Err(FetchError::Payload("script exhausted".into())));

        if let (true, Some(shutdown)) = (outcomes.is_empty(), &self.stop_when_exhausted) {
            shutdown.store(true, Ordering::Relaxed);
        }

        outcome
    }

    fn render(&self, reading: &i32, surface: &mut dyn Surface) -> Result<(), PanelError> {
        surface.clear(Pen::Black)?;
        surface.set_pen(Pen::White);
        surface.text(&format!("value {reading}"), 10, 10, 2, None)?;
        surface.update()
    }
}
