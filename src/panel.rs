use std::time::Duration;

use crate::error::{FetchError, PanelError};
use crate::indicator::{phase_color, FetchPhase, LedColor};
use crate::surface::Surface;

/// One display variant: where its data comes from, how a reading is laid out,
/// and what the status light shows for it.
pub trait Panel {
    type Reading;

    /// Shown on the start-up screen.
    fn title(&self) -> &str;

    async fn fetch(&self) -> Result<Self::Reading, FetchError>;

    /// Clears the surface, draws the full layout for `reading` and presents it.
    fn render(&self, reading: &Self::Reading, surface: &mut dyn Surface) -> Result<(), PanelError>;

    fn failure_message(&self) -> &str {
        "Failed to\nget data"
    }

    /// Whether a manual refresh first puts up a "Refreshing..." screen.
    fn announces_refresh(&self) -> bool {
        false
    }

    fn indicator(
        &self,
        _reading: Option<&Self::Reading>,
        phase: FetchPhase,
        _elapsed: Duration,
    ) -> LedColor {
        phase_color(phase)
    }
}
