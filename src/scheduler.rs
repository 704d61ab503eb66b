use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::{sleep, Instant};

use crate::buttons::RefreshInputs;
use crate::config::Config;
use crate::error::PanelError;
use crate::indicator::{FetchPhase, LedColor, StatusLight, FULL};
use crate::panel::Panel;
use crate::surface::{show_message, Pen, Surface};
use crate::wifi::{Connectivity, Link};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RefreshTrigger {
    Manual,
    Timer,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Startup {
    Connected,
    /// The link never came up; the panel blinked red until shutdown.
    Failed,
}

/// Drives one panel: polls inputs, refreshes on demand or when the interval
/// has passed, and keeps the display and status light in step with the
/// latest reading.
pub struct RefreshScheduler<'a, P: Panel, L> {
    config: &'a Config,
    panel: P,
    surface: Box<dyn Surface>,
    light: Box<dyn StatusLight>,
    inputs: RefreshInputs,
    connectivity: Connectivity<L>,
    reading: Option<P::Reading>,
    phase: FetchPhase,
    last_update: Option<Instant>,
    started: Instant,
}

impl<'a, P: Panel, L: Link> RefreshScheduler<'a, P, L> {
    pub fn new(
        config: &'a Config,
        panel: P,
        surface: Box<dyn Surface>,
        light: Box<dyn StatusLight>,
        inputs: RefreshInputs,
        connectivity: Connectivity<L>,
    ) -> RefreshScheduler<'a, P, L> {
        RefreshScheduler {
            config,
            panel,
            surface,
            light,
            inputs,
            connectivity,
            reading: None,
            phase: FetchPhase::Idle,
            last_update: None,
            started: Instant::now(),
        }
    }

    /// Clears the light, shows the start-up screen and brings the network up.
    ///
    /// If the network cannot be reached the panel stays on a failure screen
    /// and blinks red until `shutdown` is raised, without touching the
    /// network or display again.
    pub async fn start(&mut self, shutdown: &AtomicBool) -> Result<Startup, PanelError> {
        self.light.set(LedColor::OFF)?;
        let banner = format!("{}\nStarting...", self.panel.title());
        show_message(self.surface.as_mut(), &banner, Pen::White)?;
        sleep(self.config.startup_delay).await;

        match self.connectivity.connect().await {
            Ok(()) => Ok(Startup::Connected),
            Err(e) => {
                log::error!("Network connection failed: {e}");
                show_message(self.surface.as_mut(), "WiFi Connection\nFailed!", Pen::Red)?;
                self.fail_stop(shutdown).await?;
                Ok(Startup::Failed)
            }
        }
    }

    async fn fail_stop(&mut self, shutdown: &AtomicBool) -> Result<(), PanelError> {
        loop {
            self.light.set(LedColor::new(FULL, 0, 0))?;
            sleep(self.config.fail_blink).await;
            self.light.set(LedColor::OFF)?;
            sleep(self.config.fail_blink).await;

            if shutdown.load(Ordering::Relaxed) {
                return Ok(());
            }
        }
    }

    pub async fn run(&mut self, shutdown: &AtomicBool) -> Result<(), PanelError> {
        while !shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();

            if let Some(trigger) = self.trigger(now) {
                self.refresh(trigger, now).await?;
            }

            self.update_indicator(Instant::now())?;

            sleep(self.config.idle_poll).await;
        }

        Ok(())
    }

    fn due(&self, now: Instant) -> bool {
        match self.last_update {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.config.refresh_interval,
        }
    }

    /// A button press wins over the timer; with neither there is nothing to do.
    pub fn trigger(&mut self, now: Instant) -> Option<RefreshTrigger> {
        if self.inputs.poll() {
            Some(RefreshTrigger::Manual)
        } else if self.due(now) {
            Some(RefreshTrigger::Timer)
        } else {
            None
        }
    }

    pub async fn refresh(&mut self, trigger: RefreshTrigger, now: Instant) -> Result<(), PanelError> {
        let manual = trigger == RefreshTrigger::Manual;

        if manual && self.panel.announces_refresh() {
            show_message(self.surface.as_mut(), "Refreshing...", Pen::White)?;
        }

        self.phase = FetchPhase::InFlight;
        self.update_indicator(now)?;

        self.connectivity.ensure_connected().await;

        match self.panel.fetch().await {
            Ok(reading) => {
                log::info!("Fetched new reading ({trigger:?} refresh)");
                self.panel.render(&reading, self.surface.as_mut())?;
                self.reading = Some(reading);
                self.phase = FetchPhase::Succeeded;
            }
            Err(e) => {
                log::warn!("Error fetching data: {e}");
                if e.is_network() {
                    self.connectivity.reconnect().await;
                }
                show_message(self.surface.as_mut(), self.panel.failure_message(), Pen::Red)?;
                self.phase = FetchPhase::Failed;
            }
        }

        // failures count too; the next attempt waits a full interval
        self.last_update = Some(now);

        if manual {
            sleep(self.config.manual_debounce).await;
        }

        Ok(())
    }

    pub fn update_indicator(&mut self, now: Instant) -> Result<(), PanelError> {
        let elapsed = now.saturating_duration_since(self.started);
        let color = self
            .panel
            .indicator(self.reading.as_ref(), self.phase, elapsed);
        self.light.set(color)
    }

    pub fn shutdown(&mut self) -> Result<(), PanelError> {
        log::info!("Shutting down panel");
        self.light.set(LedColor::OFF)?;
        self.surface.clear(Pen::Black)?;
        self.surface.update()
    }

    #[cfg(test)]
    pub fn reading(&self) -> Option<&P::Reading> {
        self.reading.as_ref()
    }

    #[cfg(test)]
    pub fn panel(&self) -> &P {
        &self.panel
    }

    #[cfg(test)]
    pub fn started(&self) -> Instant {
        self.started
    }
}
