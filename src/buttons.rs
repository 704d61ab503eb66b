use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

pub trait Button {
    fn is_pressed(&self) -> bool {
        self.state() == ButtonState::Pressed
    }

    fn state(&self) -> ButtonState;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum ButtonState {
    #[default]
    Released,
    Pressed,
}

/// Any number of buttons OR'd into one "refresh requested" signal.
///
/// Only a released-to-pressed transition counts, so a held button triggers once.
pub struct RefreshInputs {
    buttons: Vec<Box<dyn Button>>,
    held: Vec<bool>,
}

impl RefreshInputs {
    pub fn new(buttons: Vec<Box<dyn Button>>) -> RefreshInputs {
        let held = vec![false; buttons.len()];
        RefreshInputs { buttons, held }
    }

    #[cfg(test)]
    pub fn none() -> RefreshInputs {
        RefreshInputs::new(vec![])
    }

    /// Samples every button once. True if any of them was newly pressed.
    pub fn poll(&mut self) -> bool {
        let mut requested = false;

        for (button, held) in self.buttons.iter().zip(self.held.iter_mut()) {
            let pressed = button.is_pressed();
            requested |= pressed && !*held;
            *held = pressed;
        }

        requested
    }
}

/// Enter on the terminal acts as a refresh button.
pub struct StdinButton {
    pending: Arc<AtomicBool>,
}

impl StdinButton {
    pub fn spawn() -> StdinButton {
        let pending = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&pending);

        thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if line.is_err() {
                    break;
                }
                flag.store(true, Ordering::Relaxed);
            }
        });

        StdinButton { pending }
    }
}

impl Button for StdinButton {
    // reads as one press per line, released again on the next poll
    fn state(&self) -> ButtonState {
        if self.pending.swap(false, Ordering::Relaxed) {
            ButtonState::Pressed
        } else {
            ButtonState::Released
        }
    }
}

#[cfg(feature = "gpio_buttons")]
pub use sysfs::SysfsButton;

#[cfg(feature = "gpio_buttons")]
mod sysfs {
    use linux_embedded_hal::sysfs_gpio::Direction;
    use linux_embedded_hal::SysfsPin;

    use super::{Button, ButtonState};
    use crate::error::PanelError;

    /// Momentary push button wired to ground with a pull-up, so pressed reads low.
    pub struct SysfsButton {
        pin: SysfsPin,
    }

    impl SysfsButton {
        pub fn open(number: u64) -> Result<SysfsButton, PanelError> {
            let pin = SysfsPin::new(number);
            pin.export()
                .and_then(|_| pin.set_direction(Direction::In))
                .map_err(|e| PanelError::Input(format!("gpio {number}: {e}")))?;
            Ok(SysfsButton { pin })
        }
    }

    impl Button for SysfsButton {
        fn state(&self) -> ButtonState {
            match self.pin.get_value() {
                Ok(0) => ButtonState::Pressed,
                Ok(_) => ButtonState::Released,
                Err(e) => {
                    log::warn!("Could not read button: {e}");
                    ButtonState::Released
                }
            }
        }
    }
}
