//! Single-colour status LED.
//!
//! Any non-zero colour lights the LED. Flashing runs on a small thread so
//! the relay loop never toggles pins itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use esp_idf_svc::hal::gpio::{AnyOutputPin, PinDriver};

use crate::hal::{HalError, StatusIndicator};

/// Half period of the flash pattern.
const FLASH_HALF_PERIOD_MS: u64 = 250;

struct LedState {
    default_on: AtomicBool,
    flashing: AtomicBool,
}

pub struct GpioIndicator {
    state: Arc<LedState>,
}

impl GpioIndicator {
    pub fn new(pin: AnyOutputPin) -> Result<Self, HalError> {
        let mut led = PinDriver::output(pin)?;
        let state = Arc::new(LedState {
            default_on: AtomicBool::new(false),
            flashing: AtomicBool::new(false),
        });

        let shared = Arc::clone(&state);
        thread::Builder::new()
            .name("indicator".into())
            .stack_size(2048)
            .spawn(move || {
                let mut lit = false;
                loop {
                    lit = if shared.flashing.load(Ordering::Relaxed) {
                        !lit
                    } else {
                        shared.default_on.load(Ordering::Relaxed)
                    };
                    let _ = if lit { led.set_high() } else { led.set_low() };
                    thread::sleep(Duration::from_millis(FLASH_HALF_PERIOD_MS));
                }
            })
            .map_err(|_| HalError::Busy)?;

        Ok(Self { state })
    }
}

impl StatusIndicator for GpioIndicator {
    fn set_default_color(&mut self, color: u32) {
        self.state.default_on.store(color != 0, Ordering::Relaxed);
    }

    fn set_flashing(&mut self, enabled: bool, color: u32) {
        self.state
            .flashing
            .store(enabled && color != 0, Ordering::Relaxed);
    }
}
