//! Push-to-talk button and monotonic clock.

use esp_idf_svc::hal::gpio::{AnyIOPin, Input, PinDriver, Pull};
use esp_idf_svc::sys::{esp_timer_get_time, EspError};

use crate::hal::{Clock, PushToTalk};

/// Active-high button with internal pull-down.
pub struct GpioPushToTalk<'d> {
    pin: PinDriver<'d, AnyIOPin, Input>,
}

impl<'d> GpioPushToTalk<'d> {
    pub fn new(pin: AnyIOPin) -> Result<Self, EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(Pull::Down)?;
        Ok(Self { pin })
    }
}

impl PushToTalk for GpioPushToTalk<'_> {
    #[inline]
    fn is_asserted(&mut self) -> bool {
        self.pin.is_high()
    }
}

/// `esp_timer` microsecond clock.
#[derive(Clone, Copy, Default)]
pub struct EspClock;

impl Clock for EspClock {
    #[inline]
    fn now_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time is always safe to call
        unsafe { esp_timer_get_time() as u64 }
    }
}
