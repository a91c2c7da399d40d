//! ESP-IDF implementations of the relay collaborators.
//!
//! Target-only. Pin choices are made by the binary; these adapters only
//! wrap drivers and translate `EspError` into [`HalError`].

pub mod indicator;
pub mod input;
pub mod mic;
pub mod radio;
pub mod speaker;

pub use indicator::GpioIndicator;
pub use input::{EspClock, GpioPushToTalk};
pub use mic::I2sMemsMic;
pub use radio::EspNowRadio;
pub use speaker::I2sSpeaker;

use esp_idf_svc::sys::EspError;

use crate::hal::HalError;

impl From<EspError> for HalError {
    fn from(e: EspError) -> Self {
        HalError::Driver(e.code())
    }
}
