//! I2S MEMS microphone (INMP441-style, 24 bits in a 32-bit left slot).

use esp_idf_svc::hal::delay::BLOCK;
use esp_idf_svc::hal::gpio::{AnyIOPin, InputPin, OutputPin};
use esp_idf_svc::hal::i2s::config::{
    Config, DataBitWidth, SlotMode, StdClkConfig, StdConfig, StdGpioConfig, StdSlotConfig,
};
use esp_idf_svc::hal::i2s::{I2s, I2sDriver, I2sRx};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::sys::EspError;

use crate::config::MAX_CHUNK_SAMPLES;
use crate::hal::{AudioCapture, HalError};
use crate::sample::{from_mems_word, Sample};

const WORD_BYTES: usize = 4;

/// Microphone on a dedicated I2S port.
pub struct I2sMemsMic<'d> {
    driver: I2sDriver<'d, I2sRx>,
    raw: [u8; MAX_CHUNK_SAMPLES * WORD_BYTES],
    running: bool,
}

impl<'d> I2sMemsMic<'d> {
    pub fn new<I: I2s>(
        i2s: impl Peripheral<P = I> + 'd,
        sample_rate_hz: u32,
        bclk: impl Peripheral<P = impl InputPin + OutputPin> + 'd,
        din: impl Peripheral<P = impl InputPin> + 'd,
        ws: impl Peripheral<P = impl InputPin + OutputPin> + 'd,
    ) -> Result<Self, EspError> {
        let config = StdConfig::new(
            Config::default(),
            StdClkConfig::from_sample_rate_hz(sample_rate_hz),
            StdSlotConfig::philips_slot_default(DataBitWidth::Bits32, SlotMode::Mono),
            StdGpioConfig::default(),
        );
        let driver =
            I2sDriver::new_std_rx(i2s, &config, bclk, din, Option::<AnyIOPin>::None, ws)?;

        Ok(Self {
            driver,
            raw: [0; MAX_CHUNK_SAMPLES * WORD_BYTES],
            running: false,
        })
    }
}

impl AudioCapture for I2sMemsMic<'_> {
    fn start(&mut self) -> Result<(), HalError> {
        if !self.running {
            self.driver.rx_enable()?;
            self.running = true;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HalError> {
        if self.running {
            self.driver.rx_disable()?;
            self.running = false;
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [Sample]) -> Result<usize, HalError> {
        if !self.running {
            return Err(HalError::NotStarted);
        }
        let want = buf.len().min(MAX_CHUNK_SAMPLES) * WORD_BYTES;
        let got = self.driver.read(&mut self.raw[..want], BLOCK)?;

        let words = self.raw[..got - got % WORD_BYTES].chunks_exact(WORD_BYTES);
        let mut n = 0;
        for (slot, word) in buf.iter_mut().zip(words) {
            *slot = from_mems_word(i32::from_le_bytes([word[0], word[1], word[2], word[3]]));
            n += 1;
        }
        Ok(n)
    }
}
