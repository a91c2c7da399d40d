//! I2S speaker (MAX98357-style amplifier with optional shutdown pin).

use esp_idf_svc::hal::delay::BLOCK;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, InputPin, Output, OutputPin, PinDriver};
use esp_idf_svc::hal::i2s::config::{
    Config, DataBitWidth, SlotMode, StdClkConfig, StdConfig, StdGpioConfig, StdSlotConfig,
};
use esp_idf_svc::hal::i2s::{I2s, I2sDriver, I2sTx};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::sys::EspError;

use crate::config::MAX_CHUNK_SAMPLES;
use crate::hal::{AudioSink, HalError};
use crate::sample::Sample;

const SAMPLE_BYTES: usize = 2;

/// Speaker on a dedicated I2S port.
///
/// The amplifier shutdown pin (if wired) is high only while playing.
pub struct I2sSpeaker<'d> {
    driver: I2sDriver<'d, I2sTx>,
    amp_enable: Option<PinDriver<'d, AnyOutputPin, Output>>,
    sample_rate_hz: u32,
    raw: [u8; MAX_CHUNK_SAMPLES * SAMPLE_BYTES],
    running: bool,
}

impl<'d> I2sSpeaker<'d> {
    pub fn new<I: I2s>(
        i2s: impl Peripheral<P = I> + 'd,
        sample_rate_hz: u32,
        bclk: impl Peripheral<P = impl InputPin + OutputPin> + 'd,
        dout: impl Peripheral<P = impl OutputPin> + 'd,
        ws: impl Peripheral<P = impl InputPin + OutputPin> + 'd,
        amp_enable: Option<AnyOutputPin>,
    ) -> Result<Self, EspError> {
        let config = StdConfig::new(
            Config::default(),
            StdClkConfig::from_sample_rate_hz(sample_rate_hz),
            StdSlotConfig::philips_slot_default(DataBitWidth::Bits16, SlotMode::Mono),
            StdGpioConfig::default(),
        );
        let driver =
            I2sDriver::new_std_tx(i2s, &config, bclk, dout, Option::<AnyIOPin>::None, ws)?;

        let amp_enable = match amp_enable {
            Some(pin) => {
                let mut pin = PinDriver::output(pin)?;
                pin.set_low()?;
                Some(pin)
            }
            None => None,
        };

        Ok(Self {
            driver,
            amp_enable,
            sample_rate_hz,
            raw: [0; MAX_CHUNK_SAMPLES * SAMPLE_BYTES],
            running: false,
        })
    }

    fn set_amp(&mut self, on: bool) -> Result<(), EspError> {
        match self.amp_enable.as_mut() {
            Some(pin) if on => pin.set_high(),
            Some(pin) => pin.set_low(),
            None => Ok(()),
        }
    }
}

impl AudioSink for I2sSpeaker<'_> {
    fn start(&mut self, sample_rate_hz: u32) -> Result<(), HalError> {
        // The I2S clock is fixed when the driver is installed
        if sample_rate_hz != self.sample_rate_hz {
            return Err(HalError::Unsupported);
        }
        if !self.running {
            self.driver.tx_enable()?;
            self.set_amp(true)?;
            self.running = true;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HalError> {
        if self.running {
            self.set_amp(false)?;
            self.driver.tx_disable()?;
            self.running = false;
        }
        Ok(())
    }

    fn write(&mut self, buf: &[Sample]) -> Result<(), HalError> {
        if !self.running {
            return Err(HalError::NotStarted);
        }
        for chunk in buf.chunks(MAX_CHUNK_SAMPLES) {
            let len = chunk.len() * SAMPLE_BYTES;
            for (bytes, s) in self.raw[..len].chunks_exact_mut(SAMPLE_BYTES).zip(chunk) {
                bytes.copy_from_slice(&s.to_le_bytes());
            }

            let mut sent = 0;
            while sent < len {
                sent += self.driver.write(&self.raw[sent..len], BLOCK)?;
            }
        }
        Ok(())
    }
}
