//! Half-duplex relay coordinator.
//!
//! Pure logic over injected collaborators. Fully testable on host with a
//! fake clock.
//!
//! # Phases
//!
//! ```text
//!            PTT asserted && dwell elapsed
//!   RECEIVE ───────────────────────────────▶ TRANSMIT
//!      ▲                                         │
//!      └─────────────────────────────────────────┘
//!            PTT released && dwell elapsed
//! ```
//!
//! - **Receive**: pop a chunk from the playback ring, write it to the
//!   speaker. Paced by the speaker, not by a timer.
//! - **Transmit**: read a chunk from the microphone, feed every sample to
//!   the transport.
//!
//! Both phases last at least `dwell_ms`. The push-to-talk input is not
//! even sampled before the floor has elapsed, which debounces the button.
//! The RECEIVE phase entered at boot has no floor.

use core::convert::Infallible;

use crate::audio::SampleRing;
use crate::config::{ConfigError, RelayConfig, COLOR_OFF, MAX_CHUNK_SAMPLES};
use crate::hal::{
    AudioCapture, AudioSink, Clock, HalError, PushToTalk, RadioLink, RelayDevices,
    StatusIndicator,
};
use crate::logging::LogStream;
use crate::sample::{Sample, SILENCE};
use crate::stats::RelayStats;
use crate::transport::Transport;
use crate::{rt_info, rt_warn};

/// Relay phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Playing audio received from peers (initial)
    Receive,
    /// Capturing and broadcasting
    Transmit,
}

/// Collaborator failure that ends the relay loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("microphone: {0}")]
    Capture(HalError),
    #[error("speaker: {0}")]
    Playback(HalError),
    #[error("radio: {0}")]
    Radio(HalError),
}

/// The relay state machine.
pub struct RelayCoordinator<'a, M, S, I, P, K, R, const C: usize> {
    devices: RelayDevices<M, S, I, P, K>,
    transport: Transport<'a, R>,
    ring: &'a SampleRing<C>,
    log: &'a LogStream,
    stats: &'a RelayStats,
    config: RelayConfig,
    phase: Phase,
    /// Phase entry time; `None` while the boot RECEIVE phase lasts.
    entered_us: Option<u64>,
    /// Send failure already logged during this TRANSMIT phase.
    send_failure_logged: bool,
    chunk: [Sample; MAX_CHUNK_SAMPLES],
}

impl<'a, M, S, I, P, K, R, const C: usize> RelayCoordinator<'a, M, S, I, P, K, R, C>
where
    M: AudioCapture,
    S: AudioSink,
    I: StatusIndicator,
    P: PushToTalk,
    K: Clock,
    R: RadioLink,
{
    pub fn new(
        devices: RelayDevices<M, S, I, P, K>,
        transport: Transport<'a, R>,
        ring: &'a SampleRing<C>,
        log: &'a LogStream,
        stats: &'a RelayStats,
        config: RelayConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            devices,
            transport,
            ring,
            log,
            stats,
            config,
            phase: Phase::Receive,
            entered_us: None,
            send_failure_logged: false,
            chunk: [SILENCE; MAX_CHUNK_SAMPLES],
        })
    }

    /// Device bring-up: radio first, then speaker output.
    ///
    /// The indicator flashes while the radio comes up and turns solid once
    /// it is ready.
    pub fn begin(&mut self) -> Result<(), RelayError> {
        let now = self.devices.clock.now_us();
        self.devices.indicator.set_default_color(COLOR_OFF);
        self.devices
            .indicator
            .set_flashing(true, self.config.connecting_color);

        self.transport.begin().map_err(RelayError::Radio)?;
        rt_info!(self.log, now, "Radio up on channel {}", self.config.radio_channel);

        self.devices.indicator.set_default_color(self.config.ready_color);
        self.devices
            .indicator
            .set_flashing(false, self.config.ready_color);

        self.devices
            .speaker
            .start(self.config.sample_rate_hz)
            .map_err(RelayError::Playback)?;
        rt_info!(self.log, self.devices.clock.now_us(), "Started receiving");
        Ok(())
    }

    /// Run forever. Returns only when a collaborator fails to start or stop.
    pub fn run(&mut self) -> Result<Infallible, RelayError> {
        loop {
            self.step()?;
        }
    }

    /// One iteration of the current phase.
    ///
    /// Checks the exit condition first, then moves one chunk. Returns the
    /// phase the relay is in afterwards.
    pub fn step(&mut self) -> Result<Phase, RelayError> {
        let now = self.devices.clock.now_us();
        match self.phase {
            Phase::Receive => {
                if self.dwell_elapsed(now) && self.devices.ptt.is_asserted() {
                    self.enter_transmit(now)?;
                } else {
                    self.play_chunk();
                }
            }
            Phase::Transmit => {
                if self.dwell_elapsed(now) && !self.devices.ptt.is_asserted() {
                    self.enter_receive(now)?;
                } else {
                    self.capture_chunk(now);
                }
            }
        }
        Ok(self.phase)
    }

    fn dwell_elapsed(&self, now: u64) -> bool {
        match self.entered_us {
            Some(entered) => now.saturating_sub(entered) >= self.config.dwell_us(),
            None => true,
        }
    }

    fn enter_transmit(&mut self, now: u64) -> Result<(), RelayError> {
        rt_info!(self.log, now, "Started transmitting");
        self.devices.speaker.stop().map_err(RelayError::Playback)?;
        self.devices.mic.start().map_err(RelayError::Capture)?;
        self.devices
            .indicator
            .set_flashing(true, self.config.transmit_color);

        self.phase = Phase::Transmit;
        self.entered_us = Some(now);
        self.send_failure_logged = false;
        Ok(())
    }

    fn enter_receive(&mut self, now: u64) -> Result<(), RelayError> {
        if let Err(e) = self.transport.flush() {
            self.note_send_failure(now, e);
        }
        self.devices.mic.stop().map_err(RelayError::Capture)?;
        self.devices
            .speaker
            .start(self.config.sample_rate_hz)
            .map_err(RelayError::Playback)?;
        self.devices
            .indicator
            .set_flashing(false, self.config.transmit_color);
        rt_info!(self.log, now, "Finished transmitting");
        rt_info!(self.log, now, "Started receiving");

        self.phase = Phase::Receive;
        self.entered_us = Some(now);
        Ok(())
    }

    fn play_chunk(&mut self) {
        let chunk = &mut self.chunk[..self.config.chunk_samples];
        self.ring.pop(chunk);
        if self.devices.speaker.write(chunk).is_err() {
            self.stats.record_playback_error();
        }
    }

    fn capture_chunk(&mut self, now: u64) {
        let n = self.config.chunk_samples;
        let read = match self.devices.mic.read(&mut self.chunk[..n]) {
            Ok(read) => read.min(n),
            Err(_) => {
                self.stats.record_capture_error();
                0
            }
        };

        for i in 0..read {
            if let Err(e) = self.transport.add_sample(self.chunk[i]) {
                self.note_send_failure(now, e);
            }
        }
    }

    fn note_send_failure(&mut self, now: u64, e: HalError) {
        if !self.send_failure_logged {
            rt_warn!(self.log, now, "Frame dropped: {}", e);
            self.send_failure_logged = true;
        }
    }

    /// Current phase
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Time spent in the current phase, `None` during the boot phase.
    pub fn phase_elapsed_us(&self) -> Option<u64> {
        let now = self.devices.clock.now_us();
        self.entered_us.map(|entered| now.saturating_sub(entered))
    }

    #[inline]
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    #[inline]
    pub fn transport(&self) -> &Transport<'a, R> {
        &self.transport
    }

    #[inline]
    pub fn transport_mut(&mut self) -> &mut Transport<'a, R> {
        &mut self.transport
    }

    #[inline]
    pub fn devices(&self) -> &RelayDevices<M, S, I, P, K> {
        &self.devices
    }

    #[inline]
    pub fn devices_mut(&mut self) -> &mut RelayDevices<M, S, I, P, K> {
        &mut self.devices
    }
}
