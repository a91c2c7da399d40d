//! WalkieRelay - Main entry point
//!
//! 1. Initialize hardware (Wi-Fi station, ESP-NOW, I2S mic + speaker, GPIO)
//! 2. Start the log drain thread (console, low priority)
//! 3. Run the relay loop on the main task (needs an 8 KB stack, see
//!    sdkconfig.defaults)
//!
//! Host builds only print a notice: the firmware needs ESP-IDF.

#[cfg(target_os = "espidf")]
fn main() {
    esp_idf_svc::sys::link_patches();

    let err = match firmware::run() {
        Ok(never) => match never {},
        Err(e) => e,
    };

    println!("[FATAL] {}", err);
    firmware::flush_logs();

    // Give the console a moment, then start over
    std::thread::sleep(std::time::Duration::from_secs(1));
    unsafe {
        esp_idf_svc::sys::esp_restart();
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "{}: firmware image, build for an ESP-IDF target (e.g. xtensa-esp32-espidf)",
        env!("VERSION_STRING")
    );
    std::process::exit(1);
}

#[cfg(target_os = "espidf")]
mod firmware {
    use core::convert::Infallible;
    use core::fmt;
    use std::thread;
    use std::time::Duration;

    use esp_idf_svc::espnow::EspNow;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::prelude::Peripherals;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::sys::EspError;
    use esp_idf_svc::wifi::{ClientConfiguration, Configuration, EspWifi};

    use walkie_relay::config::{ConfigError, RelayConfig, RING_CAPACITY, TRANSPORT_HEADER};
    use walkie_relay::frame::{FrameCodec, FrameError};
    use walkie_relay::hal::esp::{
        EspClock, EspNowRadio, GpioIndicator, GpioPushToTalk, I2sMemsMic, I2sSpeaker,
    };
    use walkie_relay::hal::{Clock, HalError, RelayDevices};
    use walkie_relay::log_drain::{write_stats, DrainLock};
    use walkie_relay::{
        rt_info, RelayCoordinator, RelayError, RelayStats, SampleRing, Transport, RELAY_LOG,
    };

    /// Playback ring shared with the ESP-NOW receive callback.
    static PLAYBACK_RING: SampleRing<RING_CAPACITY> = SampleRing::new();
    static STATS: RelayStats = RelayStats::new();
    /// Shared by the drain thread and the fatal path.
    static LOG_DRAIN: DrainLock = DrainLock::new();

    /// Statistics line period.
    const STATS_PERIOD: Duration = Duration::from_secs(10);
    /// Drain poll period.
    const DRAIN_PERIOD: Duration = Duration::from_millis(50);

    #[derive(Debug, thiserror::Error)]
    pub enum BootError {
        #[error("esp-idf: {0}")]
        Esp(#[from] EspError),
        #[error("device: {0}")]
        Hal(#[from] HalError),
        #[error("config: {0}")]
        Config(#[from] ConfigError),
        #[error("frame: {0}")]
        Frame(#[from] FrameError),
        #[error("relay: {0}")]
        Relay(#[from] RelayError),
    }

    struct Console;

    impl fmt::Write for Console {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            print!("{}", s);
            Ok(())
        }
    }

    /// Drain whatever is left, waiting out a concurrent drain.
    pub fn flush_logs() {
        while LOG_DRAIN.drain_to(&RELAY_LOG, &mut Console).is_none() {
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn spawn_log_drain() -> Result<(), BootError> {
        thread::Builder::new()
            .name("log-drain".into())
            .stack_size(4096)
            .spawn(|| {
                let mut since_stats = Duration::ZERO;
                loop {
                    let _ = LOG_DRAIN.drain_to(&RELAY_LOG, &mut Console);

                    since_stats += DRAIN_PERIOD;
                    if since_stats >= STATS_PERIOD {
                        let _ = write_stats(&mut Console, &STATS.snapshot(&PLAYBACK_RING));
                        since_stats = Duration::ZERO;
                    }
                    thread::sleep(DRAIN_PERIOD);
                }
            })
            .map_err(|_| HalError::Busy)?;
        Ok(())
    }

    pub fn run() -> Result<Infallible, BootError> {
        let config = RelayConfig::DEFAULT;
        config.validate()?;

        spawn_log_drain()?;
        let clock = EspClock;
        rt_info!(RELAY_LOG, clock.now_us(), "{}", env!("VERSION_STRING"));

        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;

        // Status LED first so bring-up is visible
        let indicator = GpioIndicator::new(pins.gpio2.into())?;

        // Wi-Fi station mode, no association: ESP-NOW only needs the radio up
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;
        let mut wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;
        wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
        wifi.start()?;
        let mac = wifi.sta_netif().get_mac()?;
        rt_info!(
            RELAY_LOG,
            clock.now_us(),
            "My MAC address is: {:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            mac[0],
            mac[1],
            mac[2],
            mac[3],
            mac[4],
            mac[5]
        );

        let radio = EspNowRadio::new(EspNow::take()?, config.radio_channel);
        let codec = FrameCodec::new(TRANSPORT_HEADER)?;
        let mut transport = Transport::new(radio, codec, &STATS);
        transport.listen(&PLAYBACK_RING)?;

        let mic = I2sMemsMic::new(
            peripherals.i2s0,
            config.sample_rate_hz,
            pins.gpio32,
            pins.gpio33,
            pins.gpio25,
        )?;
        let speaker = I2sSpeaker::new(
            peripherals.i2s1,
            config.sample_rate_hz,
            pins.gpio27,
            pins.gpio13,
            pins.gpio26,
            Some(pins.gpio22.into()),
        )?;
        let ptt = GpioPushToTalk::new(pins.gpio23.into())?;

        let devices = RelayDevices {
            mic,
            speaker,
            indicator,
            ptt,
            clock,
        };
        let mut relay = RelayCoordinator::new(
            devices,
            transport,
            &PLAYBACK_RING,
            &RELAY_LOG,
            &STATS,
            config,
        )?;

        // `wifi` stays in scope: the radio is up for as long as the relay runs
        relay.begin()?;
        Ok(relay.run()?)
    }
}
