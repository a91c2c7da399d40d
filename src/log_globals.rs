//! Global log stream instance.
//!
//! Single producer per stream: only the relay task logs. The radio receive
//! context never logs, it only bumps counters in [`crate::stats::RelayStats`].

use crate::logging::LogStream;

/// Relay task log stream.
///
/// Single producer (relay task, including bring-up before the loop starts),
/// single consumer (console drain).
pub static RELAY_LOG: LogStream = LogStream::new();
