// src/common/timing.rs

use core::time::Duration;

// Note: Tolerances are generally +/- 0.40 ms according to the SDI-12 standard
// (Sec 7.0). We define the nominal values here.

// === Break Timing (Sec 7.0, 7.1) ===

/// Minimum duration for a valid break signal (recorder must send >= 12 ms).
pub const BREAK_DURATION_MIN: Duration = Duration::from_millis(12);
/// Marking time required after a break before sensor looks for an address.
pub const POST_BREAK_MARKING_MIN: Duration = Duration::from_micros(8330);

// === Byte Timing at 1200 Baud (7E1) ===
// 1 start bit + 7 data bits + 1 parity bit + 1 stop bit = 10 bits per byte

/// Nominal duration of a single byte (10 bits total) at 1200 baud (7E1 format).
pub const BYTE_DURATION: Duration = Duration::from_micros(8333);

// === Recorder-side budgets ===

/// Pause after each command before the reply is read.
pub const COMMAND_DELAY: Duration = Duration::from_millis(30);
/// Per-line read timeout on the SDI-12 line. Ten times the 15 ms the
/// standard allows a sensor before it must start answering.
pub const SDI12_READ_TIMEOUT: Duration = Duration::from_millis(150);
/// Upper bound on the wait for a data reply to start arriving.
pub const DATA_REPLY_WAIT_MAX: Duration = Duration::from_millis(1500);

/// Stream timeout for continuous-output ranging sensors. The slowest of
/// them still report at 6 Hz (166 ms).
pub const RANGING_READ_TIMEOUT: Duration = Duration::from_millis(180);
/// Trigger pulse width; the sonar needs the line high for more than 20 us.
pub const TRIGGER_PULSE: Duration = Duration::from_micros(30);

/// Sleep between polls while waiting on a `WouldBlock` operation.
pub const POLL_INTERVAL_US: u32 = 100;
