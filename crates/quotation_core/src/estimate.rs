//! Rough duration estimate and size formatting for user feedback only.

const MIN_ESTIMATE_SECS: u64 = 3;
const MAX_ESTIMATE_SECS: u64 = 120;
const SECS_PER_MIB: f64 = 0.6;

/// Simulated progress stops here until the real response arrives.
pub const MAX_SIMULATED_PROGRESS: u8 = 95;

/// Expected processing time for `total_bytes` of uploads, in seconds.
pub fn estimate_seconds(total_bytes: u64) -> u64 {
    let mib = total_bytes as f64 / (1024.0 * 1024.0);
    let raw = (MIN_ESTIMATE_SECS as f64 + mib * SECS_PER_MIB).round() as u64;
    raw.clamp(MIN_ESTIMATE_SECS, MAX_ESTIMATE_SECS)
}

/// Percentage shown while a request is in flight.
pub fn simulated_progress(elapsed_ms: u64, estimate_secs: u64) -> u8 {
    let estimate_ms = estimate_secs.max(1) * 1000;
    let percent = elapsed_ms.saturating_mul(100) / estimate_ms;
    percent.min(u64::from(MAX_SIMULATED_PROGRESS)) as u8
}

/// Human-readable byte count, base 1024.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit >= 2 {
        format!("{value:.2} {}", UNITS[unit])
    } else {
        format!("{value:.0} {}", UNITS[unit])
    }
}
