//! Byte-count helpers

const KIB: f64 = 1024.0;
const UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Megabytes rounded to two decimal places
#[allow(clippy::cast_precision_loss)]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 / KIB / KIB * 100.0).round() / 100.0
}

/// Human-readable size such as `1.5 KB`
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut scaled = bytes as f64;
    let mut exponent = 0;
    while scaled >= KIB && exponent < UNITS.len() - 1 {
        scaled /= KIB;
        exponent += 1;
    }

    // Round, then print without trailing zeros
    let factor = 10f64.powi(decimals as i32);
    let rounded = (scaled * factor).round() / factor;
    format!("{} {}", rounded, UNITS[exponent])
}
