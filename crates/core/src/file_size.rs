//! Human-readable file sizes for upload summaries.

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const BASE: f64 = 1024.0;

/// Format a byte count with base-1024 units and at most one decimal.
///
/// A trailing `.0` is dropped, so `1024` is `"1 KB"` and `1536` is
/// `"1.5 KB"`. Sizes beyond the gigabyte range stay in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= BASE && unit < UNITS.len() - 1 {
        value /= BASE;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{rounded:.1} {}", UNITS[unit])
    }
}
