//! Human-readable size and duration strings for session snapshots.

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Binary units, at most two decimals, trailing zeros trimmed.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = (bytes.ilog2() / 10).min(SIZE_UNITS.len() as u32 - 1);
    let value = bytes as f64 / f64::powi(1024.0, exponent as i32);
    let rendered = format!("{:.2}", value);
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rendered, SIZE_UNITS[exponent as usize])
}

/// Minutes:seconds, or "Unknown" when the duration was not probed.
pub fn format_duration(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite() && *s >= 0.0) else {
        return "Unknown".to_string();
    };
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bytes() {
        assert_eq!(format_file_size(0), "0 Bytes");
    }

    #[test]
    fn small_sizes_stay_in_bytes() {
        assert_eq!(format_file_size(512), "512 Bytes");
    }

    #[test]
    fn kilobytes_trim_trailing_zeros() {
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
    }

    #[test]
    fn megabytes_round_to_two_decimals() {
        assert_eq!(format_file_size(8 * 1024 * 1024), "8 MB");
        assert_eq!(format_file_size(104_857_600), "100 MB");
    }

    #[test]
    fn gigabytes_cap_the_unit_scale() {
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn duration_minutes_and_padded_seconds() {
        assert_eq!(format_duration(Some(90.5)), "1:30");
        assert_eq!(format_duration(Some(59.9)), "0:59");
        assert_eq!(format_duration(Some(600.0)), "10:00");
    }

    #[test]
    fn duration_unknown() {
        assert_eq!(format_duration(None), "Unknown");
        assert_eq!(format_duration(Some(f64::NAN)), "Unknown");
    }
}
