//! Display helpers for render latencies

/// Human-readable duration: microseconds below 1 ms, two decimals below
/// 10 ms, one decimal above.
pub fn format_time(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.1}μs", ms * 1000.0)
    } else if ms < 10.0 {
        format!("{:.2}ms", ms)
    } else {
        format!("{:.1}ms", ms)
    }
}

/// Traffic-light color for a latency
pub fn performance_color(ms: f64) -> &'static str {
    if ms < 1.0 {
        "#10b981"
    } else if ms < 5.0 {
        "#f59e0b"
    } else {
        "#ef4444"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_units_by_magnitude() {
        assert_eq!(format_time(0.25), "250.0μs");
        assert_eq!(format_time(0.0), "0.0μs");
        assert_eq!(format_time(1.0), "1.00ms");
        assert_eq!(format_time(3.14159), "3.14ms");
        assert_eq!(format_time(10.0), "10.0ms");
        assert_eq!(format_time(123.46), "123.5ms");
    }

    #[test]
    fn color_thresholds() {
        assert_eq!(performance_color(0.5), "#10b981");
        assert_eq!(performance_color(1.0), "#f59e0b");
        assert_eq!(performance_color(4.99), "#f59e0b");
        assert_eq!(performance_color(5.0), "#ef4444");
    }
}
