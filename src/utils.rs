use serde::Serialize;

/// True when `s` is non-empty and made only of ASCII digits.
pub fn is_digits_only(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Serialize a serde-backed enum into its string name (e.g. SCREAMING_SNAKE_CASE).
pub fn serde_enum_name<T: Serialize>(val: &T) -> Option<String> {
    serde_json::to_value(val).ok()?.as_str().map(|s| s.to_string())
}

/// Render an optional temperature for display, `-` when absent.
pub fn format_temperature(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}°C", v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::room::WindowStatus;

    #[test]
    fn digits_only() {
        assert!(is_digits_only("42"));
        assert!(is_digits_only("007"));
        assert!(!is_digits_only(""));
        assert!(!is_digits_only("-1"));
        assert!(!is_digits_only("4 2"));
        assert!(!is_digits_only("Lab"));
    }

    #[test]
    fn enum_names() {
        assert_eq!(serde_enum_name(&WindowStatus::Open).as_deref(), Some("OPEN"));
        assert_eq!(serde_enum_name(&WindowStatus::Closed).as_deref(), Some("CLOSED"));
    }

    #[test]
    fn temperature_display() {
        assert_eq!(format_temperature(Some(21.27)), "21.3°C");
        assert_eq!(format_temperature(Some(19.0)), "19.0°C");
        assert_eq!(format_temperature(None), "-");
    }
}
