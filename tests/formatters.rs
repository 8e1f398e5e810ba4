#[cfg(test)]
mod tests {
    use restive::libs::break_control::BreakId;
    use restive::libs::formatter::{format_optional_seconds, format_seconds};
    use std::str::FromStr;

    #[test]
    fn test_format_seconds_under_an_hour() {
        assert_eq!(format_seconds(0), "00:00");
        assert_eq!(format_seconds(59), "00:59");
        assert_eq!(format_seconds(180), "03:00");
        assert_eq!(format_seconds(3599), "59:59");
    }

    #[test]
    fn test_format_seconds_with_hours() {
        assert_eq!(format_seconds(3600), "1:00:00");
        assert_eq!(format_seconds(14400), "4:00:00");
        assert_eq!(format_seconds(90061), "25:01:01");
    }

    #[test]
    fn test_format_optional_seconds() {
        assert_eq!(format_optional_seconds(None), "-");
        assert_eq!(format_optional_seconds(Some(45)), "00:45");
    }

    #[test]
    fn test_break_names_round_trip() {
        for id in BreakId::ALL {
            assert_eq!(BreakId::from_str(&id.to_string()).unwrap(), id);
        }
        assert!(BreakId::from_str("coffee").is_err());
    }
}
