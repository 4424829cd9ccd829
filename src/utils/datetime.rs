use chrono::{Local, NaiveDate};

/// Wall-clock `HH:MM` stamp recorded on each registration.
pub fn current_time_label() -> String {
    Local::now().format("%H:%M").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Renders a stored session date with its weekday, falling back to the raw
/// text for dates that predate validation.
pub fn describe_session_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%A, %d %B %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_session_date() {
        assert_eq!(describe_session_date("2024-05-14"), "Tuesday, 14 May 2024");
        assert_eq!(describe_session_date("next tuesday"), "next tuesday");
    }

    #[test]
    fn test_current_time_label_shape() {
        let label = current_time_label();
        assert_eq!(label.len(), 5);
        assert_eq!(&label[2..3], ":");
    }
}
