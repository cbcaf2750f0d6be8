use chrono::{NaiveDate, NaiveDateTime};

/// Parses a date out of user-supplied text, accepting ISO (`2024-03-01`),
/// French (`01/03/2024`) and datetime-prefixed (`2024-03-01 10:00:00`)
/// forms. Returns `None` when nothing matches.
pub fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    let date_only = input.split_whitespace().next()?.trim();
    if date_only.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(date_only, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(date_only, "%d/%m/%Y") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(input.trim(), "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(datetime.date());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_and_french_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_flexible_date("2024-03-01"), Some(expected));
        assert_eq!(parse_flexible_date("01/03/2024"), Some(expected));
        assert_eq!(parse_flexible_date("2024-03-01 15:30:00"), Some(expected));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_flexible_date(""), None);
        assert_eq!(parse_flexible_date("not-a-date"), None);
    }
}
