use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{1,2})\s+([\p{Cyrillic}]+)\s+(\d{4})").expect("static regex")
    })
}

fn time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("static regex"))
}

fn month_number(name_genitive: &str) -> Option<u32> {
    let n = match name_genitive {
        "января" => 1,
        "февраля" => 2,
        "марта" => 3,
        "апреля" => 4,
        "мая" => 5,
        "июня" => 6,
        "июля" => 7,
        "августа" => 8,
        "сентября" => 9,
        "октября" => 10,
        "ноября" => 11,
        "декабря" => 12,
        _ => return None,
    };
    Some(n)
}

/// Parse a Russian date label (`"1 сентября 2025"`) and an optional
/// `HH:MM` time label into `YYYY-MM-DDTHH:MM:SS` local civil time. Missing
/// time defaults to midnight; any parse failure returns `None`
/// (spec.md §4.2).
pub fn to_iso(date_label: &str, time_label: Option<&str>) -> Option<String> {
    let caps = date_re().captures(date_label)?;
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month_name = caps.get(2)?.as_str().to_lowercase();
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    let month = month_number(&month_name)?;

    let (hour, minute) = match time_label {
        Some(t) => match time_re().captures(t) {
            Some(tc) => {
                let h: u32 = tc.get(1)?.as_str().parse().ok()?;
                let m: u32 = tc.get(2)?.as_str().parse().ok()?;
                (h, m)
            }
            None => (0, 0),
        },
        None => (0, 0),
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let dt = date.and_hms_opt(hour, minute, 0)?;

    Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_date_and_time() {
        assert_eq!(
            to_iso("1 сентября 2025", Some("21:50")),
            Some("2025-09-01T21:50:00".to_string())
        );
    }

    #[test]
    fn missing_time_defaults_to_midnight() {
        assert_eq!(
            to_iso("1 сентября 2025", None),
            Some("2025-09-01T00:00:00".to_string())
        );
    }

    #[test]
    fn unparseable_time_label_falls_back_to_midnight() {
        assert_eq!(
            to_iso("1 сентября 2025", Some("не время")),
            Some("2025-09-01T00:00:00".to_string())
        );
    }

    #[test]
    fn unknown_month_name_fails() {
        assert_eq!(to_iso("1 невестия 2025", Some("10:00")), None);
    }

    #[test]
    fn garbage_date_label_fails() {
        assert_eq!(to_iso("вчера", Some("10:00")), None);
    }
}
