use chrono::{Datelike, NaiveDate};

use super::patterns::BARE_YEAR;

struct DateFormat {
    pattern: &'static str,
    four_digit_year: bool,
}

impl DateFormat {
    const fn new(pattern: &'static str, four_digit_year: bool) -> Self {
        Self {
            pattern,
            four_digit_year,
        }
    }

    fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let date = NaiveDate::parse_from_str(raw, self.pattern).ok()?;
        // `%Y` happily reads "22" as the year 22.
        if self.four_digit_year && date.year() < 1000 {
            return None;
        }
        Some(date)
    }
}

/// Tried in order; the first format that parses wins. Numeric forms are
/// day-first.
const FORMATS: &[DateFormat] = &[
    DateFormat::new("%d/%m/%Y", true),
    DateFormat::new("%d-%m-%Y", true),
    DateFormat::new("%d/%m/%y", false),
    DateFormat::new("%d-%m-%y", false),
    DateFormat::new("%Y-%m-%d", true),
    DateFormat::new("%d %b %Y", true),
    DateFormat::new("%d %B %Y", true),
    DateFormat::new("%b %d, %Y", true),
    DateFormat::new("%B %d, %Y", true),
];

/// Converts a raw date substring into a calendar date.
///
/// When no format parses, a 4-digit year between 1900 and 2099 anywhere in
/// the input yields January 1st of that year. Anything else is `None`.
#[must_use]
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    FORMATS
        .iter()
        .find_map(|format| format.parse(raw))
        .or_else(|| year_only(raw))
}

fn year_only(raw: &str) -> Option<NaiveDate> {
    let re = match BARE_YEAR.regex() {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("Year fallback unavailable: {}", e);
            return None;
        }
    };

    let year = re.find(raw)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(raw: &str) -> Option<String> {
        normalize_date(raw).map(|d| d.to_string())
    }

    #[test]
    fn test_iso_round_trip() {
        assert_eq!(iso("2022-01-01").as_deref(), Some("2022-01-01"));
    }

    #[test]
    fn test_bare_year() {
        assert_eq!(iso("2022").as_deref(), Some("2022-01-01"));
        assert_eq!(iso("wfil/2022").as_deref(), Some("2022-01-01"));
    }

    #[test]
    fn test_numeric_day_first() {
        assert_eq!(iso("12/03/2021").as_deref(), Some("2021-03-12"));
        assert_eq!(iso("1/2/2022").as_deref(), Some("2022-02-01"));
        assert_eq!(iso("07-08-2019").as_deref(), Some("2019-08-07"));
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(iso("01-02-22").as_deref(), Some("2022-02-01"));
        assert_eq!(iso("15/06/99").as_deref(), Some("1999-06-15"));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(iso("5 Mar 2020").as_deref(), Some("2020-03-05"));
        assert_eq!(iso("5 March 2020").as_deref(), Some("2020-03-05"));
        assert_eq!(iso("Jan 7, 2019").as_deref(), Some("2019-01-07"));
        assert_eq!(iso("January 7, 2019").as_deref(), Some("2019-01-07"));
    }

    #[test]
    fn test_invalid_calendar_date_falls_back_to_year() {
        assert_eq!(iso("31/02/2022").as_deref(), Some("2022-01-01"));
    }

    #[test]
    fn test_unparseable() {
        assert!(normalize_date("").is_none());
        assert!(normalize_date("   ").is_none());
        assert!(normalize_date("garbage").is_none());
        assert!(normalize_date("5 Mar 20").is_none());
        assert!(normalize_date("year 3020").is_none());
    }
}
