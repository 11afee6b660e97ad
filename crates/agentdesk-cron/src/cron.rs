//! Day-level cron matching.
//!
//! Supported syntax per field is `*`, a single integer, or (day-of-week only)
//! a comma-separated list. Minute and hour never take part in matching.
//!
//! Integer tokens are read by their leading digits: `"15x"` is 15 and
//! `"3.0"` is 3. A token with no leading digits is not a number.

use chrono::{Datelike, NaiveDate};

const FIELD_COUNT: usize = 5;

/// Returns true if an entry with this cron expression should appear on `date`.
///
/// Expressions without exactly five fields match nothing. A token without
/// leading digits never equals any date component.
pub fn cron_matches_date(cron_expr: &str, date: NaiveDate) -> bool {
    let fields: Vec<&str> = cron_expr.split_whitespace().collect();
    let [_minute, _hour, day_of_month, month, day_of_week] = fields[..] else {
        return false;
    };

    // Cron months are 1-indexed, same as chrono.
    if month != "*" && parse_int_prefix(month) != Some(i64::from(date.month())) {
        return false;
    }

    if day_of_week != "*" {
        let weekday = i64::from(date.weekday().num_days_from_sunday());
        if !day_of_week.split(',').filter_map(parse_int_prefix).any(|d| d == weekday) {
            return false;
        }
    }

    if day_of_month != "*" && parse_int_prefix(day_of_month) != Some(i64::from(date.day())) {
        return false;
    }

    true
}

/// Nominal hour of a cron expression, used to order entries within a day.
///
/// Returns 0 when the hour field is missing or has no leading digits.
pub fn hour_of(cron_expr: &str) -> i64 {
    cron_expr
        .split_whitespace()
        .nth(1)
        .and_then(parse_int_prefix)
        .unwrap_or(0)
}

/// True when the expression has exactly five fields.
pub fn is_well_formed(cron_expr: &str) -> bool {
    cron_expr.split_whitespace().count() == FIELD_COUNT
}

/// Leading base-10 integer of `token`, with an optional sign.
///
/// Saturates at the `i64` bounds. `None` when no digit follows the sign.
pub fn parse_int_prefix(token: &str) -> Option<i64> {
    let token = token.trim();
    let (negative, rest) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit);

    let mut value: i64 = 0;
    let mut seen = false;
    for digit in digits {
        seen = true;
        let digit = i64::from(digit - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    seen.then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn every_day(year: i32) -> impl Iterator<Item = NaiveDate> {
        date(year, 1, 1)
            .iter_days()
            .take_while(move |d| d.year() == year)
    }

    #[test]
    fn test_all_wildcards_match_every_day() {
        for year in [2023, 2024] {
            assert!(every_day(year).all(|d| cron_matches_date("* * * * *", d)));
        }
        assert!(cron_matches_date("*/5 3 * * *", date(2024, 2, 29)));
    }

    #[test]
    fn test_day_of_month() {
        let expr = "0 9 15 * *";
        let march: Vec<NaiveDate> = (1..=31)
            .map(|d| date(2024, 3, d))
            .filter(|d| cron_matches_date(expr, *d))
            .collect();
        assert_eq!(march, vec![date(2024, 3, 15)]);

        for month in 1..=12 {
            assert!(cron_matches_date(expr, date(2025, month, 15)));
        }
    }

    #[test]
    fn test_day_of_week_list() {
        let expr = "0 0 * * 1,3,5";
        for d in every_day(2024) {
            let dow = d.weekday().num_days_from_sunday();
            assert_eq!(cron_matches_date(expr, d), matches!(dow, 1 | 3 | 5), "{d}");
        }
    }

    #[test]
    fn test_day_of_week_list_with_spaces_inside_is_not_a_list() {
        // "1, 3" splits into six fields.
        assert!(!cron_matches_date("0 0 * * 1, 3", date(2024, 1, 1)));
    }

    #[test]
    fn test_month() {
        let expr = "0 0 * 12 *";
        for year in [1999, 2024, 2100] {
            for d in every_day(year) {
                assert_eq!(cron_matches_date(expr, d), d.month() == 12, "{d}");
            }
        }
    }

    #[test]
    fn test_combined_fields_must_all_agree() {
        // 2024-02-29 is a Thursday.
        assert!(cron_matches_date("0 8 29 2 4", date(2024, 2, 29)));
        assert!(!cron_matches_date("0 8 29 2 5", date(2024, 2, 29)));
        assert!(!cron_matches_date("0 8 29 3 4", date(2024, 2, 29)));
        // Non-leap year has no Feb 29 to match.
        assert!(!every_day(2023).any(|d| cron_matches_date("0 0 29 2 *", d)));
    }

    #[test]
    fn test_wrong_field_count_matches_nothing() {
        for expr in ["0 9 * *", "", "bad cron", "0 0 * * * *"] {
            assert!(!every_day(2024).any(|d| cron_matches_date(expr, d)), "{expr}");
        }
    }

    #[test]
    fn test_unparseable_tokens_never_match() {
        let d = date(2024, 6, 1);
        assert!(!cron_matches_date("0 0 x * *", d));
        assert!(!cron_matches_date("0 0 * jun *", d));
        assert!(!cron_matches_date("0 0 * * sat", d));
        assert!(!cron_matches_date("0 0 */2 * *", d));
        assert!(!cron_matches_date("0 0 - * *", d));
    }

    #[test]
    fn test_tokens_are_read_by_leading_digits() {
        assert!(cron_matches_date("0 9 15x * *", date(2024, 3, 15)));
        assert!(!cron_matches_date("0 9 15x * *", date(2024, 3, 16)));
        assert!(cron_matches_date("0 9 * 3.0 *", date(2024, 3, 15)));
        // A range is read as its first value.
        assert!(cron_matches_date("0 0 1-5 * *", date(2024, 6, 1)));
        assert!(!cron_matches_date("0 0 1-5 * *", date(2024, 6, 2)));
        // 2024-06-01 is a Saturday.
        assert!(cron_matches_date("0 0 * * 6th", date(2024, 6, 1)));
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("15"), Some(15));
        assert_eq!(parse_int_prefix(" 07 "), Some(7));
        assert_eq!(parse_int_prefix("+5"), Some(5));
        assert_eq!(parse_int_prefix("-3x"), Some(-3));
        assert_eq!(parse_int_prefix("3.9"), Some(3));
        assert_eq!(parse_int_prefix("x1"), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_int_prefix("-99999999999999999999999"), Some(i64::MIN));
    }

    #[test]
    fn test_bad_token_in_weekday_list_keeps_valid_siblings() {
        // 2024-01-01 is a Monday.
        assert!(cron_matches_date("0 0 * * 1,x", date(2024, 1, 1)));
        assert!(!cron_matches_date("0 0 * * 1,x", date(2024, 1, 2)));
    }

    #[test]
    fn test_minute_and_hour_are_ignored_for_matching() {
        assert!(cron_matches_date("banana 99 * * *", date(2024, 1, 1)));
    }

    #[test]
    fn test_hour_of() {
        assert_eq!(hour_of("30 14 * * *"), 14);
        assert_eq!(hour_of("0 7"), 7);
        assert_eq!(hour_of("bad cron"), 0);
        assert_eq!(hour_of("bad"), 0);
        assert_eq!(hour_of(""), 0);
        assert_eq!(hour_of("0 * * * *"), 0);
        assert_eq!(hour_of("0 14h * * *"), 14);
        assert_eq!(hour_of("0 99999999999 * * *"), 99999999999);
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed(" 0  9 * * 1 "));
        assert!(!is_well_formed("0 9 * *"));
    }
}
