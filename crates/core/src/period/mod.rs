//! Period expression resolver.
//!
//! Converts the time expressions the assistant receives ("hoy", "ayer",
//! "esta semana", "18 de agosto", "últimos 3 meses", a bare month name)
//! into an inclusive `[start, end]` timestamp range used to build order
//! query filters.
//!
//! The reference instant is an explicit parameter rather than a clock read,
//! so resolution is deterministic and tests can pin `now` across month and
//! year boundaries. The resolver performs no I/O and holds no state beyond
//! the static month table.

mod months;

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use thiserror::Error;

/// Timestamp layout expected by the n8n Odoo node.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Prefix match, like the expressions the assistant produces: trailing text
// after the month name is ignored ("18 de agosto por favor").
static DAY_OF_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\s+de\s+([a-zA-Z]+)").expect("day-of-month pattern is valid")
});

/// Inclusive timestamp range with second precision.
///
/// `start` always carries time-of-day `00:00:00` and `end` `23:59:59`;
/// the invariant `start <= end` holds for every value the resolver returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    fn single_day(date: NaiveDate) -> Self {
        Self {
            start: at_day_start(date),
            end: at_day_end(date),
        }
    }

    /// Range start formatted for the webhook payload.
    pub fn start_string(&self) -> String {
        self.start.format(DATETIME_FORMAT).to_string()
    }

    /// Range end formatted for the webhook payload.
    pub fn end_string(&self) -> String {
        self.end.format(DATETIME_FORMAT).to_string()
    }
}

/// Failures the resolver can report. Every variant carries the offending
/// input so callers can relay it verbatim; messages are the Spanish texts
/// the assistant shows users.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Mes no soportado en la fecha `{0}`")]
    UnsupportedMonth(String),
    #[error("Fecha inválida: {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("Formato de periodo no soportado: {0}")]
    UnsupportedPeriodFormat(String),
    #[error("Periodo no soportado: {0}")]
    UnsupportedPeriod(String),
}

/// The recognized period shapes, in match precedence order.
///
/// Order matters: `DaySpecific` goes first so "18 de agosto" is never
/// shadowed, and `LastN` goes before `BareMonth` so "últimos 2 meses" is
/// not treated as an unknown month name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeriodRule {
    DaySpecific { day: u32, month_name: String },
    Today,
    Yesterday,
    ThisWeek,
    LastN,
    BareMonth { month: u32 },
}

/// Syntactic classification of a trimmed, lower-cased period expression.
/// Returns the first matching rule; semantic validation (month names in the
/// day-specific form, token structure in `LastN`) happens during resolution.
pub fn classify(period: &str) -> Option<PeriodRule> {
    if let Some(caps) = DAY_OF_MONTH.captures(period) {
        // One or two digits always fit in u32.
        let day = caps[1].parse().ok()?;
        return Some(PeriodRule::DaySpecific {
            day,
            month_name: caps[2].to_string(),
        });
    }

    match period {
        "hoy" => return Some(PeriodRule::Today),
        "ayer" => return Some(PeriodRule::Yesterday),
        "esta semana" => return Some(PeriodRule::ThisWeek),
        _ => {}
    }

    // Covers both "último" and "últimos", anywhere in the expression.
    if period.contains("último") {
        return Some(PeriodRule::LastN);
    }

    months::month_number(period).map(|month| PeriodRule::BareMonth { month })
}

/// Resolve a period expression to an inclusive timestamp range.
///
/// `year` defaults to the calendar year of `now`. Matching is
/// case-insensitive and ignores surrounding whitespace.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ordena_core::period::resolve;
///
/// let now = NaiveDate::from_ymd_opt(2024, 3, 10)
///     .unwrap()
///     .and_hms_opt(15, 0, 0)
///     .unwrap();
/// let range = resolve("hoy", None, now).unwrap();
/// assert_eq!(range.start_string(), "2024-03-10 00:00:00");
/// assert_eq!(range.end_string(), "2024-03-10 23:59:59");
/// ```
pub fn resolve(
    period: &str,
    year: Option<i32>,
    now: NaiveDateTime,
) -> Result<DateRange, PeriodError> {
    let normalized = period.trim().to_lowercase();
    let year = year.unwrap_or_else(|| now.year());

    match classify(&normalized) {
        Some(PeriodRule::DaySpecific { day, month_name }) => {
            let month = months::month_number(&month_name)
                .ok_or(PeriodError::UnsupportedMonth(month_name))?;
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or(PeriodError::InvalidDate { year, month, day })?;
            Ok(DateRange::single_day(date))
        }
        Some(PeriodRule::Today) => Ok(DateRange::single_day(now.date())),
        Some(PeriodRule::Yesterday) => Ok(DateRange::single_day(now.date() - Duration::days(1))),
        Some(PeriodRule::ThisWeek) => {
            let monday =
                now.date() - Duration::days(i64::from(now.weekday().num_days_from_monday()));
            Ok(DateRange {
                start: at_day_start(monday),
                end: at_day_end(monday + Duration::days(6)),
            })
        }
        Some(PeriodRule::LastN) => resolve_last_n(&normalized, now),
        Some(PeriodRule::BareMonth { month }) => month_range(year, month),
        None => Err(PeriodError::UnsupportedPeriod(normalized)),
    }
}

/// "último(s) N mes(es)/año(s)": flat 30-day months and 365-day years,
/// counted back from `now`. The approximation is part of the workflow
/// contract and is kept as-is rather than made calendar-accurate.
fn resolve_last_n(normalized: &str, now: NaiveDateTime) -> Result<DateRange, PeriodError> {
    let unsupported = || PeriodError::UnsupportedPeriodFormat(normalized.to_string());

    let mut tokens = normalized.split_whitespace();
    let _keyword = tokens.next();
    let count: u32 = tokens
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(unsupported)?;
    let unit = tokens.next().ok_or_else(unsupported)?;

    let days = if unit.contains("mes") {
        30 * i64::from(count)
    } else if unit.contains("año") {
        365 * i64::from(count)
    } else {
        return Err(unsupported());
    };

    Ok(DateRange {
        start: at_day_start(now.date() - Duration::days(days)),
        end: at_day_end(now.date()),
    })
}

/// First instant of the month through its last instant, the latter derived
/// by subtracting one second from the following month's start so February
/// and leap years fall out correctly.
fn month_range(year: i32, month: u32) -> Result<DateRange, PeriodError> {
    let invalid = PeriodError::InvalidDate {
        year,
        month,
        day: 1,
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(invalid.clone())?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(invalid)?;

    Ok(DateRange {
        start: at_day_start(first),
        end: at_day_start(next_month) - Duration::seconds(1),
    })
}

fn at_day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn at_day_end(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::seconds(86_399)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{classify, resolve, PeriodError, PeriodRule};

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    fn strings(period: &str, year: Option<i32>, now: NaiveDateTime) -> (String, String) {
        let range = resolve(period, year, now).unwrap();
        (range.start_string(), range.end_string())
    }

    #[test]
    fn day_specific_date_resolves_to_full_day() {
        let now = at(2024, 1, 1, 9, 30, 0);
        let (start, end) = strings("18 de agosto", None, now);
        assert_eq!(start, "2024-08-18 00:00:00");
        assert_eq!(end, "2024-08-18 23:59:59");
    }

    #[test]
    fn day_specific_date_honors_explicit_year() {
        let now = at(2024, 6, 15, 12, 0, 0);
        let (start, end) = strings("1 de enero", Some(2020), now);
        assert_eq!(start, "2020-01-01 00:00:00");
        assert_eq!(end, "2020-01-01 23:59:59");
    }

    #[test]
    fn day_specific_date_ignores_trailing_text() {
        let now = at(2024, 1, 1, 0, 0, 0);
        let (start, _) = strings("5 de mayo por favor", None, now);
        assert_eq!(start, "2024-05-05 00:00:00");
    }

    #[test]
    fn day_specific_date_rejects_unknown_month() {
        let now = at(2024, 1, 1, 0, 0, 0);
        assert_eq!(
            resolve("18 de augusto", None, now),
            Err(PeriodError::UnsupportedMonth("augusto".to_string()))
        );
    }

    #[test]
    fn day_specific_date_rejects_impossible_dates() {
        let now = at(2024, 1, 1, 0, 0, 0);
        assert_eq!(
            resolve("31 de abril", None, now),
            Err(PeriodError::InvalidDate {
                year: 2024,
                month: 4,
                day: 31
            })
        );
        // 2023 is not a leap year.
        assert_eq!(
            resolve("29 de febrero", Some(2023), now),
            Err(PeriodError::InvalidDate {
                year: 2023,
                month: 2,
                day: 29
            })
        );
    }

    #[test]
    fn leap_day_is_valid_in_leap_years() {
        let now = at(2024, 1, 1, 0, 0, 0);
        let (start, end) = strings("29 de febrero", None, now);
        assert_eq!(start, "2024-02-29 00:00:00");
        assert_eq!(end, "2024-02-29 23:59:59");
    }

    #[test]
    fn today_tracks_the_reference_instant() {
        let now = at(2024, 3, 10, 15, 0, 0);
        let (start, end) = strings("hoy", None, now);
        assert_eq!(start, "2024-03-10 00:00:00");
        assert_eq!(end, "2024-03-10 23:59:59");
    }

    #[test]
    fn yesterday_shifts_back_one_calendar_day() {
        let now = at(2024, 3, 10, 15, 0, 0);
        let (start, end) = strings("ayer", None, now);
        assert_eq!(start, "2024-03-09 00:00:00");
        assert_eq!(end, "2024-03-09 23:59:59");
    }

    #[test]
    fn yesterday_crosses_month_and_year_boundaries() {
        let now = at(2024, 1, 1, 0, 30, 0);
        let (start, end) = strings("ayer", None, now);
        assert_eq!(start, "2023-12-31 00:00:00");
        assert_eq!(end, "2023-12-31 23:59:59");
    }

    #[test]
    fn this_week_spans_monday_through_sunday() {
        // 2024-03-13 is a Wednesday.
        let now = at(2024, 3, 13, 11, 0, 0);
        let (start, end) = strings("esta semana", None, now);
        assert_eq!(start, "2024-03-11 00:00:00");
        assert_eq!(end, "2024-03-17 23:59:59");
    }

    #[test]
    fn this_week_on_a_monday_starts_today() {
        let now = at(2024, 3, 11, 8, 0, 0);
        let (start, end) = strings("esta semana", None, now);
        assert_eq!(start, "2024-03-11 00:00:00");
        assert_eq!(end, "2024-03-17 23:59:59");
    }

    #[test]
    fn last_n_months_uses_flat_thirty_day_offsets() {
        let now = at(2024, 3, 10, 14, 45, 0);
        let (start, end) = strings("últimos 2 meses", None, now);
        assert_eq!(start, "2024-01-10 00:00:00");
        assert_eq!(end, "2024-03-10 23:59:59");
    }

    #[test]
    fn last_single_month_accepts_singular_form() {
        let now = at(2024, 3, 10, 14, 45, 0);
        let (start, _) = strings("último 1 mes", None, now);
        assert_eq!(start, "2024-02-09 00:00:00");
    }

    #[test]
    fn last_n_years_uses_flat_year_offsets() {
        let now = at(2024, 3, 10, 14, 45, 0);
        let (start, end) = strings("últimos 2 años", None, now);
        // 730 days back, leap days not accounted for.
        assert_eq!(start, "2022-03-11 00:00:00");
        assert_eq!(end, "2024-03-10 23:59:59");
    }

    #[test]
    fn last_n_with_word_count_is_a_format_error() {
        let now = at(2024, 3, 10, 0, 0, 0);
        assert_eq!(
            resolve("últimos dos meses", None, now),
            Err(PeriodError::UnsupportedPeriodFormat(
                "últimos dos meses".to_string()
            ))
        );
    }

    #[test]
    fn last_n_without_unit_is_a_format_error() {
        let now = at(2024, 3, 10, 0, 0, 0);
        assert_eq!(
            resolve("últimos 3", None, now),
            Err(PeriodError::UnsupportedPeriodFormat("últimos 3".to_string()))
        );
        assert_eq!(
            resolve("últimos 3 semanas", None, now),
            Err(PeriodError::UnsupportedPeriodFormat(
                "últimos 3 semanas".to_string()
            ))
        );
    }

    #[test]
    fn bare_month_spans_the_whole_month() {
        let now = at(2024, 6, 1, 0, 0, 0);
        let (start, end) = strings("diciembre", Some(2023), now);
        assert_eq!(start, "2023-12-01 00:00:00");
        assert_eq!(end, "2023-12-31 23:59:59");
    }

    #[test]
    fn february_end_follows_the_leap_cycle() {
        let now = at(2024, 6, 1, 0, 0, 0);
        let (_, end) = strings("febrero", Some(2024), now);
        assert_eq!(end, "2024-02-29 23:59:59");
        let (_, end) = strings("febrero", Some(2023), now);
        assert_eq!(end, "2023-02-28 23:59:59");
    }

    #[test]
    fn bare_month_defaults_to_reference_year() {
        let now = at(2025, 2, 3, 10, 0, 0);
        let (start, _) = strings("enero", None, now);
        assert_eq!(start, "2025-01-01 00:00:00");
    }

    #[test]
    fn input_is_trimmed_and_case_insensitive() {
        let now = at(2024, 3, 10, 15, 0, 0);
        let (start, _) = strings("  HOY  ", None, now);
        assert_eq!(start, "2024-03-10 00:00:00");
        let (start, _) = strings("Enero", Some(2024), now);
        assert_eq!(start, "2024-01-01 00:00:00");
    }

    #[test]
    fn unknown_expressions_fall_through() {
        let now = at(2024, 3, 10, 0, 0, 0);
        assert_eq!(
            resolve("marzo rojo", None, now),
            Err(PeriodError::UnsupportedPeriod("marzo rojo".to_string()))
        );
        assert_eq!(
            resolve("", None, now),
            Err(PeriodError::UnsupportedPeriod(String::new()))
        );
    }

    #[test]
    fn resolution_is_deterministic_for_a_fixed_instant() {
        let now = at(2024, 3, 10, 15, 0, 0);
        assert_eq!(
            resolve("últimos 3 meses", None, now),
            resolve("últimos 3 meses", None, now)
        );
    }

    #[test]
    fn start_never_exceeds_end() {
        let now = at(2024, 2, 29, 23, 59, 59);
        for period in ["hoy", "ayer", "esta semana", "últimos 12 meses", "febrero"] {
            let range = resolve(period, None, now).unwrap();
            assert!(range.start <= range.end, "start > end for {period}");
        }
    }

    #[test]
    fn classification_precedence_is_stable() {
        assert_eq!(
            classify("18 de agosto"),
            Some(PeriodRule::DaySpecific {
                day: 18,
                month_name: "agosto".to_string()
            })
        );
        assert_eq!(classify("hoy"), Some(PeriodRule::Today));
        assert_eq!(classify("ayer"), Some(PeriodRule::Yesterday));
        assert_eq!(classify("esta semana"), Some(PeriodRule::ThisWeek));
        assert_eq!(classify("últimos 2 meses"), Some(PeriodRule::LastN));
        assert_eq!(classify("enero"), Some(PeriodRule::BareMonth { month: 1 }));
        assert_eq!(classify("la semana pasada"), None);
    }
}
