//! Resolves the `month`/`year` query parameters of the report endpoints into
//! concrete half-open date intervals.
//!
//! A request may carry a `month=YYYY-MM` token, a `year=YYYY` token, both or
//! neither. The month token always wins when present: a malformed month must
//! surface a month-specific error rather than silently falling back to the
//! year filter, so that the error matches what the caller most likely meant.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sscanf::sscanf;
use time::{Date, Month};

use crate::transaction::DateSpan;

/// The smallest year accepted by the `year` parameter.
pub const MIN_YEAR: i32 = 1900;
/// The largest year accepted by the `year` parameter.
pub const MAX_YEAR: i32 = 3000;

/// The raw date-range query parameters of a report request.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    /// A month token in `YYYY-MM` format.
    pub month: Option<String>,
    /// A year token, e.g. `2026`.
    pub year: Option<String>,
}

/// The ways the date-range query parameters can be invalid.
///
/// Each variant carries the human-readable message returned to the caller,
/// naming the parameter that failed and its expected format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// The month token does not have the `YYYY-MM` shape.
    #[error("month must be in YYYY-MM format (example: 2026-01)")]
    InvalidMonthFormat,

    /// The month token has the right shape but the month component is not in
    /// 01 through 12.
    #[error("month must be a valid YYYY-MM (month 01 through 12)")]
    InvalidMonthValue,

    /// The year token is not an integer between 1900 and 3000.
    #[error("year must be a 4-digit number (example: 2026)")]
    InvalidYearValue,
}

impl IntoResponse for RangeError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": self.to_string() })),
        )
            .into_response()
    }
}

/// A canonical description of an applied date filter, echoed back to the
/// caller so that API consumers can tell a bounded empty period apart from an
/// all-time query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RangeDescriptor {
    /// A single calendar month, as a zero-padded `YYYY-MM` string.
    Month(String),
    /// A single calendar year.
    Year(i32),
}

/// A validated date filter: a half-open interval plus its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    /// The half-open interval `[start, end)` covered by the filter.
    pub span: DateSpan,
    /// The canonical descriptor for echoing back to the caller.
    pub descriptor: RangeDescriptor,
}

/// Resolve the date-range query parameters into a concrete filter.
///
/// Returns `Ok(None)` when neither parameter is present; callers must treat
/// this as "no date restriction", not as an error.
///
/// # Errors
/// Returns a [RangeError] describing the first invalid parameter. A present
/// but malformed `month` fails with a month-specific error even when a valid
/// `year` is also present.
pub fn resolve_range(query: &RangeQuery) -> Result<Option<ResolvedRange>, RangeError> {
    if let Some(month_token) = &query.month {
        return resolve_month_token(month_token).map(Some);
    }

    if let Some(year_token) = &query.year {
        return resolve_year_token(year_token).map(Some);
    }

    Ok(None)
}

fn resolve_month_token(token: &str) -> Result<ResolvedRange, RangeError> {
    let (year, month_number) = sscanf!(
        token.trim(),
        "{i32:/[0-9][0-9][0-9][0-9]/}-{u8:/[0-9][0-9]/}"
    )
    .ok_or(RangeError::InvalidMonthFormat)?;

    let month = Month::try_from(month_number).map_err(|_| RangeError::InvalidMonthValue)?;

    Ok(ResolvedRange {
        span: month_span(year, month),
        descriptor: RangeDescriptor::Month(format!("{year:04}-{month_number:02}")),
    })
}

fn resolve_year_token(token: &str) -> Result<ResolvedRange, RangeError> {
    let year = parse_year_token(token)?;

    Ok(ResolvedRange {
        span: year_span(year),
        descriptor: RangeDescriptor::Year(year),
    })
}

/// Parse and validate a `year` query parameter.
///
/// # Errors
/// Returns [RangeError::InvalidYearValue] if the token is not an integer in
/// `[1900, 3000]` after trimming whitespace.
pub fn parse_year_token(token: &str) -> Result<i32, RangeError> {
    let year: i32 = token
        .trim()
        .parse()
        .map_err(|_| RangeError::InvalidYearValue)?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(RangeError::InvalidYearValue);
    }

    Ok(year)
}

/// The half-open interval covering one calendar month.
pub fn month_span(year: i32, month: Month) -> DateSpan {
    let (end_year, end_month) = match month {
        Month::December => (year + 1, Month::January),
        month => (year, month.next()),
    };

    DateSpan {
        start: first_of_month(year, month),
        end: first_of_month(end_year, end_month),
    }
}

/// The half-open interval covering one calendar year.
pub fn year_span(year: i32) -> DateSpan {
    DateSpan {
        start: first_of_month(year, Month::January),
        end: first_of_month(year + 1, Month::January),
    }
}

fn first_of_month(year: i32, month: Month) -> Date {
    // The first of the month is valid for every year the resolver accepts.
    Date::from_calendar_date(year, month, 1).expect("invalid first day of month")
}

#[cfg(test)]
mod resolve_range_tests {
    use time::macros::date;

    use super::{RangeDescriptor, RangeError, RangeQuery, ResolvedRange, resolve_range};

    fn month_query(month: &str) -> RangeQuery {
        RangeQuery {
            month: Some(month.to_owned()),
            year: None,
        }
    }

    fn year_query(year: &str) -> RangeQuery {
        RangeQuery {
            month: None,
            year: Some(year.to_owned()),
        }
    }

    #[test]
    fn no_parameters_resolves_to_no_filter() {
        assert_eq!(resolve_range(&RangeQuery::default()), Ok(None));
    }

    #[test]
    fn month_token_resolves_to_calendar_month() {
        let got = resolve_range(&month_query("2026-01")).unwrap().unwrap();

        assert_eq!(got.span.start, date!(2026 - 01 - 01));
        assert_eq!(got.span.end, date!(2026 - 02 - 01));
        assert_eq!(got.descriptor, RangeDescriptor::Month("2026-01".to_owned()));
    }

    #[test]
    fn december_rolls_over_to_january_of_next_year() {
        let got = resolve_range(&month_query("2026-12")).unwrap().unwrap();

        assert_eq!(got.span.start, date!(2026 - 12 - 01));
        assert_eq!(got.span.end, date!(2027 - 01 - 01));
    }

    #[test]
    fn month_span_covers_exactly_the_days_of_the_month() {
        let cases: [(&str, i64); 5] = [
            ("2026-01", 31),
            ("2026-02", 28),
            ("2024-02", 29), // leap year
            ("2026-04", 30),
            ("2026-12", 31),
        ];

        for (token, want_days) in cases {
            let ResolvedRange { span, .. } =
                resolve_range(&month_query(token)).unwrap().unwrap();
            let got_days = (span.end - span.start).whole_days();

            assert_eq!(got_days, want_days, "span for {token}");
            assert_eq!(span.start.day(), 1);
        }
    }

    #[test]
    fn month_descriptor_is_zero_padded() {
        let got = resolve_range(&month_query("2026-09")).unwrap().unwrap();

        assert_eq!(got.descriptor, RangeDescriptor::Month("2026-09".to_owned()));
    }

    #[test]
    fn malformed_month_fails_with_format_error() {
        let cases = ["январь", "2026", "2026-1", "2026/01", "26-01", "2026-013", ""];

        for token in cases {
            assert_eq!(
                resolve_range(&month_query(token)),
                Err(RangeError::InvalidMonthFormat),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn out_of_domain_month_fails_with_value_error() {
        for token in ["2026-00", "2026-13", "2026-99"] {
            assert_eq!(
                resolve_range(&month_query(token)),
                Err(RangeError::InvalidMonthValue),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn invalid_month_does_not_fall_back_to_valid_year() {
        let query = RangeQuery {
            month: Some("2026-13".to_owned()),
            year: Some("2025".to_owned()),
        };

        assert_eq!(resolve_range(&query), Err(RangeError::InvalidMonthValue));
    }

    #[test]
    fn month_wins_over_year_when_both_are_valid() {
        let query = RangeQuery {
            month: Some("2026-03".to_owned()),
            year: Some("2025".to_owned()),
        };

        let got = resolve_range(&query).unwrap().unwrap();

        assert_eq!(got.descriptor, RangeDescriptor::Month("2026-03".to_owned()));
    }

    #[test]
    fn year_token_resolves_to_calendar_year() {
        let got = resolve_range(&year_query("2026")).unwrap().unwrap();

        assert_eq!(got.span.start, date!(2026 - 01 - 01));
        assert_eq!(got.span.end, date!(2027 - 01 - 01));
        assert_eq!(got.descriptor, RangeDescriptor::Year(2026));
    }

    #[test]
    fn year_token_is_trimmed() {
        let got = resolve_range(&year_query(" 2026 ")).unwrap().unwrap();

        assert_eq!(got.descriptor, RangeDescriptor::Year(2026));
    }

    #[test]
    fn out_of_domain_year_fails() {
        for token in ["1899", "3001", "twenty", "20.5", ""] {
            assert_eq!(
                resolve_range(&year_query(token)),
                Err(RangeError::InvalidYearValue),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn boundary_years_are_accepted() {
        assert!(resolve_range(&year_query("1900")).is_ok());
        assert!(resolve_range(&year_query("3000")).is_ok());
    }
}

#[cfg(test)]
mod descriptor_serde_tests {
    use super::RangeDescriptor;

    #[test]
    fn month_descriptor_serializes_with_kind_and_value() {
        let got = serde_json::to_string(&RangeDescriptor::Month("2026-01".to_owned())).unwrap();

        assert_eq!(got, r#"{"kind":"month","value":"2026-01"}"#);
    }

    #[test]
    fn year_descriptor_serializes_with_kind_and_value() {
        let got = serde_json::to_string(&RangeDescriptor::Year(2026)).unwrap();

        assert_eq!(got, r#"{"kind":"year","value":2026}"#);
    }
}
