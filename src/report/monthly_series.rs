//! The monthly series report: income and expense totals for every month of a
//! calendar year, suitable for charting.

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    report::range::{parse_year_token, year_span},
    timezone::current_year,
    transaction::{Transaction, TransactionKind, TransactionQuery, TransactionStore},
    user::UserId,
};

/// The number of slots in a monthly series.
const MONTHS_PER_YEAR: usize = 12;

/// One month's income and expense totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthEntry {
    /// The calendar month number, 1 through 12.
    pub month: u8,
    /// The sum of the income amounts in this month.
    pub income: f64,
    /// The sum of the expense amounts in this month.
    pub expense: f64,
}

/// Income and expense totals for each month of one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySeriesReport {
    /// The year the series covers.
    pub year: i32,
    /// The sum of the income amounts across the whole year.
    pub year_total_income: f64,
    /// The sum of the expense amounts across the whole year.
    pub year_total_expenses: f64,
    /// `year_total_income - year_total_expenses`.
    pub year_balance: f64,
    /// Exactly 12 entries in ascending month order. Months with no
    /// transactions report zero income and zero expense, so callers never
    /// need to branch on missing months.
    pub monthly: Vec<MonthEntry>,
}

/// The query parameters of the monthly series endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct MonthlySeriesQuery {
    /// The year to report on. Defaults to the current year in the server's
    /// configured timezone.
    pub year: Option<String>,
}

/// Reduce `transactions` into a [MonthlySeriesReport] for `year`.
///
/// All 12 slots are allocated up front and seeded with zeroes; the single
/// reduction pass then only overwrites the slots that have data. The yearly
/// totals are computed from the filled slots afterwards, so they are correct
/// regardless of which months had data.
///
/// The caller is responsible for only passing transactions dated inside
/// `year`.
pub fn monthly_series(year: i32, transactions: &[Transaction]) -> MonthlySeriesReport {
    let mut monthly: Vec<MonthEntry> = (1..=MONTHS_PER_YEAR as u8)
        .map(|month| MonthEntry {
            month,
            income: 0.0,
            expense: 0.0,
        })
        .collect();

    for transaction in transactions {
        let slot = &mut monthly[u8::from(transaction.date.month()) as usize - 1];

        match transaction.kind {
            TransactionKind::Income => slot.income += transaction.amount,
            TransactionKind::Expense => slot.expense += transaction.amount,
        }
    }

    let year_total_income: f64 = monthly.iter().map(|entry| entry.income).sum();
    let year_total_expenses: f64 = monthly.iter().map(|entry| entry.expense).sum();

    MonthlySeriesReport {
        year,
        year_total_income,
        year_total_expenses,
        year_balance: year_total_income - year_total_expenses,
        monthly,
    }
}

/// A route handler for the monthly series report.
///
/// Accepts an optional `year=YYYY` query parameter; without it the current
/// calendar year in the server's configured timezone is reported.
pub async fn get_monthly_series<T>(
    State(state): State<AppState<T>>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<MonthlySeriesQuery>,
) -> Response
where
    T: TransactionStore + Clone + Send + Sync,
{
    let year = match &query.year {
        Some(token) => match parse_year_token(token) {
            Ok(year) => year,
            Err(error) => return error.into_response(),
        },
        None => match current_year(&state.local_timezone) {
            Ok(year) => year,
            Err(error) => return error.into_response(),
        },
    };

    let transactions = match state.transaction_store.get_query(
        user_id,
        TransactionQuery {
            date_span: Some(year_span(year)),
            ..Default::default()
        },
    ) {
        Ok(transactions) => transactions,
        Err(error) => return error.into_response(),
    };

    Json(monthly_series(year, &transactions)).into_response()
}


#[cfg(test)]
mod endpoint_tests {
    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        app_state::{SqlAppState, create_app_state},
        report::monthly_series::{MonthlySeriesQuery, MonthlySeriesReport, get_monthly_series},
        test_utils::parse_json_body,
        transaction::{CategoryName, Transaction, TransactionKind, TransactionStore},
        user::UserId,
    };

    fn get_test_state() -> SqlAppState {
        let conn = Connection::open_in_memory().unwrap();
        create_app_state(conn, "notsoverysecret", "UTC").unwrap()
    }

    #[tokio::test]
    async fn series_covers_only_the_requested_year() {
        let mut state = get_test_state();
        let user_id = UserId::new(1);
        let rows = [
            (TransactionKind::Income, 1000.0, date!(2026 - 03 - 10)),
            (TransactionKind::Expense, 250.0, date!(2026 - 12 - 31)),
            // Outside the year, must not appear in the series.
            (TransactionKind::Income, 999.0, date!(2025 - 12 - 31)),
            (TransactionKind::Income, 999.0, date!(2027 - 01 - 01)),
        ];
        for (kind, amount, date) in rows {
            state
                .transaction_store
                .create(Transaction::build(
                    user_id,
                    kind,
                    amount,
                    CategoryName::new_unchecked("misc"),
                    date,
                ))
                .unwrap();
        }

        let response = get_monthly_series(
            State(state),
            Extension(user_id),
            Query(MonthlySeriesQuery {
                year: Some("2026".to_owned()),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let report: MonthlySeriesReport = parse_json_body(response).await;
        assert_eq!(report.year, 2026);
        assert_eq!(report.year_total_income, 1000.0);
        assert_eq!(report.year_total_expenses, 250.0);
        assert_eq!(report.year_balance, 750.0);
        assert_eq!(report.monthly.len(), 12);
        assert_eq!(report.monthly[2].income, 1000.0);
        assert_eq!(report.monthly[11].expense, 250.0);
    }

    #[tokio::test]
    async fn series_with_invalid_year_is_rejected() {
        let state = get_test_state();

        for year in ["3001", "not-a-year"] {
            let response = get_monthly_series(
                State(state.clone()),
                Extension(UserId::new(1)),
                Query(MonthlySeriesQuery {
                    year: Some(year.to_owned()),
                }),
            )
            .await
            .into_response();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "year {year:?}");
        }
    }

    #[tokio::test]
    async fn series_defaults_to_the_current_year() {
        let state = get_test_state();

        let response = get_monthly_series(
            State(state),
            Extension(UserId::new(1)),
            Query(MonthlySeriesQuery::default()),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let report: MonthlySeriesReport = parse_json_body(response).await;
        assert_eq!(
            report.year,
            time::OffsetDateTime::now_utc().year(),
            "the test state is configured with the UTC timezone"
        );
        assert_eq!(report.monthly.len(), 12);
    }
}
