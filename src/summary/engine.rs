//! Spending aggregation over one user's expenses.
//!
//! Everything here is pure: callers fetch the expenses and pick "today".

use serde::Serialize;
use thiserror::Error;
use time::{Date, Duration};

use crate::expenses::repo_types::Expense;

/// Length of each comparison window, in days.
pub const WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    MoreSpent,
    LessSpent,
    NoChange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowedTrend {
    pub last30_sum: f64,
    pub prev30_sum: f64,
    pub diff: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_spent: f64,
    pub trend: WindowedTrend,
    pub categories: Vec<CategoryTotal>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("salary is zero; percentage of salary is undefined")]
    ZeroSalary,
}

pub fn total_spent(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Compares the 30 days ending today with the 30 days before them.
///
/// `last30` holds dates strictly after `today - 30`; `prev30` holds
/// `today - 60 <= date <= today - 30`. Anything older is ignored.
pub fn windowed_trend(expenses: &[Expense], today: Date) -> WindowedTrend {
    let last30 = today - Duration::days(WINDOW_DAYS);
    let prev30 = today - Duration::days(2 * WINDOW_DAYS);

    let mut last30_sum = 0.0;
    let mut prev30_sum = 0.0;
    for e in expenses {
        if e.date > last30 {
            last30_sum += e.amount;
        } else if e.date >= prev30 {
            prev30_sum += e.amount;
        }
    }

    // compared at cent precision so float noise never reads as a change
    let diff = round2(last30_sum - prev30_sum);
    let trend = if diff > 0.0 {
        Trend::MoreSpent
    } else if diff < 0.0 {
        Trend::LessSpent
    } else {
        Trend::NoChange
    };

    WindowedTrend {
        last30_sum,
        prev30_sum,
        diff: diff + 0.0, // normalizes -0.0
        trend,
    }
}

/// Totals per exact category string, in first-seen order.
pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut out: Vec<CategoryTotal> = Vec::new();
    for e in expenses {
        match out.iter_mut().find(|c| c.category == e.category) {
            Some(c) => c.total += e.amount,
            None => out.push(CategoryTotal {
                category: e.category.clone(),
                total: e.amount,
            }),
        }
    }
    out
}

/// `total / salary * 100`, rounded to two decimals.
pub fn percent_of_salary(total: f64, salary: f64) -> Result<f64, AggregateError> {
    if !(salary.is_finite() && salary > 0.0) {
        return Err(AggregateError::ZeroSalary);
    }
    Ok(round2(total / salary * 100.0))
}

pub fn summarize(expenses: &[Expense], today: Date) -> DashboardSummary {
    DashboardSummary {
        total_spent: total_spent(expenses),
        trend: windowed_trend(expenses, today),
        categories: category_breakdown(expenses),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, OffsetDateTime};
    use uuid::Uuid;

    const TODAY: Date = date!(2024 - 06 - 30);

    fn exp(amount: f64, category: &str, date: Date) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: "x".into(),
            amount,
            category: category.into(),
            date,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn days_ago(n: i64) -> Date {
        TODAY - Duration::days(n)
    }

    #[test]
    fn total_of_empty_list_is_zero() {
        assert_eq!(total_spent(&[]), 0.0);
    }

    #[test]
    fn total_is_plain_sum() {
        let list = [
            exp(10.0, "food", TODAY),
            exp(5.5, "food", days_ago(400)),
            exp(100.0, "rent", days_ago(3)),
        ];
        assert_eq!(total_spent(&list), 115.5);
    }

    #[test]
    fn day_thirty_belongs_to_previous_window() {
        let t = windowed_trend(&[exp(40.0, "a", days_ago(30))], TODAY);
        assert_eq!(t.last30_sum, 0.0);
        assert_eq!(t.prev30_sum, 40.0);
        assert_eq!(t.trend, Trend::LessSpent);
    }

    #[test]
    fn day_twenty_nine_belongs_to_last_window() {
        let t = windowed_trend(&[exp(40.0, "a", days_ago(29))], TODAY);
        assert_eq!(t.last30_sum, 40.0);
        assert_eq!(t.prev30_sum, 0.0);
    }

    #[test]
    fn day_sixty_closes_previous_window() {
        let t = windowed_trend(&[exp(7.0, "a", days_ago(60))], TODAY);
        assert_eq!(t.last30_sum, 0.0);
        assert_eq!(t.prev30_sum, 7.0);

        let t = windowed_trend(&[exp(7.0, "a", days_ago(61))], TODAY);
        assert_eq!(t.prev30_sum, 0.0);
        assert_eq!(t.trend, Trend::NoChange);
    }

    #[test]
    fn future_dates_count_as_recent() {
        let t = windowed_trend(&[exp(3.0, "a", TODAY + Duration::days(2))], TODAY);
        assert_eq!(t.last30_sum, 3.0);
    }

    #[test]
    fn equal_nonzero_windows_are_no_change() {
        let t = windowed_trend(
            &[exp(50.0, "a", days_ago(1)), exp(50.0, "b", days_ago(45))],
            TODAY,
        );
        assert_eq!(t.diff, 0.0);
        assert_eq!(t.trend, Trend::NoChange);
    }

    #[test]
    fn float_noise_is_not_a_change() {
        let t = windowed_trend(
            &[
                exp(0.1, "a", days_ago(1)),
                exp(0.2, "a", days_ago(2)),
                exp(0.3, "a", days_ago(40)),
            ],
            TODAY,
        );
        assert_eq!(t.trend, Trend::NoChange);
        assert_eq!(t.diff, 0.0);
    }

    #[test]
    fn empty_list_has_no_change() {
        let t = windowed_trend(&[], TODAY);
        assert_eq!(
            t,
            WindowedTrend {
                last30_sum: 0.0,
                prev30_sum: 0.0,
                diff: 0.0,
                trend: Trend::NoChange,
            }
        );
    }

    #[test]
    fn category_breakdown_groups_exact_strings() {
        let list = [
            exp(10.0, "food", TODAY),
            exp(5.0, "food", TODAY),
            exp(100.0, "rent", TODAY),
        ];
        assert_eq!(
            category_breakdown(&list),
            vec![
                CategoryTotal { category: "food".into(), total: 15.0 },
                CategoryTotal { category: "rent".into(), total: 100.0 },
            ]
        );
    }

    #[test]
    fn category_breakdown_is_case_sensitive_and_first_seen() {
        let list = [
            exp(1.0, "Travel", TODAY),
            exp(2.0, "food", TODAY),
            exp(4.0, "travel", TODAY),
            exp(8.0, "Travel", TODAY),
        ];
        let names: Vec<_> = category_breakdown(&list)
            .into_iter()
            .map(|c| (c.category, c.total))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Travel".to_string(), 9.0),
                ("food".to_string(), 2.0),
                ("travel".to_string(), 4.0),
            ]
        );
    }

    #[test]
    fn percent_of_salary_rounds_to_cents() {
        assert_eq!(percent_of_salary(250.0, 1000.0), Ok(25.0));
        assert_eq!(percent_of_salary(1.0, 3.0), Ok(33.33));
        assert_eq!(percent_of_salary(2.0, 3.0), Ok(66.67));
        assert_eq!(percent_of_salary(0.0, 10.0), Ok(0.0));
    }

    #[test]
    fn percent_of_zero_salary_is_an_error() {
        assert_eq!(percent_of_salary(0.0, 0.0), Err(AggregateError::ZeroSalary));
        assert_eq!(percent_of_salary(10.0, 0.0), Err(AggregateError::ZeroSalary));
    }

    #[test]
    fn forty_five_day_scenario() {
        let mut list = Vec::new();
        // 300 across the last 30 days, 200 across days 31..=45
        for d in [0, 5, 10, 29] {
            list.push(exp(75.0, "food", days_ago(d)));
        }
        for d in [30, 38, 45, 44] {
            list.push(exp(50.0, "rent", days_ago(d)));
        }

        let s = summarize(&list, TODAY);
        assert_eq!(s.total_spent, 500.0);
        assert_eq!(s.trend.last30_sum, 300.0);
        assert_eq!(s.trend.prev30_sum, 200.0);
        assert_eq!(s.trend.diff, 100.0);
        assert_eq!(s.trend.trend, Trend::MoreSpent);
        assert_eq!(s.categories.len(), 2);
        assert_eq!(percent_of_salary(s.total_spent, 2000.0), Ok(25.0));
    }

    #[test]
    fn trend_serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&Trend::MoreSpent).unwrap(), "\"more_spent\"");
        assert_eq!(serde_json::to_string(&Trend::NoChange).unwrap(), "\"no_change\"");
    }
}
