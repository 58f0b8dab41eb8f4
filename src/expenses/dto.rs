use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::{Expense, NewExpense};
use crate::error::AppError;

/// Request body for creating or editing an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    pub title: String,
    pub amount: f64,
    pub category: String,
    #[serde(with = "crate::expenses::iso_date")]
    pub date: Date,
}

impl ExpenseForm {
    /// Trims text fields and rejects blank labels or negative amounts.
    pub fn validate(self) -> Result<NewExpense, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::invalid("Title is required"));
        }
        let category = self.category.trim().to_string();
        if category.is_empty() {
            return Err(AppError::invalid("Category is required"));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(AppError::invalid("Amount must be a non-negative number"));
        }
        Ok(NewExpense {
            title,
            amount: self.amount,
            category,
            date: self.date,
        })
    }
}

/// Response for the expense list page.
#[derive(Debug, Serialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
    pub total: f64,
    /// `None` when the salary is zero.
    pub percent_spent: Option<f64>,
}
