use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{ExpenseForm, ExpenseListResponse},
    repo_types::Expense,
};
use crate::{
    auth::repo_types::Session,
    error::AppError,
    state::AppState,
    store::timed,
    summary::engine,
};

/// Records an expense for the session's user; the owner never comes from the request.
#[instrument(skip(st, session, form), fields(user_id = %session.user_id()))]
pub async fn add_expense(
    st: &AppState,
    session: &Session,
    form: ExpenseForm,
) -> Result<Expense, AppError> {
    let new = form.validate()?;
    let expense = timed(st.store_timeout(), st.expenses.insert(session.user_id(), &new)).await?;
    info!(expense_id = %expense.id, "expense added");
    Ok(expense)
}

#[instrument(skip(st, session), fields(user_id = %session.user_id()))]
pub async fn get_expense(st: &AppState, session: &Session, id: Uuid) -> Result<Expense, AppError> {
    timed(st.store_timeout(), st.expenses.find_by_id(session.user_id(), id))
        .await?
        .ok_or(AppError::NotFound)
}

#[instrument(skip(st, session, form), fields(user_id = %session.user_id()))]
pub async fn edit_expense(
    st: &AppState,
    session: &Session,
    id: Uuid,
    form: ExpenseForm,
) -> Result<Expense, AppError> {
    let fields = form.validate()?;
    match timed(st.store_timeout(), st.expenses.update(session.user_id(), id, &fields)).await? {
        Some(e) => {
            info!(expense_id = %id, "expense updated");
            Ok(e)
        }
        None => {
            warn!(expense_id = %id, "edit of missing or foreign expense");
            Err(AppError::NotFound)
        }
    }
}

#[instrument(skip(st, session), fields(user_id = %session.user_id()))]
pub async fn delete_expense(st: &AppState, session: &Session, id: Uuid) -> Result<(), AppError> {
    if timed(st.store_timeout(), st.expenses.delete(session.user_id(), id)).await? {
        info!(expense_id = %id, "expense deleted");
        Ok(())
    } else {
        warn!(expense_id = %id, "delete of missing or foreign expense");
        Err(AppError::NotFound)
    }
}

/// Newest first, with the total and its share of the snapshot salary.
#[instrument(skip(st, session), fields(user_id = %session.user_id()))]
pub async fn list_expenses(
    st: &AppState,
    session: &Session,
) -> Result<ExpenseListResponse, AppError> {
    let expenses = timed(st.store_timeout(), st.expenses.list_by_user(session.user_id())).await?;
    let total = engine::total_spent(&expenses);
    let percent_spent = engine::percent_of_salary(total, session.user.salary).ok();
    Ok(ExpenseListResponse {
        expenses,
        total,
        percent_spent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{dto::RegisterRequest, services::register};
    use time::{macros::date, Date};

    async fn session_for(st: &AppState, email: &str, salary: f64) -> Session {
        register(
            st,
            RegisterRequest {
                name: "Sam".into(),
                email: email.into(),
                password: "password1".into(),
                salary,
            },
        )
        .await
        .unwrap()
        .session
    }

    fn form(title: &str, amount: f64, category: &str, date: Date) -> ExpenseForm {
        ExpenseForm {
            title: title.into(),
            amount,
            category: category.into(),
            date,
        }
    }

    #[tokio::test]
    async fn add_then_list_reports_total_and_percent() {
        let st = AppState::fake();
        let s = session_for(&st, "list@example.com", 1000.0).await;
        add_expense(&st, &s, form("Rent", 200.0, "rent", date!(2024 - 01 - 01)))
            .await
            .unwrap();
        add_expense(&st, &s, form("Food", 50.0, "food", date!(2024 - 02 - 01)))
            .await
            .unwrap();

        let list = list_expenses(&st, &s).await.unwrap();
        assert_eq!(list.total, 250.0);
        assert_eq!(list.percent_spent, Some(25.0));
        assert_eq!(list.expenses[0].title, "Food");
        assert!(list.expenses.iter().all(|e| e.user_id == s.user_id()));
    }

    #[tokio::test]
    async fn zero_salary_has_no_percentage() {
        let st = AppState::fake();
        let s = session_for(&st, "zero@example.com", 0.0).await;
        let list = list_expenses(&st, &s).await.unwrap();
        assert_eq!(list.total, 0.0);
        assert_eq!(list.percent_spent, None);
    }

    #[tokio::test]
    async fn invalid_amount_never_reaches_the_store() {
        let st = AppState::fake();
        let s = session_for(&st, "neg@example.com", 10.0).await;
        let err = add_expense(&st, &s, form("Refund", -5.0, "misc", date!(2024 - 01 - 01)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(list_expenses(&st, &s).await.unwrap().expenses.is_empty());
    }

    #[tokio::test]
    async fn edit_and_delete_are_owner_only() {
        let st = AppState::fake();
        let owner = session_for(&st, "owner@example.com", 10.0).await;
        let intruder = session_for(&st, "intruder@example.com", 10.0).await;
        let e = add_expense(&st, &owner, form("Tea", 3.0, "food", date!(2024 - 01 - 01)))
            .await
            .unwrap();

        let edit = edit_expense(&st, &intruder, e.id, form("Hacked", 0.0, "x", e.date)).await;
        assert!(matches!(edit, Err(AppError::NotFound)));
        assert!(matches!(delete_expense(&st, &intruder, e.id).await, Err(AppError::NotFound)));
        assert!(matches!(get_expense(&st, &intruder, e.id).await, Err(AppError::NotFound)));

        let edited = edit_expense(&st, &owner, e.id, form("Green tea", 4.0, "food", e.date))
            .await
            .unwrap();
        assert_eq!(edited.title, "Green tea");
        assert_eq!(edited.amount, 4.0);

        delete_expense(&st, &owner, e.id).await.unwrap();
        assert!(matches!(get_expense(&st, &owner, e.id).await, Err(AppError::NotFound)));
        assert!(matches!(delete_expense(&st, &owner, e.id).await, Err(AppError::NotFound)));
    }
}
