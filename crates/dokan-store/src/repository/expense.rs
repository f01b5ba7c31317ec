//! # Expense Repository
//!
//! Business expenses, stored as one list under the `business_expenses`
//! setting. Every write replaces the whole list.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use dokan_core::validation::validate_expense;
use dokan_core::{Expense, Money};

use super::settings::{keys, SettingsRepository};
use crate::error::{StoreError, StoreResult};

/// Fields supplied when recording an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub category: String,
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

/// Repository for expenses.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    settings: SettingsRepository,
}

impl ExpenseRepository {
    pub(crate) fn new(settings: SettingsRepository) -> Self {
        ExpenseRepository { settings }
    }

    /// Every recorded expense, oldest first.
    pub async fn all(&self) -> StoreResult<Vec<Expense>> {
        Ok(self
            .settings
            .get(keys::BUSINESS_EXPENSES)
            .await?
            .unwrap_or_default())
    }

    /// Validates and appends an expense.
    ///
    /// ## Process
    /// 1. Validate (category required, positive amount, bounded description)
    /// 2. Assign a UUID and the current time
    /// 3. Load the list, append, save the whole list
    pub async fn add(&self, new: NewExpense) -> StoreResult<Expense> {
        validate_expense(&new.category, new.amount, &new.description)?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            category: new.category.trim().to_string(),
            amount: new.amount,
            date: new.date,
            description: new.description,
            timestamp: Utc::now(),
        };

        let mut expenses = self.all().await?;
        expenses.push(expense.clone());
        self.settings.put(keys::BUSINESS_EXPENSES, &expenses).await?;

        info!(id = %expense.id, category = %expense.category, amount = %expense.amount, "Expense recorded");
        Ok(expense)
    }

    /// Removes an expense by id.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut expenses = self.all().await?;
        let before = expenses.len();
        expenses.retain(|e| e.id != id);

        if expenses.len() == before {
            return Err(StoreError::not_found("Expense", id));
        }

        self.settings.put(keys::BUSINESS_EXPENSES, &expenses).await?;
        info!(id = %id, "Expense deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::store_for;
    use mockito::Matcher;

    const STORED: &str = r#"[{"id":"e1","category":"Rent","amount":15000,"date":"2024-05-01","description":"May","timestamp":1714521600000}]"#;

    fn new_expense(amount: Money) -> NewExpense {
        NewExpense {
            category: " Packaging ".to_string(),
            amount,
            date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            description: "Boxes".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_appends_and_saves_whole_list() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/settings.php")
            .match_query(Matcher::UrlEncoded("key".into(), "business_expenses".into()))
            .with_body(STORED)
            .create_async()
            .await;
        let save = server
            .mock("POST", "/api/settings.php")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""key":"business_expenses""#.to_string()),
                Matcher::Regex(r#"e1.*Packaging"#.to_string()),
            ]))
            .create_async()
            .await;

        let expense = store_for(&server.url())
            .expenses()
            .add(new_expense(Money::from_taka(450)))
            .await
            .unwrap();

        assert_eq!(expense.category, "Packaging");
        assert!(Uuid::parse_str(&expense.id).is_ok());
        save.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_before_io() {
        let server = mockito::Server::new_async().await;
        let err = store_for(&server.url())
            .expenses()
            .add(new_expense(Money::zero()))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/settings.php")
            .match_query(Matcher::Any)
            .with_body(STORED)
            .create_async()
            .await;
        let save = server
            .mock("POST", "/api/settings.php")
            .expect(0)
            .create_async()
            .await;

        let err = store_for(&server.url())
            .expenses()
            .delete("missing")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        save.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_saves_remaining() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/settings.php")
            .match_query(Matcher::Any)
            .with_body(STORED)
            .create_async()
            .await;
        let save = server
            .mock("POST", "/api/settings.php")
            .match_body(Matcher::Json(serde_json::json!({
                "key": "business_expenses",
                "value": "[]"
            })))
            .create_async()
            .await;

        store_for(&server.url()).expenses().delete("e1").await.unwrap();
        save.assert_async().await;
    }
}
