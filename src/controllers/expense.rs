//! Expense actions: index, show, store, update, destroy.

use crate::container::{Container, Resolve};
use crate::error::{AppError, ContainerError};
use crate::http::{ActionResult, JsonResponse, RequestData};
use crate::models::Expense;
use crate::service::{Model, Repository};
use axum::response::Response;

pub struct ExpenseController {
    request: RequestData,
    expenses: Model<Expense>,
}

impl Resolve for ExpenseController {
    fn resolve(container: &Container) -> Result<Self, ContainerError> {
        Ok(ExpenseController {
            request: container.make()?,
            expenses: container.make()?,
        })
    }
}

impl ExpenseController {
    pub async fn index(&self) -> Result<Response, AppError> {
        let expenses = self.expenses.all().await?;
        Ok(JsonResponse::new().json(&expenses))
    }

    pub async fn show(&self, id: i64) -> Result<Response, AppError> {
        let expense = self.expenses.find_or_fail(id).await?;
        Ok(JsonResponse::new().json(&expense))
    }

    pub async fn store(&self) -> Result<Response, AppError> {
        let outcome = self.expenses.create(self.request.all()).await?;
        let result = ActionResult::new(outcome.is_written(), "Expense added", "Failed to add expense");
        Ok(JsonResponse::new().json(&result))
    }

    pub async fn update(&self, id: i64) -> Result<Response, AppError> {
        let outcome = self.expenses.update(id, self.request.all()).await?;
        let result = ActionResult::new(outcome.is_written(), "Changes saved", "Failed to save changes");
        Ok(JsonResponse::new().json(&result))
    }

    pub async fn destroy(&self, id: i64) -> Result<Response, AppError> {
        let expense = self.expenses.find_or_fail(id).await?;
        let deleted = self.expenses.delete(&expense).await?;
        let result = ActionResult::new(deleted, "Expense deleted", "Failed to delete expense");
        Ok(JsonResponse::new().json(&result))
    }
}
