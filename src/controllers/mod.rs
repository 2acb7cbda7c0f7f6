//! Controllers: resolved per request from the container.

pub mod expense;
pub use expense::ExpenseController;

use crate::container::ControllerRegistration;

/// Every controller the application exposes; fed to `Container::autoload_controllers`.
pub static REGISTRY: &[ControllerRegistration] = &[ControllerRegistration::of::<ExpenseController>("ExpenseController")];
