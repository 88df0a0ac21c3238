//! Tasks module - domain models, services, and traits.

mod tasks_model;
mod tasks_service;
mod tasks_traits;

#[cfg(test)]
mod tasks_service_tests;

pub use tasks_model::{NewTask, Priority, Task, TaskFilter, TaskList, TaskUpdate};
pub use tasks_service::TaskService;
pub use tasks_traits::{TaskRepositoryTrait, TaskServiceTrait};
