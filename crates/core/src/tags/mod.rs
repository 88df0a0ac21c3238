//! Tags module - user labels attached to tasks.

mod tags_model;
mod tags_service;
mod tags_traits;

pub use tags_model::{NewTag, Tag, TaskTag};
pub use tags_service::TagService;
pub use tags_traits::{TagRepositoryTrait, TagServiceTrait};
