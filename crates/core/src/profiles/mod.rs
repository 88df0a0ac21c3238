//! Profiles module - public user profiles and login material.

mod profiles_model;
mod profiles_service;
mod profiles_traits;

pub use profiles_model::{Credentials, NewProfile, Profile};
pub use profiles_service::ProfileService;
pub use profiles_traits::{ProfileRepositoryTrait, ProfileServiceTrait};
