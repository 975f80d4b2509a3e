pub mod announcement;
pub mod event;
pub mod gallery;
pub mod organization;
pub mod resource;
pub mod task;
pub mod user;
