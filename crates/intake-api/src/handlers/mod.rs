pub mod health;
pub mod submit_project;
