pub mod analyze;
pub mod auth;
pub mod entries;
pub mod health;
pub mod prompts;
pub mod recommendations;
