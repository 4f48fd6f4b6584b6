//! Handlers shared by every content service router.

pub mod health;

pub use health::{health_check, not_found};
