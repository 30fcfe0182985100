//! ritmo - Habit tracking API with token-based authentication.

pub mod auth;
pub mod cli;
pub mod ritmo;
