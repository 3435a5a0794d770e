//! Helpers shared by the types and services.

pub mod datetime;
pub mod validation;
