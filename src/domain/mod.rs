//! Core domain types and logic.

pub mod investment;
pub mod dto;
pub mod filter;
pub mod query;
pub mod summary;
pub mod config_validation;
pub mod error;
