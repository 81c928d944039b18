//! invtracker — personal investment record-keeper.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], orchestration in [`service`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod service;
pub mod cli;
