//! Port traits: the seams between the domain and its adapters.

pub mod clock_port;
pub mod config_port;
pub mod investment_port;
