//! Outbound clients for the two upstream providers.

pub mod viacep;
pub mod weather;
