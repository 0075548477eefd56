//! Credit-gated unlock and visibility entitlement engine for the ExpaLink directory.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
