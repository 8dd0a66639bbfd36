// src/services/mod.rs
pub mod financials;
pub mod profile;
pub mod quarterly;
pub mod report;
pub mod search;
pub mod store;
