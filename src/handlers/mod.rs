// src/handlers/mod.rs
pub mod dashboard;
pub mod download;
pub mod error;
pub mod summarize;
