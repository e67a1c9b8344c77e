//! Core domain types and logic.

pub mod config;
pub mod dataset;
pub mod error;
pub mod index;
pub mod stats;
pub mod table;
pub mod views;
pub mod workspace;
