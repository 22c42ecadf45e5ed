//! # Core Module
//!
//! Shared configuration types the rest of the crate is driven by.

pub mod config;

pub use config::{AppConfig, ConsoleConfig, ConsoleFailurePolicy, WindowConfig};
