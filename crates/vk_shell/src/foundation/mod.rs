//! Foundation module - shared utilities
//!
//! Only logging lives here; the bootstrap keeps the rest of its
//! utilities next to the subsystems that use them.

pub mod logging;
