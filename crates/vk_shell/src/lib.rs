//! # vk_shell
//!
//! Application lifecycle and window/surface bootstrap for Vulkan demos.
//!
//! The crate separates the setup that happens exactly once per
//! application (console attachment, window creation, instance/device
//! bootstrap) from the setup that reruns on reconfiguration (swapchain
//! recreation after a resize), and sequences both through a small state
//! machine. The platform sits behind a capability trait so the
//! sequencing logic is testable without a display.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vk_shell::prelude::*;
//! use vk_shell::platform::win32::Win32SurfaceProvider;
//! use vk_shell::platform::ConsoleLayout;
//!
//! let config = AppConfig::default();
//! let provider = Win32SurfaceProvider::new(Some(wndproc), ConsoleLayout::default());
//! let mut lifecycle = Lifecycle::new(config, provider);
//! let mut renderer = VulkanRenderer::new();
//!
//! lifecycle.prepare(&mut renderer)?;
//! // ... pump messages; on WM_SIZE:
//! lifecycle.handle_resize(width, height);
//! lifecycle.prepare(&mut renderer)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod lifecycle;
pub mod platform;
pub mod render;

/// Commonly used types.
pub mod prelude {
    pub use crate::config::{Config, ConfigError};
    pub use crate::core::config::{AppConfig, ConsoleFailurePolicy};
    pub use crate::lifecycle::{Lifecycle, PrepareError, Stage, FATAL_EXIT_CODE};
    pub use crate::platform::{AppTitle, MinSize, SurfaceProvider};
    pub use crate::render::{RenderBootstrap, VulkanRenderer};
}
