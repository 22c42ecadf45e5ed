//! Rendering subsystem bootstrap
//!
//! The lifecycle sequencer drives the graphics stack through the
//! [`RenderBootstrap`] hooks so the Vulkan backend can be swapped for a
//! test double. The real implementation lives in [`vulkan`].

use thiserror::Error;

pub mod vulkan;

pub use vulkan::{VulkanContext, VulkanError, VulkanRenderer};

/// Errors from the downstream graphics bootstrap.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Vulkan-level failure.
    #[error(transparent)]
    Vulkan(#[from] VulkanError),

    /// Bootstrap misuse or failure before reaching the graphics API.
    #[error("render bootstrap failed: {0}")]
    Initialization(String),
}

/// Downstream graphics bootstrap hooks, driven by the lifecycle
/// sequencer.
///
/// `initialize` runs the one-shot device setup exactly once per
/// application; `recreate_sized` rebuilds only the resolution-dependent
/// resources after a reconfiguration.
pub trait RenderBootstrap<W> {
    /// Run the ordered one-shot setup phases against the window.
    fn initialize(
        &mut self,
        window: &W,
        app_name: &str,
        extent: (u32, u32),
        validate: bool,
    ) -> Result<(), RenderError>;

    /// Rebuild resolution-dependent resources for a new client size.
    fn recreate_sized(&mut self, extent: (u32, u32)) -> Result<(), RenderError>;

    /// Whether the one-shot setup has completed.
    fn is_initialized(&self) -> bool;
}
