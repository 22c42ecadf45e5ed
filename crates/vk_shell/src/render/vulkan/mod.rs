//! Vulkan backend bootstrap
//!
//! Ordered one-shot device initialization plus the resolution-dependent
//! swapchain. Everything past this point is owned by the renderer that
//! takes over after the bootstrap completes.

pub mod context;
pub mod renderer;
pub mod swapchain;

pub use context::{
    LogicalDevice, PhysicalDeviceSelection, VulkanContext, VulkanError, VulkanInstance,
    VulkanResult,
};
pub use renderer::VulkanRenderer;
pub use swapchain::Swapchain;
