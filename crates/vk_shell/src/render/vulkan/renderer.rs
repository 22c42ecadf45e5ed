//! Render bootstrap driver backed by the Vulkan context
//!
//! Splits the graphics state along the same line as the sequencer: the
//! [`VulkanContext`] holds everything created exactly once, the
//! [`Swapchain`] is the piece that gets thrown away and rebuilt when
//! the window changes size.

use ash::vk;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

use super::context::{VulkanContext, VulkanError};
use super::swapchain::Swapchain;

use crate::render::{RenderBootstrap, RenderError};

/// Vulkan implementation of the bootstrap hooks.
#[derive(Default)]
pub struct VulkanRenderer {
    context: Option<VulkanContext>,
    swapchain: Option<Swapchain>,
}

impl VulkanRenderer {
    /// Create an empty renderer; resources appear once `initialize`
    /// runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// The one-shot Vulkan resources, if `initialize` has run.
    pub fn context(&self) -> Option<&VulkanContext> {
        self.context.as_ref()
    }

    /// The current swapchain, if `initialize` has run.
    pub fn swapchain(&self) -> Option<&Swapchain> {
        self.swapchain.as_ref()
    }
}

impl<W> RenderBootstrap<W> for VulkanRenderer
where
    W: HasRawWindowHandle + HasRawDisplayHandle,
{
    fn initialize(
        &mut self,
        window: &W,
        app_name: &str,
        extent: (u32, u32),
        validate: bool,
    ) -> Result<(), RenderError> {
        if self.context.is_some() {
            return Err(RenderError::Initialization(
                "render bootstrap already ran".to_string(),
            ));
        }

        let context = VulkanContext::new(window, app_name, validate)?;
        let swapchain = Swapchain::new(
            &context,
            vk::Extent2D {
                width: extent.0,
                height: extent.1,
            },
        )?;

        self.context = Some(context);
        self.swapchain = Some(swapchain);
        Ok(())
    }

    fn recreate_sized(&mut self, extent: (u32, u32)) -> Result<(), RenderError> {
        let context = self.context.as_ref().ok_or_else(|| {
            RenderError::Initialization("render bootstrap has not run".to_string())
        })?;

        // Nothing may be touching the old swapchain while it is replaced.
        unsafe {
            context
                .device
                .device
                .device_wait_idle()
                .map_err(VulkanError::Api)?;
        }

        let old_handle = self
            .swapchain
            .as_ref()
            .map_or(vk::SwapchainKHR::null(), Swapchain::handle);
        let swapchain = Swapchain::recreate(
            context,
            vk::Extent2D {
                width: extent.0,
                height: extent.1,
            },
            old_handle,
        )?;

        // The old swapchain drops only after its replacement exists.
        self.swapchain = Some(swapchain);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.context.is_some()
    }
}
