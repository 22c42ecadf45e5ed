//! Vulkan context management
//!
//! The one-shot half of the graphics bootstrap: instance, adapter
//! selection, surface, logical device, and the extension function
//! pointers. Each step consumes the output of the previous one, so the
//! phase order is enforced by construction.

use std::collections::HashSet;
use std::ffi::{CStr, CString};

use ash::extensions::ext::DebugUtils;
use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::{vk, Device, Entry, Instance};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle, RawDisplayHandle};
use thiserror::Error;

/// Vulkan bootstrap errors.
#[derive(Error, Debug)]
pub enum VulkanError {
    /// Raw Vulkan API error with result code.
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// A bootstrap phase failed outside the API proper.
    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    /// No physical device satisfied the requirements.
    #[error("no suitable GPU found")]
    NoSuitableGpu,
}

/// Result type for Vulkan operations.
pub type VulkanResult<T> = Result<T, VulkanError>;

/// Vulkan instance wrapper with RAII cleanup.
pub struct VulkanInstance {
    /// Vulkan entry point.
    pub entry: Entry,
    /// Vulkan instance handle.
    pub instance: Instance,
    debug: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

impl VulkanInstance {
    /// Create the instance, with the validation layer and a debug
    /// messenger routed into the log when `validate` is set.
    pub fn new(
        display: RawDisplayHandle,
        app_name: &str,
        validate: bool,
    ) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }.map_err(|e| {
            VulkanError::InitializationFailed(format!("failed to load Vulkan: {e}"))
        })?;

        let app_name_cstr = CString::new(app_name).map_err(|_| {
            VulkanError::InitializationFailed("application name contains a NUL byte".to_string())
        })?;
        let engine_name_cstr = CString::new("vk_shell").unwrap();
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name_cstr)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(&engine_name_cstr)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_0);

        // The windowing system dictates the surface extensions.
        let required = ash_window::enumerate_required_extensions(display)
            .map_err(VulkanError::Api)?;
        let mut extensions: Vec<*const i8> = required.to_vec();
        if validate {
            extensions.push(DebugUtils::name().as_ptr());
        }

        let layer_names = if validate {
            vec![CString::new("VK_LAYER_KHRONOS_validation").unwrap()]
        } else {
            vec![]
        };
        let layer_names_ptrs: Vec<*const i8> =
            layer_names.iter().map(|name| name.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_names_ptrs);

        let instance = unsafe {
            entry
                .create_instance(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        let debug = if validate {
            let debug_utils = DebugUtils::new(&entry, &instance);
            let messenger = Self::setup_debug_messenger(&debug_utils)?;
            Some((debug_utils, messenger))
        } else {
            None
        };

        Ok(Self {
            entry,
            instance,
            debug,
        })
    }

    fn setup_debug_messenger(
        debug_utils: &DebugUtils,
    ) -> VulkanResult<vk::DebugUtilsMessengerEXT> {
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        unsafe {
            debug_utils
                .create_debug_utils_messenger(&create_info, None)
                .map_err(VulkanError::Api)
        }
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            if let Some((debug_utils, messenger)) = &self.debug {
                debug_utils.destroy_debug_utils_messenger(*messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

/// Debug callback for validation layers.
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let callback_data = *callback_data;
    let message = CStr::from_ptr(callback_data.p_message).to_string_lossy();

    if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        log::error!("[Vulkan] {:?} - {}", message_type, message);
    } else if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING {
        log::warn!("[Vulkan] {:?} - {}", message_type, message);
    } else {
        log::debug!("[Vulkan] {:?} - {}", message_type, message);
    }

    vk::FALSE
}

/// Selected physical device and its graphics queue family.
pub struct PhysicalDeviceSelection {
    /// Vulkan physical device handle.
    pub device: vk::PhysicalDevice,
    /// Device properties and limits.
    pub properties: vk::PhysicalDeviceProperties,
    /// Index of the graphics queue family.
    pub graphics_family: u32,
}

impl PhysicalDeviceSelection {
    /// Pick the best adapter that can do graphics work.
    ///
    /// Selection runs before the surface exists; present support is
    /// validated when the queues are created.
    pub fn select(instance: &Instance) -> VulkanResult<Self> {
        let devices = unsafe {
            instance
                .enumerate_physical_devices()
                .map_err(VulkanError::Api)?
        };

        let mut best: Option<(u32, Self)> = None;
        for device in devices {
            let properties = unsafe { instance.get_physical_device_properties(device) };
            let families =
                unsafe { instance.get_physical_device_queue_family_properties(device) };

            let Some(graphics_family) = families
                .iter()
                .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
            else {
                continue;
            };

            let score = match properties.device_type {
                vk::PhysicalDeviceType::DISCRETE_GPU => 2,
                vk::PhysicalDeviceType::INTEGRATED_GPU => 1,
                _ => 0,
            };

            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((
                    score,
                    Self {
                        device,
                        properties,
                        graphics_family: graphics_family as u32,
                    },
                ));
            }
        }

        let (_, selection) = best.ok_or(VulkanError::NoSuitableGpu)?;
        log::info!("Selected GPU: {}", unsafe {
            CStr::from_ptr(selection.properties.device_name.as_ptr()).to_string_lossy()
        });
        Ok(selection)
    }
}

/// Logical device wrapper with RAII cleanup.
pub struct LogicalDevice {
    /// Vulkan logical device handle.
    pub device: Device,
    /// Graphics operations queue.
    pub graphics_queue: vk::Queue,
    /// Surface presentation queue.
    pub present_queue: vk::Queue,
    /// Index of the graphics queue family.
    pub graphics_family: u32,
    /// Index of the presentation queue family.
    pub present_family: u32,
    /// Swapchain extension loader (device-level function pointers).
    pub swapchain_loader: SwapchainLoader,
}

impl LogicalDevice {
    /// Create the logical device with graphics and present queues.
    pub fn new(
        instance: &Instance,
        selection: &PhysicalDeviceSelection,
        surface: vk::SurfaceKHR,
        surface_loader: &Surface,
    ) -> VulkanResult<Self> {
        let families =
            unsafe { instance.get_physical_device_queue_family_properties(selection.device) };

        let mut present_family = None;
        for index in 0..families.len() as u32 {
            let support = unsafe {
                surface_loader
                    .get_physical_device_surface_support(selection.device, index, surface)
                    .map_err(VulkanError::Api)?
            };
            if support {
                present_family = Some(index);
                break;
            }
        }
        let present_family = present_family.ok_or_else(|| {
            VulkanError::InitializationFailed("no present queue family found".to_string())
        })?;

        // The swapchain extension is the whole point of the device here.
        let extensions = unsafe {
            instance
                .enumerate_device_extension_properties(selection.device)
                .map_err(VulkanError::Api)?
        };
        let has_swapchain = extensions.iter().any(|available| {
            let name = unsafe { CStr::from_ptr(available.extension_name.as_ptr()) };
            name == SwapchainLoader::name()
        });
        if !has_swapchain {
            return Err(VulkanError::InitializationFailed(
                "VK_KHR_swapchain not supported".to_string(),
            ));
        }

        let unique_families: HashSet<u32> = [selection.graphics_family, present_family]
            .into_iter()
            .collect();
        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = unique_families
            .iter()
            .map(|&family| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(family)
                    .queue_priorities(&[1.0])
                    .build()
            })
            .collect();

        let required_extensions = [SwapchainLoader::name().as_ptr()];
        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&required_extensions);

        let device = unsafe {
            instance
                .create_device(selection.device, &create_info, None)
                .map_err(VulkanError::Api)?
        };

        let graphics_queue = unsafe { device.get_device_queue(selection.graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(present_family, 0) };

        let swapchain_loader = SwapchainLoader::new(instance, &device);

        Ok(Self {
            device,
            graphics_queue,
            present_queue,
            graphics_family: selection.graphics_family,
            present_family,
            swapchain_loader,
        })
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}

/// One-shot Vulkan resources, created in a fixed order.
pub struct VulkanContext {
    /// Vulkan surface bound to the application window.
    pub surface: vk::SurfaceKHR,
    /// Surface extension loader (instance-level function pointers).
    pub surface_loader: Surface,
    /// Selected physical device.
    pub physical_device: PhysicalDeviceSelection,
    /// Logical device and queues.
    pub device: LogicalDevice,
    /// Instance and debug plumbing; declared last so the device is
    /// destroyed before the instance.
    pub instance: VulkanInstance,
}

impl VulkanContext {
    /// Run the ordered one-shot setup phases against the window.
    ///
    /// Phase order: instance creation, physical-device selection,
    /// instance function-pointer resolution, surface creation,
    /// logical-device/queue creation, device function-pointer
    /// resolution.
    pub fn new<W>(window: &W, app_name: &str, validate: bool) -> VulkanResult<Self>
    where
        W: HasRawWindowHandle + HasRawDisplayHandle,
    {
        let instance = VulkanInstance::new(window.raw_display_handle(), app_name, validate)?;
        log::debug!("instance created (validation: {validate})");

        let physical_device = PhysicalDeviceSelection::select(&instance.instance)?;

        let surface_loader = Surface::new(&instance.entry, &instance.instance);

        let surface = unsafe {
            ash_window::create_surface(
                &instance.entry,
                &instance.instance,
                window.raw_display_handle(),
                window.raw_window_handle(),
                None,
            )
            .map_err(VulkanError::Api)?
        };
        log::debug!("surface created");

        let device = LogicalDevice::new(
            &instance.instance,
            &physical_device,
            surface,
            &surface_loader,
        )?;
        log::debug!(
            "logical device ready (graphics family {}, present family {})",
            device.graphics_family,
            device.present_family
        );

        Ok(Self {
            surface,
            surface_loader,
            physical_device,
            device,
            instance,
        })
    }

    /// Get a reference to the Vulkan instance.
    pub fn instance(&self) -> &Instance {
        &self.instance.instance
    }

    /// Get the surface handle.
    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }

    /// Get the surface loader.
    pub fn surface_loader(&self) -> &Surface {
        &self.surface_loader
    }

    /// Get the logical device.
    pub fn device(&self) -> &LogicalDevice {
        &self.device
    }

    /// Get the graphics queue.
    pub fn graphics_queue(&self) -> vk::Queue {
        self.device.graphics_queue
    }

    /// Get the present queue.
    pub fn present_queue(&self) -> vk::Queue {
        self.device.present_queue
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device.device_wait_idle();
            self.surface_loader.destroy_surface(self.surface, None);
        }
        // Remaining fields drop in declaration order: the device before
        // the instance that created it.
    }
}
