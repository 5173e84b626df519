//! ash-based Vulkan backend
//!
//! Maps the backend contract onto Vulkan: adapters are physical devices,
//! capability tiers are Vulkan core API versions, and the presentation chain
//! is a `VK_KHR_swapchain` swapchain. Every resource wrapper destroys its
//! Vulkan object on drop, so the lifecycle core's ordering guarantees hold
//! without explicit release calls.
//!
//! Vulkan has no exclusive fullscreen state of its own; the chain tracks the
//! flag so teardown sequencing stays uniform across backends, and the window
//! shell owns the actual mode switch.

use std::ffi::{CStr, CString};

use ash::extensions::ext::DebugUtils;
use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::{vk, Entry, Instance};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use crate::gfx::backend::{AdapterDesc, ChainDesc, GfxBackend};
use crate::gfx::swapchain::BACKBUFFER_COUNT;
use crate::gfx::tier::CapabilityTier;
use crate::gfx::{GfxError, GfxResult};

/// Vulkan core version a capability tier requires
pub fn tier_api_version(tier: CapabilityTier) -> u32 {
    match tier {
        CapabilityTier::Unknown | CapabilityTier::Tier10_0 => vk::API_VERSION_1_0,
        CapabilityTier::Tier10_1 => vk::API_VERSION_1_1,
        CapabilityTier::Tier11_0 => vk::API_VERSION_1_2,
        CapabilityTier::Tier11_1 => vk::API_VERSION_1_3,
    }
}

fn supports(device_api: u32, tier: CapabilityTier) -> bool {
    let required = tier_api_version(tier);
    let (req_major, req_minor) = (vk::api_version_major(required), vk::api_version_minor(required));
    let (dev_major, dev_minor) = (
        vk::api_version_major(device_api),
        vk::api_version_minor(device_api),
    );
    (dev_major, dev_minor) >= (req_major, req_minor)
}

/// Vulkan instance, surface loader and optional validation messenger
pub struct VulkanBackend {
    entry: Entry,
    instance: Instance,
    surface_loader: Surface,
    debug_utils: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

impl VulkanBackend {
    /// Load Vulkan and create an instance with the given surface extensions.
    ///
    /// With `debug` set, the Khronos validation layer and a debug messenger
    /// are enabled; validation output goes through the `log` facade.
    pub fn new(extensions: &[String], debug: bool) -> GfxResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| GfxError::DeviceCreationFailed(format!("Vulkan loader: {e:?}")))?;

        let app_name = CString::new("platform_shell").unwrap();
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(&app_name)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_3);

        let cstr_extensions: Vec<CString> = extensions
            .iter()
            .map(|ext| CString::new(ext.as_str()).unwrap())
            .collect();
        let mut extension_ptrs: Vec<*const i8> =
            cstr_extensions.iter().map(|ext| ext.as_ptr()).collect();
        if debug {
            extension_ptrs.push(DebugUtils::name().as_ptr());
        }

        let layer_names = if debug {
            vec![CString::new("VK_LAYER_KHRONOS_validation").unwrap()]
        } else {
            vec![]
        };
        let layer_ptrs: Vec<*const i8> = layer_names.iter().map(|name| name.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs);

        let instance = unsafe {
            entry
                .create_instance(&create_info, None)
                .map_err(|e| GfxError::DeviceCreationFailed(format!("instance: {e:?}")))?
        };

        let debug_utils = if debug {
            let debug_utils = DebugUtils::new(&entry, &instance);
            let messenger_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
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
            let messenger = unsafe {
                debug_utils
                    .create_debug_utils_messenger(&messenger_info, None)
                    .map_err(|e| GfxError::DeviceCreationFailed(format!("debug messenger: {e:?}")))?
            };
            Some((debug_utils, messenger))
        } else {
            None
        };

        let surface_loader = Surface::new(&entry, &instance);
        log::info!("Vulkan instance created (validation={})", debug);

        Ok(Self {
            entry,
            instance,
            surface_loader,
            debug_utils,
        })
    }

    /// Raw instance handle, for window-system surface creation
    pub fn instance_handle(&self) -> vk::Instance {
        self.instance.handle()
    }

    /// Take ownership of an externally created surface
    pub fn wrap_surface(&self, surface: vk::SurfaceKHR) -> VkSurface {
        VkSurface {
            loader: self.surface_loader.clone(),
            surface,
        }
    }

    /// Create a surface from raw window-system handles, for hosts that bring
    /// their own window instead of the GLFW shell.
    pub fn create_surface_from_handles(
        &self,
        display: RawDisplayHandle,
        window: RawWindowHandle,
    ) -> GfxResult<VkSurface> {
        let surface = unsafe {
            ash_window::create_surface(&self.entry, &self.instance, display, window, None)
                .map_err(|e| GfxError::SwapchainCreationFailed(format!("surface: {e:?}")))?
        };
        Ok(self.wrap_surface(surface))
    }

    fn physical_devices(&self) -> GfxResult<Vec<vk::PhysicalDevice>> {
        unsafe {
            self.instance
                .enumerate_physical_devices()
                .map_err(|e| GfxError::DeviceCreationFailed(format!("enumeration: {e:?}")))
        }
    }

    fn device_name(&self, properties: &vk::PhysicalDeviceProperties) -> String {
        unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}

impl Drop for VulkanBackend {
    fn drop(&mut self) {
        unsafe {
            if let Some((debug_utils, messenger)) = &self.debug_utils {
                debug_utils.destroy_debug_utils_messenger(*messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

/// Owned presentable surface
pub struct VkSurface {
    loader: Surface,
    surface: vk::SurfaceKHR,
}

impl VkSurface {
    /// Raw surface handle
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.surface
    }
}

impl Drop for VkSurface {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_surface(self.surface, None);
        }
    }
}

/// Logical device with its graphics queue
pub struct VkDevice {
    device: ash::Device,
    physical: vk::PhysicalDevice,
    queue_family: u32,
    queue: vk::Queue,
}

impl VkDevice {
    /// The ash device handle
    pub fn handle(&self) -> &ash::Device {
        &self.device
    }

    /// The physical device this logical device was opened on
    pub fn physical(&self) -> vk::PhysicalDevice {
        self.physical
    }

    /// Graphics queue family index
    pub fn queue_family(&self) -> u32 {
        self.queue_family
    }

    /// The graphics queue
    pub fn queue(&self) -> vk::Queue {
        self.queue
    }
}

impl Drop for VkDevice {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}

/// Immediate execution context: the graphics queue plus the currently bound
/// render targets.
pub struct VkContext {
    queue: vk::Queue,
    bound: Option<(vk::ImageView, vk::ImageView)>,
}

impl VkContext {
    /// The graphics queue commands execute on
    pub fn queue(&self) -> vk::Queue {
        self.queue
    }

    /// Currently bound (color, depth-stencil) views, if any
    pub fn bound_targets(&self) -> Option<(vk::ImageView, vk::ImageView)> {
        self.bound
    }
}

/// Swapchain with its acquire semaphore; owns the surface it binds to
pub struct VkChain {
    loader: SwapchainLoader,
    device: ash::Device,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
    acquire_semaphore: vk::Semaphore,
    vsync: bool,
    fullscreen: bool,
    // last field: the surface must outlive the swapchain bound to it
    surface: VkSurface,
}

impl VkChain {
    /// Current buffer extent
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Surface format the chain was created with
    pub fn format(&self) -> vk::SurfaceFormatKHR {
        self.format
    }
}

impl Drop for VkChain {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_semaphore(self.acquire_semaphore, None);
            self.loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

/// Buffer index 0 of the chain. The image is owned by the swapchain, so
/// there is nothing to destroy on drop.
pub struct VkBackBuffer {
    image: vk::Image,
    format: vk::Format,
    extent: vk::Extent2D,
}

impl VkBackBuffer {
    /// The swapchain image
    pub fn image(&self) -> vk::Image {
        self.image
    }

    /// Buffer extent
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}

/// Owned depth/stencil image with its backing memory
pub struct VkDepthBuffer {
    device: ash::Device,
    image: vk::Image,
    memory: vk::DeviceMemory,
    format: vk::Format,
}

impl VkDepthBuffer {
    /// The depth image
    pub fn image(&self) -> vk::Image {
        self.image
    }

    /// Depth/stencil format of the image
    pub fn format(&self) -> vk::Format {
        self.format
    }
}

impl Drop for VkDepthBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_image(self.image, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Owned image view, used for both color and depth-stencil attachments
pub struct VkImageView {
    device: ash::Device,
    view: vk::ImageView,
}

impl VkImageView {
    /// The raw view handle
    pub fn handle(&self) -> vk::ImageView {
        self.view
    }
}

impl Drop for VkImageView {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_image_view(self.view, None);
        }
    }
}

const DEPTH_FORMAT: vk::Format = vk::Format::D24_UNORM_S8_UINT;

impl GfxBackend for VulkanBackend {
    type Device = VkDevice;
    type Context = VkContext;
    type Target = VkSurface;
    type Chain = VkChain;
    type BackBuffer = VkBackBuffer;
    type DepthBuffer = VkDepthBuffer;
    type RenderTargetView = VkImageView;
    type DepthStencilView = VkImageView;

    fn adapters(&self) -> GfxResult<Vec<AdapterDesc>> {
        let devices = self.physical_devices()?;
        Ok(devices
            .iter()
            .enumerate()
            .map(|(ordinal, &device)| {
                let properties = unsafe { self.instance.get_physical_device_properties(device) };
                AdapterDesc {
                    name: self.device_name(&properties),
                    ordinal: ordinal as u32,
                }
            })
            .collect())
    }

    fn create_device(
        &mut self,
        ordinal: u32,
        candidates: &[CapabilityTier],
        debug: bool,
    ) -> GfxResult<(VkDevice, VkContext, CapabilityTier)> {
        let devices = self.physical_devices()?;
        let physical = *devices
            .get(ordinal as usize)
            .ok_or(GfxError::AdapterNotFound { ordinal })?;

        let properties = unsafe { self.instance.get_physical_device_properties(physical) };
        let tier = candidates
            .iter()
            .copied()
            .find(|&tier| supports(properties.api_version, tier))
            .ok_or_else(|| {
                GfxError::DeviceCreationFailed(format!(
                    "adapter \"{}\" supports none of the requested feature tiers",
                    self.device_name(&properties)
                ))
            })?;

        let queue_families = unsafe {
            self.instance
                .get_physical_device_queue_family_properties(physical)
        };
        let queue_family = queue_families
            .iter()
            .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
            .map(|index| index as u32)
            .ok_or_else(|| {
                GfxError::DeviceCreationFailed("no graphics queue family found".to_string())
            })?;

        let queue_infos = [vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(queue_family)
            .queue_priorities(&[1.0])
            .build()];
        let device_extensions = [SwapchainLoader::name().as_ptr()];
        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&device_extensions);

        let device = unsafe {
            self.instance
                .create_device(physical, &create_info, None)
                .map_err(|e| GfxError::DeviceCreationFailed(format!("{e:?}")))?
        };
        let queue = unsafe { device.get_device_queue(queue_family, 0) };

        log::info!(
            "Opened adapter {} \"{}\" at feature tier {} (debug={})",
            ordinal,
            self.device_name(&properties),
            tier,
            debug
        );

        Ok((
            VkDevice {
                device,
                physical,
                queue_family,
                queue,
            },
            VkContext { queue, bound: None },
            tier,
        ))
    }

    fn client_size(&self, device: &VkDevice, target: &VkSurface) -> GfxResult<(u32, u32)> {
        let caps = unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(device.physical, target.surface)
                .map_err(|e| GfxError::SwapchainCreationFailed(format!("{e:?}")))?
        };
        if caps.current_extent.width == u32::MAX {
            // The window system leaves the extent to the application.
            return Ok((caps.min_image_extent.width, caps.min_image_extent.height));
        }
        Ok((caps.current_extent.width, caps.current_extent.height))
    }

    fn create_chain(
        &mut self,
        device: &VkDevice,
        target: VkSurface,
        desc: &ChainDesc,
    ) -> GfxResult<VkChain> {
        let loader = SwapchainLoader::new(&self.instance, &device.device);
        let (swapchain, images, format, extent) = build_swapchain(
            &self.surface_loader,
            &loader,
            device,
            target.surface,
            desc.width,
            desc.height,
            desc.vsync,
            vk::SwapchainKHR::null(),
        )?;

        let semaphore_info = vk::SemaphoreCreateInfo::builder();
        let acquire_semaphore = unsafe {
            device
                .device
                .create_semaphore(&semaphore_info, None)
                .map_err(|e| GfxError::SwapchainCreationFailed(format!("semaphore: {e:?}")))?
        };

        Ok(VkChain {
            loader,
            device: device.device.clone(),
            swapchain,
            images,
            format,
            extent,
            acquire_semaphore,
            vsync: desc.vsync,
            fullscreen: desc.fullscreen,
            surface: target,
        })
    }

    fn back_buffer(&mut self, chain: &VkChain) -> GfxResult<VkBackBuffer> {
        let image = chain
            .images
            .first()
            .copied()
            .ok_or_else(|| GfxError::SwapchainCreationFailed("chain has no images".to_string()))?;
        Ok(VkBackBuffer {
            image,
            format: chain.format.format,
            extent: chain.extent,
        })
    }

    fn create_render_target_view(
        &mut self,
        device: &VkDevice,
        buffer: &VkBackBuffer,
    ) -> GfxResult<VkImageView> {
        create_view(
            &device.device,
            buffer.image,
            buffer.format,
            vk::ImageAspectFlags::COLOR,
        )
    }

    fn create_depth_buffer(
        &mut self,
        device: &VkDevice,
        width: u32,
        height: u32,
    ) -> GfxResult<VkDepthBuffer> {
        let image_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(DEPTH_FORMAT)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
            .samples(vk::SampleCountFlags::TYPE_1)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let image = unsafe {
            device
                .device
                .create_image(&image_info, None)
                .map_err(|e| GfxError::ViewCreationFailed(format!("depth image: {e:?}")))?
        };

        let requirements = unsafe { device.device.get_image_memory_requirements(image) };
        let memory_type = find_memory_type(
            &self.instance,
            device.physical,
            requirements.memory_type_bits,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        );
        let memory_type = match memory_type {
            Some(index) => index,
            None => {
                unsafe { device.device.destroy_image(image, None) };
                return Err(GfxError::ViewCreationFailed(
                    "no suitable memory type for depth buffer".to_string(),
                ));
            }
        };

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type);
        let memory = unsafe {
            match device.device.allocate_memory(&alloc_info, None) {
                Ok(memory) => memory,
                Err(e) => {
                    device.device.destroy_image(image, None);
                    return Err(GfxError::ViewCreationFailed(format!("depth memory: {e:?}")));
                }
            }
        };

        if let Err(e) = unsafe { device.device.bind_image_memory(image, memory, 0) } {
            unsafe {
                device.device.destroy_image(image, None);
                device.device.free_memory(memory, None);
            }
            return Err(GfxError::ViewCreationFailed(format!("depth bind: {e:?}")));
        }

        Ok(VkDepthBuffer {
            device: device.device.clone(),
            image,
            memory,
            format: DEPTH_FORMAT,
        })
    }

    fn create_depth_stencil_view(
        &mut self,
        device: &VkDevice,
        depth: &VkDepthBuffer,
    ) -> GfxResult<VkImageView> {
        create_view(
            &device.device,
            depth.image,
            depth.format,
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL,
        )
    }

    fn resize_chain(
        &mut self,
        device: &VkDevice,
        chain: &mut VkChain,
        width: u32,
        height: u32,
    ) -> GfxResult<()> {
        unsafe {
            device
                .device
                .device_wait_idle()
                .map_err(|e| GfxError::ResizeFailed(format!("{e:?}")))?;
        }

        // The caller has dropped every view over the old buffers, so the old
        // swapchain can be retired as soon as the replacement exists.
        let (swapchain, images, format, extent) = build_swapchain(
            &self.surface_loader,
            &chain.loader,
            device,
            chain.surface.surface,
            width,
            height,
            chain.vsync,
            chain.swapchain,
        )
        .map_err(|e| GfxError::ResizeFailed(e.to_string()))?;

        unsafe {
            chain.loader.destroy_swapchain(chain.swapchain, None);
        }
        chain.swapchain = swapchain;
        chain.images = images;
        chain.format = format;
        chain.extent = extent;
        Ok(())
    }

    fn present(&mut self, device: &VkDevice, chain: &mut VkChain, _vsync: bool) -> GfxResult<()> {
        // Synchronization policy is fixed by the present mode chosen at
        // chain creation; the per-call flag cannot change it here.
        let (index, _suboptimal) = unsafe {
            chain
                .loader
                .acquire_next_image(
                    chain.swapchain,
                    u64::MAX,
                    chain.acquire_semaphore,
                    vk::Fence::null(),
                )
                .map_err(|e| GfxError::PresentFailed(format!("acquire: {e:?}")))?
        };

        let wait_semaphores = [chain.acquire_semaphore];
        let swapchains = [chain.swapchain];
        let indices = [index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&indices);

        unsafe {
            chain
                .loader
                .queue_present(device.queue, &present_info)
                .map_err(|e| GfxError::PresentFailed(format!("{e:?}")))?;
        }
        Ok(())
    }

    fn exit_fullscreen(&mut self, chain: &mut VkChain) {
        if chain.fullscreen {
            log::info!("leaving fullscreen before swapchain release");
            chain.fullscreen = false;
        }
    }

    fn bind_render_targets(
        &mut self,
        context: &mut VkContext,
        rtv: &VkImageView,
        dsv: &VkImageView,
    ) {
        context.bound = Some((rtv.view, dsv.view));
    }
}

#[allow(clippy::too_many_arguments)]
fn build_swapchain(
    surface_loader: &Surface,
    loader: &SwapchainLoader,
    device: &VkDevice,
    surface: vk::SurfaceKHR,
    width: u32,
    height: u32,
    vsync: bool,
    old_swapchain: vk::SwapchainKHR,
) -> GfxResult<(vk::SwapchainKHR, Vec<vk::Image>, vk::SurfaceFormatKHR, vk::Extent2D)> {
    let err = |e: vk::Result| GfxError::SwapchainCreationFailed(format!("{e:?}"));

    let caps = unsafe {
        surface_loader
            .get_physical_device_surface_capabilities(device.physical, surface)
            .map_err(err)?
    };
    let formats = unsafe {
        surface_loader
            .get_physical_device_surface_formats(device.physical, surface)
            .map_err(err)?
    };
    if formats.is_empty() {
        return Err(GfxError::SwapchainCreationFailed(
            "surface reports no formats".to_string(),
        ));
    }
    let format = formats
        .iter()
        .find(|sf| {
            sf.format == vk::Format::R8G8B8A8_UNORM
                && sf.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .copied()
        .unwrap_or(formats[0]);

    let present_modes = unsafe {
        surface_loader
            .get_physical_device_surface_present_modes(device.physical, surface)
            .map_err(err)?
    };
    // FIFO is the only mode with guaranteed support; IMMEDIATE is the
    // unsynchronized present when the driver offers it.
    let present_mode = if vsync {
        vk::PresentModeKHR::FIFO
    } else {
        present_modes
            .iter()
            .copied()
            .find(|&mode| mode == vk::PresentModeKHR::IMMEDIATE)
            .unwrap_or(vk::PresentModeKHR::FIFO)
    };

    let extent = if caps.current_extent.width != u32::MAX {
        caps.current_extent
    } else {
        vk::Extent2D {
            width: width.clamp(caps.min_image_extent.width, caps.max_image_extent.width),
            height: height.clamp(caps.min_image_extent.height, caps.max_image_extent.height),
        }
    };

    let mut image_count = BACKBUFFER_COUNT.max(caps.min_image_count);
    if caps.max_image_count > 0 {
        image_count = image_count.min(caps.max_image_count);
    }

    let create_info = vk::SwapchainCreateInfoKHR::builder()
        .surface(surface)
        .min_image_count(image_count)
        .image_format(format.format)
        .image_color_space(format.color_space)
        .image_extent(extent)
        .image_array_layers(1)
        .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
        .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        .pre_transform(caps.current_transform)
        .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
        .present_mode(present_mode)
        .clipped(true)
        .old_swapchain(old_swapchain);

    let swapchain = unsafe { loader.create_swapchain(&create_info, None).map_err(err)? };
    let images = unsafe {
        match loader.get_swapchain_images(swapchain) {
            Ok(images) => images,
            Err(e) => {
                loader.destroy_swapchain(swapchain, None);
                return Err(err(e));
            }
        }
    };

    Ok((swapchain, images, format, extent))
}

fn create_view(
    device: &ash::Device,
    image: vk::Image,
    format: vk::Format,
    aspect: vk::ImageAspectFlags,
) -> GfxResult<VkImageView> {
    let create_info = vk::ImageViewCreateInfo::builder()
        .image(image)
        .view_type(vk::ImageViewType::TYPE_2D)
        .format(format)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: aspect,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        });

    let view = unsafe {
        device
            .create_image_view(&create_info, None)
            .map_err(|e| GfxError::ViewCreationFailed(format!("{e:?}")))?
    };
    Ok(VkImageView {
        device: device.clone(),
        view,
    })
}

fn find_memory_type(
    instance: &Instance,
    physical: vk::PhysicalDevice,
    type_bits: u32,
    properties: vk::MemoryPropertyFlags,
) -> Option<u32> {
    let memory = unsafe { instance.get_physical_device_memory_properties(physical) };
    (0..memory.memory_type_count).find(|&index| {
        (type_bits & (1 << index)) != 0
            && memory.memory_types[index as usize]
                .property_flags
                .contains(properties)
    })
}

unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let callback_data = *callback_data;
    let message = CStr::from_ptr(callback_data.p_message).to_string_lossy();

    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::error!("[Vulkan] {:?} - {}", message_type, message);
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::warn!("[Vulkan] {:?} - {}", message_type, message);
    } else {
        log::debug!("[Vulkan] {:?} - {}", message_type, message);
    }

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_map_to_core_versions() {
        assert_eq!(tier_api_version(CapabilityTier::Tier10_0), vk::API_VERSION_1_0);
        assert_eq!(tier_api_version(CapabilityTier::Tier10_1), vk::API_VERSION_1_1);
        assert_eq!(tier_api_version(CapabilityTier::Tier11_0), vk::API_VERSION_1_2);
        assert_eq!(tier_api_version(CapabilityTier::Tier11_1), vk::API_VERSION_1_3);
    }

    #[test]
    fn a_newer_device_supports_older_tiers() {
        assert!(supports(vk::API_VERSION_1_3, CapabilityTier::Tier10_0));
        assert!(supports(vk::API_VERSION_1_2, CapabilityTier::Tier11_0));
        assert!(!supports(vk::API_VERSION_1_1, CapabilityTier::Tier11_1));
    }
}
