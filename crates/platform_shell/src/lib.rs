//! # Platform Shell
//!
//! The platform/device lifecycle layer of a real-time rendering application.
//! It owns a single OS window, a single graphics device, and the presentable
//! swapchain bound to that window, and it pumps window-system messages into a
//! fixed set of application callbacks.
//!
//! ## Layout
//!
//! - [`gfx`] — capability negotiation, swapchain lifecycle, and the backend
//!   seam (`ash`-based Vulkan backend plus a deterministic headless backend)
//! - [`window`] — native window, message translation, and the run loop
//! - [`session`] — the aggregate root sequencing creation and teardown
//! - [`display`] — adapter/output/mode inventory for diagnostics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use platform_shell::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     platform_shell::logging::init();
//!
//!     let params = InitParams::default();
//!     let fullscreen = params.flags.contains(GfxFlags::FULLSCREEN);
//!     let mut shell = GlfwShell::create("my-app", 1280, 720, fullscreen)?;
//!     let extensions = shell.required_instance_extensions()?;
//!     let backend = VulkanBackend::new(&extensions, params.flags.contains(GfxFlags::DEBUG))?;
//!     let surface = shell.create_vulkan_surface(&backend)?;
//!
//!     let mut session = Session::windowed(backend, shell, surface, "my-app", &params)?;
//!     let mut callbacks = Callbacks::new();
//!     callbacks.set_update_fn(|| { /* per-frame work */ });
//!     session.run(&mut callbacks);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod display;
pub mod gfx;
pub mod logging;
pub mod session;
pub mod window;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{GfxFlags, InitParams},
        display::{AdapterRecord, DisplayInventory, ModeRecord, OutputRecord, RationalMode},
        gfx::{
            backend::GfxBackend, negotiate::negotiate, sim::SimBackend, swapchain::Swapchain,
            tier::CapabilityTier, vulkan::VulkanBackend, GfxError,
        },
        session::{Host, Session, SessionError},
        window::{
            events::{Callbacks, EventSink, MouseButton, WindowMessage},
            glfw_shell::GlfwShell,
            shell::{MessagePump, Router, ScriptedPump},
            ShellError,
        },
    };
}
