//! Application session aggregate
//!
//! A [`Session`] owns the window pump, the negotiated device and context,
//! and the swapchain, and sequences their creation and teardown. It is an
//! ordinary owned value: construct as many as the process needs, pass them
//! where they are used. [`Host`] layers the classic one-session-per-process
//! surface on top for applications that want it.
//!
//! Field declaration order in [`Session`] is teardown order: swapchain
//! before context and device, device before the backend.

use thiserror::Error;

use crate::config::{GfxFlags, InitParams};
use crate::display::{self, DisplayInventory};
use crate::gfx::backend::{ChainDesc, GfxBackend};
use crate::gfx::negotiate::negotiate;
use crate::gfx::swapchain::{RenderTargets, Swapchain};
use crate::gfx::tier::CapabilityTier;
use crate::gfx::GfxError;
use crate::window::events::{Callbacks, EventSink, MouseButton};
use crate::window::shell::{self, MessagePump, Router};
use crate::window::ShellError;

/// Session construction and lifecycle errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// A [`Host`] already owns a live session
    #[error("a session is already initialized")]
    AlreadyInitialized,

    /// Rejected initialization parameters
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Graphics device or swapchain failure
    #[error(transparent)]
    Gfx(#[from] GfxError),

    /// Window-system failure
    #[error(transparent)]
    Shell(#[from] ShellError),
}

/// The platform session: window pump, device, context and swapchain.
pub struct Session<B: GfxBackend, P: MessagePump> {
    name: String,
    vsync: bool,
    fullscreen: bool,
    tier: CapabilityTier,
    router: Router,
    // teardown order: chain resources, then context and device, then the
    // backend they came from
    swapchain: Swapchain<B>,
    context: B::Context,
    device: B::Device,
    backend: B,
    pump: Option<P>,
}

impl<B: GfxBackend, P: MessagePump> Session<B, P> {
    /// Create a full windowed session: negotiate a device on the requested
    /// adapter, build the swapchain on `target`, and bind its views as the
    /// context's render targets.
    pub fn windowed(
        backend: B,
        pump: P,
        target: B::Target,
        name: &str,
        params: &InitParams,
    ) -> Result<Self, SessionError> {
        log::info!("starting session \"{}\"", name);
        Self::build(backend, Some(pump), target, name, params)
    }

    /// Create a device-only session on a caller-supplied presentation
    /// target: same device, swapchain and render-target sequencing as
    /// [`Self::windowed`], but no window shell and no message loop. The
    /// caller owns the window the target was made from.
    pub fn device_only(
        backend: B,
        target: B::Target,
        name: &str,
        params: &InitParams,
    ) -> Result<Self, SessionError> {
        log::info!("starting device-only session \"{}\"", name);
        Self::build(backend, None, target, name, params)
    }

    fn build(
        mut backend: B,
        pump: Option<P>,
        target: B::Target,
        name: &str,
        params: &InitParams,
    ) -> Result<Self, SessionError> {
        params.validate().map_err(SessionError::InvalidParams)?;
        let (width, height) = params.resolved_size();
        let debug = params.flags.contains(GfxFlags::DEBUG);

        let negotiated = negotiate(&mut backend, params.adapter_ordinal, params.tier, debug)?;
        let mut context = negotiated.context;

        let desc = ChainDesc {
            width,
            height,
            refresh_rate: params.refresh_rate,
            fullscreen: params.flags.contains(GfxFlags::FULLSCREEN),
            vsync: params.flags.contains(GfxFlags::VSYNC),
        };
        let swapchain = Swapchain::create(&mut backend, &negotiated.device, target, &desc)?;
        if let Some(targets) = swapchain.targets() {
            backend.bind_render_targets(
                &mut context,
                targets.render_target_view(),
                targets.depth_stencil_view(),
            );
        }

        Ok(Self {
            name: name.to_string(),
            vsync: desc.vsync,
            fullscreen: desc.fullscreen,
            tier: negotiated.tier,
            router: Router::new(swapchain.width(), swapchain.height(), false),
            swapchain,
            context,
            device: negotiated.device,
            backend,
            pump,
        })
    }

    /// Drive the message loop until the window is destroyed or quit is
    /// requested. Resizes reach the swapchain before the sink's resize
    /// callback. Returns immediately on a device-only session.
    pub fn run(&mut self, sink: &mut dyn EventSink) {
        let Some(pump) = self.pump.as_mut() else {
            log::warn!("run() called on a device-only session");
            return;
        };

        let backend = &mut self.backend;
        let device = &self.device;
        let context = &mut self.context;
        let swapchain = &mut self.swapchain;
        let router = &mut self.router;

        let mut resize_hook = |width: u32, height: u32| {
            match swapchain.resize(backend, device, width, height) {
                Ok(()) => {
                    if let Some(targets) = swapchain.targets() {
                        backend.bind_render_targets(
                            context,
                            targets.render_target_view(),
                            targets.depth_stencil_view(),
                        );
                    }
                }
                Err(e) => log::error!("swapchain resize to {}x{} failed: {}", width, height, e),
            }
        };

        shell::run(pump, router, sink, &mut resize_hook);
    }

    /// Present the back buffer with the session's vsync policy
    pub fn present(&mut self) -> Result<(), SessionError> {
        self.swapchain
            .present(&mut self.backend, &self.device, self.vsync)?;
        Ok(())
    }

    /// Adapter and display-mode inventory of this session's backend
    pub fn display_inventory(&mut self) -> Result<DisplayInventory, SessionError> {
        let adapters = self.backend.adapter_records()?;
        let outputs = match self.pump.as_mut() {
            Some(pump) => pump.outputs(),
            None => Vec::new(),
        };
        Ok(display::build_inventory(adapters, outputs))
    }

    /// Session name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tier the device was opened at
    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// The open device
    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// The device's immediate context
    pub fn context(&self) -> &B::Context {
        &self.context
    }

    /// The window pump.
    ///
    /// # Panics
    /// Panics on a device-only session, which has no pump.
    pub fn pump(&self) -> &P {
        self.pump
            .as_ref()
            .expect("device-only session has no window pump")
    }

    /// The window pump, mutably.
    ///
    /// # Panics
    /// Panics on a device-only session, which has no pump.
    pub fn pump_mut(&mut self) -> &mut P {
        self.pump
            .as_mut()
            .expect("device-only session has no window pump")
    }

    /// Current client width in pixels
    pub fn width(&self) -> u32 {
        self.router.width()
    }

    /// Current client height in pixels
    pub fn height(&self) -> u32 {
        self.router.height()
    }

    /// Whether the window currently has the foreground
    pub fn is_active(&self) -> bool {
        self.router.is_active()
    }

    /// Keep polling (and updating) while in the background
    pub fn set_always_active(&mut self, always_active: bool) {
        self.router.set_always_active(always_active);
    }

    /// The swapchain's resource group, when it is ready
    pub fn targets(&self) -> Option<&RenderTargets<B>> {
        self.swapchain.targets()
    }
}

impl<B: GfxBackend, P: MessagePump> Drop for Session<B, P> {
    fn drop(&mut self) {
        self.swapchain.destroy(&mut self.backend);
        if self.fullscreen {
            // The backend left exclusive mode during destroy; the window
            // system's mode switch is the pump's to undo.
            if let Some(pump) = self.pump.as_mut() {
                pump.exit_fullscreen();
            }
            self.fullscreen = false;
        }
        log::info!("session \"{}\" shut down", self.name);
    }
}

/// One-session-per-process surface over [`Session`].
///
/// Owns at most one live session plus a [`Callbacks`] table, mirroring the
/// classic init / set callbacks / run / shutdown application shape.
pub struct Host<B: GfxBackend, P: MessagePump> {
    session: Option<Session<B, P>>,
    callbacks: Callbacks,
}

impl<B: GfxBackend, P: MessagePump> Default for Host<B, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: GfxBackend, P: MessagePump> Host<B, P> {
    /// An empty host with no live session
    pub fn new() -> Self {
        Self {
            session: None,
            callbacks: Callbacks::new(),
        }
    }

    /// Initialize the windowed session. Fails with
    /// [`SessionError::AlreadyInitialized`] when one is already live.
    pub fn init_windowed(
        &mut self,
        backend: B,
        pump: P,
        target: B::Target,
        name: &str,
        params: &InitParams,
    ) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyInitialized);
        }
        self.session = Some(Session::windowed(backend, pump, target, name, params)?);
        Ok(())
    }

    /// Initialize a device-only session on a caller-supplied target. Fails
    /// with [`SessionError::AlreadyInitialized`] when one is already live.
    pub fn init_device_only(
        &mut self,
        backend: B,
        target: B::Target,
        name: &str,
        params: &InitParams,
    ) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyInitialized);
        }
        self.session = Some(Session::device_only(backend, target, name, params)?);
        Ok(())
    }

    /// Tear the session down. A no-op when none is live.
    pub fn shutdown(&mut self) {
        self.session = None;
    }

    /// Whether a session is currently live
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// The live session.
    ///
    /// # Panics
    /// Panics when no session is initialized.
    pub fn session(&self) -> &Session<B, P> {
        self.session.as_ref().expect("no session is initialized")
    }

    /// The live session, mutably.
    ///
    /// # Panics
    /// Panics when no session is initialized.
    pub fn session_mut(&mut self) -> &mut Session<B, P> {
        self.session.as_mut().expect("no session is initialized")
    }

    /// Run the message loop against the bound callbacks
    pub fn run(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.run(&mut self.callbacks);
        }
    }

    /// Bind the window-created callback
    pub fn set_create_fn(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.set_create_fn(f);
    }

    /// Bind the window-destroyed callback
    pub fn set_destroy_fn(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.set_destroy_fn(f);
    }

    /// Bind the resize callback
    pub fn set_resize_fn(&mut self, f: impl FnMut(u32, u32) + 'static) {
        self.callbacks.set_resize_fn(f);
    }

    /// Bind the activation-change callback
    pub fn set_activate_fn(&mut self, f: impl FnMut(bool) + 'static) {
        self.callbacks.set_activate_fn(f);
    }

    /// Bind the keypress callback
    pub fn set_keypress_fn(&mut self, f: impl FnMut(char, u32) + 'static) {
        self.callbacks.set_keypress_fn(f);
    }

    /// Bind the per-iteration update callback
    pub fn set_update_fn(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.set_update_fn(f);
    }

    /// Bind the mouse-button-down callback
    pub fn set_mouse_down_fn(&mut self, f: impl FnMut(i32, i32, MouseButton) + 'static) {
        self.callbacks.set_mouse_down_fn(f);
    }

    /// Bind the mouse-button-up callback
    pub fn set_mouse_up_fn(&mut self, f: impl FnMut(i32, i32, MouseButton) + 'static) {
        self.callbacks.set_mouse_up_fn(f);
    }

    /// Bind the mouse-move callback
    pub fn set_mouse_move_fn(&mut self, f: impl FnMut(i32, i32) + 'static) {
        self.callbacks.set_mouse_move_fn(f);
    }
}
