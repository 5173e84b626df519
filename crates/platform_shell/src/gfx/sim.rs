//! Deterministic headless backend
//!
//! Stands in for the real platform wherever no GPU or window system is
//! available: unit tests, CI, and device-only embedding experiments. Every
//! resource records its creation and release into a shared [`Journal`], so
//! callers can assert the exact acquisition and teardown order, and every
//! operation can be made to fail on demand through [`FailPlan`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::display::AdapterRecord;
use crate::gfx::{
    backend::{AdapterDesc, ChainDesc, GfxBackend},
    tier::CapabilityTier,
    GfxError, GfxResult,
};

/// Shared, ordered record of backend events.
///
/// Cloning is shallow; all clones append to the same log. Single-threaded by
/// design, matching the crate's cooperative execution model.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    /// Append an event
    pub fn record(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    /// Snapshot of all recorded events, oldest first
    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Drop all recorded events
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Per-operation failure injection switches
#[derive(Debug, Clone, Copy, Default)]
pub struct FailPlan {
    /// Fail device creation
    pub device: bool,
    /// Fail chain creation
    pub chain: bool,
    /// Fail back-buffer fetch
    pub back_buffer: bool,
    /// Fail render-target view creation
    pub render_target_view: bool,
    /// Fail depth-buffer creation
    pub depth_buffer: bool,
    /// Fail depth-stencil view creation
    pub depth_stencil_view: bool,
    /// Fail the in-place chain resize
    pub resize: bool,
    /// Fail presents
    pub present: bool,
}

/// Simulated window target with a fixed client size
#[derive(Debug, Clone, Copy)]
pub struct SimWindow {
    /// Client width in pixels
    pub width: u32,
    /// Client height in pixels
    pub height: u32,
}

impl SimWindow {
    /// Create a target with the given client size
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Simulated open device
pub struct SimDevice {
    journal: Journal,
    /// Whether debug instrumentation was requested at creation
    pub debug: bool,
}

impl Drop for SimDevice {
    fn drop(&mut self) {
        self.journal.record("device.release");
    }
}

/// Simulated immediate context
pub struct SimContext {
    journal: Journal,
    /// Whether render targets have been bound
    pub targets_bound: bool,
}

impl Drop for SimContext {
    fn drop(&mut self) {
        self.journal.record("context.release");
    }
}

/// Simulated presentation chain
pub struct SimChain {
    journal: Journal,
    width: u32,
    height: u32,
    /// Whether the chain is in fullscreen exclusive mode
    pub fullscreen: bool,
}

impl SimChain {
    /// Current buffer size
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for SimChain {
    fn drop(&mut self) {
        self.journal.record("chain.release");
    }
}

/// Simulated back-buffer image
pub struct SimBackBuffer {
    journal: Journal,
    /// Buffer width in pixels
    pub width: u32,
    /// Buffer height in pixels
    pub height: u32,
}

impl Drop for SimBackBuffer {
    fn drop(&mut self) {
        self.journal.record("backbuffer.release");
    }
}

/// Simulated depth/stencil image
pub struct SimDepthBuffer {
    journal: Journal,
    /// Buffer width in pixels
    pub width: u32,
    /// Buffer height in pixels
    pub height: u32,
}

impl Drop for SimDepthBuffer {
    fn drop(&mut self) {
        self.journal.record("depthbuffer.release");
    }
}

/// Simulated render-target view
pub struct SimRenderTargetView {
    journal: Journal,
    /// Width of the viewed buffer
    pub width: u32,
    /// Height of the viewed buffer
    pub height: u32,
}

impl Drop for SimRenderTargetView {
    fn drop(&mut self) {
        self.journal.record("rtv.release");
    }
}

/// Simulated depth-stencil view
pub struct SimDepthStencilView {
    journal: Journal,
    /// Width of the viewed buffer
    pub width: u32,
    /// Height of the viewed buffer
    pub height: u32,
}

impl Drop for SimDepthStencilView {
    fn drop(&mut self) {
        self.journal.record("dsv.release");
    }
}

/// The headless backend itself
pub struct SimBackend {
    journal: Journal,
    adapters: Vec<AdapterDesc>,
    supported: Vec<CapabilityTier>,
    /// Failure injection plan, mutable between operations
    pub fail: FailPlan,
}

impl SimBackend {
    /// One adapter, tiers 10.0 through 11.0 supported, nothing failing
    pub fn new() -> Self {
        Self {
            journal: Journal::default(),
            adapters: vec![AdapterDesc {
                name: "Simulated Adapter".to_string(),
                ordinal: 0,
            }],
            supported: vec![
                CapabilityTier::Tier10_0,
                CapabilityTier::Tier10_1,
                CapabilityTier::Tier11_0,
            ],
            fail: FailPlan::default(),
        }
    }

    /// Replace the adapter inventory with the given names
    pub fn with_adapters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adapters = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| AdapterDesc {
                name: name.into(),
                ordinal: i as u32,
            })
            .collect();
        self
    }

    /// Replace the set of tiers the simulated device supports
    pub fn with_supported_tiers(mut self, tiers: impl IntoIterator<Item = CapabilityTier>) -> Self {
        self.supported = tiers.into_iter().collect();
        self
    }

    /// Apply a failure plan
    pub fn with_failures(mut self, fail: FailPlan) -> Self {
        self.fail = fail;
        self
    }

    /// Handle to the shared event journal
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GfxBackend for SimBackend {
    type Device = SimDevice;
    type Context = SimContext;
    type Target = SimWindow;
    type Chain = SimChain;
    type BackBuffer = SimBackBuffer;
    type DepthBuffer = SimDepthBuffer;
    type RenderTargetView = SimRenderTargetView;
    type DepthStencilView = SimDepthStencilView;

    fn adapters(&self) -> GfxResult<Vec<AdapterDesc>> {
        Ok(self.adapters.clone())
    }

    fn create_device(
        &mut self,
        ordinal: u32,
        candidates: &[CapabilityTier],
        debug: bool,
    ) -> GfxResult<(Self::Device, Self::Context, CapabilityTier)> {
        if ordinal as usize >= self.adapters.len() {
            return Err(GfxError::AdapterNotFound { ordinal });
        }
        self.journal.record(format!("device.create debug={debug}"));
        if self.fail.device {
            return Err(GfxError::DeviceCreationFailed("injected failure".to_string()));
        }
        let tier = candidates
            .iter()
            .copied()
            .find(|t| self.supported.contains(t))
            .ok_or_else(|| {
                GfxError::DeviceCreationFailed("no candidate tier supported".to_string())
            })?;
        self.journal.record(format!("device.tier {tier}"));
        Ok((
            SimDevice {
                journal: self.journal.clone(),
                debug,
            },
            SimContext {
                journal: self.journal.clone(),
                targets_bound: false,
            },
            tier,
        ))
    }

    fn client_size(&self, _device: &Self::Device, target: &Self::Target) -> GfxResult<(u32, u32)> {
        Ok((target.width, target.height))
    }

    fn create_chain(
        &mut self,
        _device: &Self::Device,
        _target: Self::Target,
        desc: &ChainDesc,
    ) -> GfxResult<Self::Chain> {
        if self.fail.chain {
            return Err(GfxError::SwapchainCreationFailed(
                "injected failure".to_string(),
            ));
        }
        self.journal.record(format!(
            "chain.create {}x{} fullscreen={} vsync={}",
            desc.width, desc.height, desc.fullscreen, desc.vsync
        ));
        Ok(SimChain {
            journal: self.journal.clone(),
            width: desc.width,
            height: desc.height,
            fullscreen: desc.fullscreen,
        })
    }

    fn back_buffer(&mut self, chain: &Self::Chain) -> GfxResult<Self::BackBuffer> {
        if self.fail.back_buffer {
            return Err(GfxError::ViewCreationFailed("injected failure".to_string()));
        }
        self.journal
            .record(format!("backbuffer.acquire {}x{}", chain.width, chain.height));
        Ok(SimBackBuffer {
            journal: self.journal.clone(),
            width: chain.width,
            height: chain.height,
        })
    }

    fn create_render_target_view(
        &mut self,
        _device: &Self::Device,
        buffer: &Self::BackBuffer,
    ) -> GfxResult<Self::RenderTargetView> {
        if self.fail.render_target_view {
            return Err(GfxError::ViewCreationFailed("injected failure".to_string()));
        }
        self.journal.record("rtv.create");
        Ok(SimRenderTargetView {
            journal: self.journal.clone(),
            width: buffer.width,
            height: buffer.height,
        })
    }

    fn create_depth_buffer(
        &mut self,
        _device: &Self::Device,
        width: u32,
        height: u32,
    ) -> GfxResult<Self::DepthBuffer> {
        if self.fail.depth_buffer {
            return Err(GfxError::ViewCreationFailed("injected failure".to_string()));
        }
        self.journal
            .record(format!("depthbuffer.create {width}x{height}"));
        Ok(SimDepthBuffer {
            journal: self.journal.clone(),
            width,
            height,
        })
    }

    fn create_depth_stencil_view(
        &mut self,
        _device: &Self::Device,
        depth: &Self::DepthBuffer,
    ) -> GfxResult<Self::DepthStencilView> {
        if self.fail.depth_stencil_view {
            return Err(GfxError::ViewCreationFailed("injected failure".to_string()));
        }
        self.journal.record("dsv.create");
        Ok(SimDepthStencilView {
            journal: self.journal.clone(),
            width: depth.width,
            height: depth.height,
        })
    }

    fn resize_chain(
        &mut self,
        _device: &Self::Device,
        chain: &mut Self::Chain,
        width: u32,
        height: u32,
    ) -> GfxResult<()> {
        if self.fail.resize {
            return Err(GfxError::ResizeFailed("injected failure".to_string()));
        }
        chain.width = width;
        chain.height = height;
        self.journal.record(format!("chain.resize {width}x{height}"));
        Ok(())
    }

    fn present(
        &mut self,
        _device: &Self::Device,
        _chain: &mut Self::Chain,
        vsync: bool,
    ) -> GfxResult<()> {
        if self.fail.present {
            return Err(GfxError::PresentFailed("injected failure".to_string()));
        }
        self.journal.record(format!("present vsync={vsync}"));
        Ok(())
    }

    fn exit_fullscreen(&mut self, chain: &mut Self::Chain) {
        chain.fullscreen = false;
        self.journal.record("chain.exit_fullscreen");
    }

    fn bind_render_targets(
        &mut self,
        context: &mut Self::Context,
        _rtv: &Self::RenderTargetView,
        _dsv: &Self::DepthStencilView,
    ) {
        context.targets_bound = true;
        self.journal.record("context.bind_targets");
    }
}
