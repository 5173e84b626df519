//! Backend-agnostic graphics trait
//!
//! This is the narrow contract the lifecycle core needs from a platform:
//! enumerate adapters, open a device at a negotiated tier, and create,
//! resize and present a chain of window-sized buffers. Resource handles are
//! associated types that release their platform object when dropped, so
//! every exit path — including error paths — releases what it acquired.

use crate::display::AdapterRecord;
use crate::gfx::{tier::CapabilityTier, GfxResult};

/// Fixed presentation-chain policy and per-session inputs
#[derive(Debug, Clone, Copy)]
pub struct ChainDesc {
    /// Buffer width in pixels (already resolved, never zero)
    pub width: u32,
    /// Buffer height in pixels (already resolved, never zero)
    pub height: u32,
    /// Target refresh rate in Hz
    pub refresh_rate: u32,
    /// Fullscreen exclusive mode
    pub fullscreen: bool,
    /// Synchronize presents with the vertical blank
    pub vsync: bool,
}

/// One enumerated graphics adapter
#[derive(Debug, Clone)]
pub struct AdapterDesc {
    /// Human-readable adapter name
    pub name: String,
    /// Enumeration ordinal
    pub ordinal: u32,
}

/// Platform contract for device and swapchain operations.
///
/// All associated resource types are owned handles: dropping one releases
/// the underlying platform object. The lifecycle core relies on this for
/// its ordering guarantees, so implementations must not require an explicit
/// release call in addition to drop.
pub trait GfxBackend {
    /// Open graphics device
    type Device;
    /// Immediate execution context of the device
    type Context;
    /// Presentable surface the chain binds to (consumed by chain creation)
    type Target;
    /// Presentation chain object; survives resize in place
    type Chain;
    /// Color image owned by the chain
    type BackBuffer;
    /// Depth/stencil image
    type DepthBuffer;
    /// Render-target view over the back buffer
    type RenderTargetView;
    /// Depth-stencil view over the depth buffer
    type DepthStencilView;

    /// Enumerate the adapters the platform factory reports
    fn adapters(&self) -> GfxResult<Vec<AdapterDesc>>;

    /// Open the adapter at `ordinal` against the given tier candidate list,
    /// in order, returning the device, its immediate context, and the tier
    /// that was actually resolved.
    fn create_device(
        &mut self,
        ordinal: u32,
        candidates: &[CapabilityTier],
        debug: bool,
    ) -> GfxResult<(Self::Device, Self::Context, CapabilityTier)>;

    /// Current client-area size of the target, in pixels
    fn client_size(&self, device: &Self::Device, target: &Self::Target) -> GfxResult<(u32, u32)>;

    /// Create the presentation chain bound to `target`
    fn create_chain(
        &mut self,
        device: &Self::Device,
        target: Self::Target,
        desc: &ChainDesc,
    ) -> GfxResult<Self::Chain>;

    /// Fetch buffer index 0 of the chain as the back buffer
    fn back_buffer(&mut self, chain: &Self::Chain) -> GfxResult<Self::BackBuffer>;

    /// Build a render-target view over the back buffer
    fn create_render_target_view(
        &mut self,
        device: &Self::Device,
        buffer: &Self::BackBuffer,
    ) -> GfxResult<Self::RenderTargetView>;

    /// Create a depth/stencil image of the given size
    fn create_depth_buffer(
        &mut self,
        device: &Self::Device,
        width: u32,
        height: u32,
    ) -> GfxResult<Self::DepthBuffer>;

    /// Build a depth-stencil view over the depth buffer
    fn create_depth_stencil_view(
        &mut self,
        device: &Self::Device,
        depth: &Self::DepthBuffer,
    ) -> GfxResult<Self::DepthStencilView>;

    /// Resize the chain's buffers in place. The caller has already dropped
    /// every view and buffer referencing the chain.
    fn resize_chain(
        &mut self,
        device: &Self::Device,
        chain: &mut Self::Chain,
        width: u32,
        height: u32,
    ) -> GfxResult<()>;

    /// Submit the back buffer, immediately or synchronized with the vblank
    fn present(
        &mut self,
        device: &Self::Device,
        chain: &mut Self::Chain,
        vsync: bool,
    ) -> GfxResult<()>;

    /// Leave fullscreen exclusive mode. Must be called before releasing a
    /// chain that is currently fullscreen.
    fn exit_fullscreen(&mut self, chain: &mut Self::Chain);

    /// Bind the views as the context's initial render targets
    fn bind_render_targets(
        &mut self,
        context: &mut Self::Context,
        rtv: &Self::RenderTargetView,
        dsv: &Self::DepthStencilView,
    );

    /// Adapter list shaped for the display inventory
    fn adapter_records(&self) -> GfxResult<Vec<AdapterRecord>> {
        Ok(self
            .adapters()?
            .into_iter()
            .map(|a| AdapterRecord {
                name: a.name,
                id: a.ordinal,
                outputs: Vec::new(),
            })
            .collect())
    }
}
