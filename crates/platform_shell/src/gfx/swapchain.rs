//! Presentation chain lifecycle
//!
//! A swapchain owns the chain object plus exactly four GPU resources: the
//! back buffer, its render-target view, the depth buffer, and its
//! depth-stencil view. The four are grouped in one [`RenderTargets`] value
//! so they are either all present or all absent; callbacks never observe a
//! partially constructed swapchain. Resize keeps the chain object alive and
//! resizes its buffers in place.

use crate::gfx::{
    backend::{ChainDesc, GfxBackend},
    GfxError, GfxResult,
};

/// Fixed buffer count of the presentation chain, not user-configurable
pub const BACKBUFFER_COUNT: u32 = 2;

/// The four GPU resources of a ready swapchain.
///
/// Field order is release order: views drop before the images they view,
/// depth-stencil state before color state.
pub struct RenderTargets<B: GfxBackend> {
    dsv: B::DepthStencilView,
    depth: B::DepthBuffer,
    rtv: B::RenderTargetView,
    back: B::BackBuffer,
}

impl<B: GfxBackend> RenderTargets<B> {
    /// Render-target view over the back buffer
    pub fn render_target_view(&self) -> &B::RenderTargetView {
        &self.rtv
    }

    /// Depth-stencil view over the depth buffer
    pub fn depth_stencil_view(&self) -> &B::DepthStencilView {
        &self.dsv
    }

    /// The back-buffer image
    pub fn back_buffer(&self) -> &B::BackBuffer {
        &self.back
    }

    /// The depth/stencil image
    pub fn depth_buffer(&self) -> &B::DepthBuffer {
        &self.depth
    }
}

/// Owned presentation chain with its buffers and views
pub struct Swapchain<B: GfxBackend> {
    // drop order: buffers and views, then the chain itself
    targets: Option<RenderTargets<B>>,
    chain: Option<B::Chain>,
    fullscreen: bool,
    width: u32,
    height: u32,
}

impl<B: GfxBackend> Swapchain<B> {
    /// Create the chain and all four resources bound to `target`.
    ///
    /// A zero width or height in `desc` derives both dimensions from the
    /// target's current client size. On any failure every resource acquired
    /// by this call is released, in reverse acquisition order, before the
    /// error is returned.
    pub fn create(
        backend: &mut B,
        device: &B::Device,
        target: B::Target,
        desc: &ChainDesc,
    ) -> GfxResult<Self> {
        let (mut width, mut height) = (desc.width, desc.height);
        if width == 0 || height == 0 {
            let (w, h) = backend.client_size(device, &target)?;
            width = w;
            height = h;
        }
        let resolved = ChainDesc {
            width,
            height,
            ..*desc
        };

        log::info!(
            "creating swapchain {}x{} ({} buffers, fullscreen={}, vsync={})",
            width,
            height,
            BACKBUFFER_COUNT,
            resolved.fullscreen,
            resolved.vsync
        );

        // Locals drop in reverse declaration order, which is exactly the
        // required release order on each early return below.
        let chain = backend.create_chain(device, target, &resolved)?;
        let back = backend.back_buffer(&chain).map_err(view_error)?;
        let rtv = backend
            .create_render_target_view(device, &back)
            .map_err(view_error)?;
        let depth = backend
            .create_depth_buffer(device, width, height)
            .map_err(view_error)?;
        let dsv = backend
            .create_depth_stencil_view(device, &depth)
            .map_err(view_error)?;

        Ok(Self {
            targets: Some(RenderTargets {
                dsv,
                depth,
                rtv,
                back,
            }),
            chain: Some(chain),
            fullscreen: resolved.fullscreen,
            width,
            height,
        })
    }

    /// Resize the chain's buffers in place.
    ///
    /// Releases the depth-stencil view, depth buffer, render-target view and
    /// back buffer, in that order, resizes the chain object, then rebuilds
    /// all four. A failing sub-step leaves the swapchain torn down; the next
    /// [`Self::present`] reports an error instead of faulting, and the
    /// caller may retry the resize.
    pub fn resize(
        &mut self,
        backend: &mut B,
        device: &B::Device,
        width: u32,
        height: u32,
    ) -> GfxResult<()> {
        drop(self.targets.take());

        let chain = self
            .chain
            .as_mut()
            .ok_or_else(|| GfxError::ResizeFailed("swapchain is torn down".to_string()))?;
        backend
            .resize_chain(device, chain, width, height)
            .map_err(resize_error)?;

        let back = backend.back_buffer(chain).map_err(resize_error)?;
        let rtv = backend
            .create_render_target_view(device, &back)
            .map_err(resize_error)?;
        let depth = backend
            .create_depth_buffer(device, width, height)
            .map_err(resize_error)?;
        let dsv = backend
            .create_depth_stencil_view(device, &depth)
            .map_err(resize_error)?;

        self.targets = Some(RenderTargets {
            dsv,
            depth,
            rtv,
            back,
        });
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Submit the back buffer, immediately or synchronized with the vblank
    pub fn present(&mut self, backend: &mut B, device: &B::Device, vsync: bool) -> GfxResult<()> {
        let targets_ready = self.targets.is_some();
        match self.chain.as_mut() {
            Some(chain) if targets_ready => backend.present(device, chain, vsync),
            _ => Err(GfxError::PresentFailed(
                "swapchain is not ready".to_string(),
            )),
        }
    }

    /// Release all resources and the chain object.
    ///
    /// A chain in fullscreen exclusive mode is switched back to windowed
    /// first; releasing while exclusive is unsafe on the underlying
    /// platform. Destroying an already torn-down swapchain is a no-op.
    pub fn destroy(&mut self, backend: &mut B) {
        if let Some(chain) = self.chain.as_mut() {
            if self.fullscreen {
                backend.exit_fullscreen(chain);
                self.fullscreen = false;
            }
        }
        drop(self.targets.take());
        drop(self.chain.take());
    }

    /// Whether the chain and all four resources are present
    pub fn is_ready(&self) -> bool {
        self.chain.is_some() && self.targets.is_some()
    }

    /// Current buffer width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current buffer height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The resource group, when the swapchain is ready
    pub fn targets(&self) -> Option<&RenderTargets<B>> {
        self.targets.as_ref()
    }
}

fn view_error(err: GfxError) -> GfxError {
    match err {
        e @ GfxError::ViewCreationFailed(_) => e,
        other => GfxError::ViewCreationFailed(other.to_string()),
    }
}

fn resize_error(err: GfxError) -> GfxError {
    match err {
        e @ GfxError::ResizeFailed(_) => e,
        other => GfxError::ResizeFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::sim::{SimBackend, SimWindow};
    use crate::gfx::tier::CapabilityTier;

    fn desc(width: u32, height: u32) -> ChainDesc {
        ChainDesc {
            width,
            height,
            refresh_rate: 60,
            fullscreen: false,
            vsync: true,
        }
    }

    fn open_device(backend: &mut SimBackend) -> (crate::gfx::sim::SimDevice, crate::gfx::sim::SimContext) {
        let (device, context, _tier) = backend
            .create_device(0, &[CapabilityTier::Tier11_0], false)
            .expect("device");
        (device, context)
    }

    #[test]
    fn create_populates_all_four_resources() {
        let mut backend = SimBackend::new();
        let (device, _context) = open_device(&mut backend);
        let swapchain =
            Swapchain::create(&mut backend, &device, SimWindow::new(1280, 720), &desc(1024, 768))
                .expect("swapchain");
        assert!(swapchain.is_ready());
        assert_eq!((swapchain.width(), swapchain.height()), (1024, 768));
    }

    #[test]
    fn zero_size_derives_from_window_client_area() {
        let mut backend = SimBackend::new();
        let (device, _context) = open_device(&mut backend);
        let swapchain =
            Swapchain::create(&mut backend, &device, SimWindow::new(1280, 720), &desc(0, 0))
                .expect("swapchain");
        assert_eq!((swapchain.width(), swapchain.height()), (1280, 720));
    }

    #[test]
    fn failed_view_creation_releases_everything_acquired() {
        let mut backend = SimBackend::new();
        backend.fail.depth_buffer = true;
        let (device, _context) = open_device(&mut backend);
        let journal = backend.journal();
        journal.clear();

        let result =
            Swapchain::create(&mut backend, &device, SimWindow::new(1280, 720), &desc(800, 600));
        assert!(matches!(result, Err(GfxError::ViewCreationFailed(_))));

        // Reverse acquisition order: the view goes before the buffer it
        // views, the buffer before the chain.
        assert_eq!(
            journal.events(),
            vec![
                "chain.create 800x600 fullscreen=false vsync=true",
                "backbuffer.acquire 800x600",
                "rtv.create",
                "rtv.release",
                "backbuffer.release",
                "chain.release",
            ]
        );
    }

    #[test]
    fn resize_releases_in_mandated_order_before_chain_resize() {
        let mut backend = SimBackend::new();
        let (device, _context) = open_device(&mut backend);
        let mut swapchain =
            Swapchain::create(&mut backend, &device, SimWindow::new(1280, 720), &desc(1024, 768))
                .expect("swapchain");
        let journal = backend.journal();
        journal.clear();

        swapchain
            .resize(&mut backend, &device, 800, 600)
            .expect("resize");

        let events = journal.events();
        assert_eq!(
            &events[..5],
            &[
                "dsv.release",
                "depthbuffer.release",
                "rtv.release",
                "backbuffer.release",
                "chain.resize 800x600",
            ]
        );
        assert_eq!((swapchain.width(), swapchain.height()), (800, 600));
    }

    #[test]
    fn resize_dimensions_agree_across_all_resources() {
        let mut backend = SimBackend::new();
        let (device, _context) = open_device(&mut backend);
        let mut swapchain =
            Swapchain::create(&mut backend, &device, SimWindow::new(1280, 720), &desc(1024, 768))
                .expect("swapchain");
        swapchain
            .resize(&mut backend, &device, 640, 480)
            .expect("resize");

        let targets = swapchain.targets().expect("ready");
        assert_eq!(
            (targets.depth_buffer().width, targets.depth_buffer().height),
            (640, 480)
        );
        assert_eq!(
            (targets.back_buffer().width, targets.back_buffer().height),
            (640, 480)
        );
        assert_eq!(
            (
                targets.render_target_view().width,
                targets.render_target_view().height
            ),
            (640, 480)
        );
    }

    #[test]
    fn failed_resize_tears_down_and_present_reports_error() {
        let mut backend = SimBackend::new();
        let (device, _context) = open_device(&mut backend);
        let mut swapchain =
            Swapchain::create(&mut backend, &device, SimWindow::new(1280, 720), &desc(1024, 768))
                .expect("swapchain");

        backend.fail.resize = true;
        let result = swapchain.resize(&mut backend, &device, 800, 600);
        assert!(matches!(result, Err(GfxError::ResizeFailed(_))));
        assert!(!swapchain.is_ready());

        let result = swapchain.present(&mut backend, &device, true);
        assert!(matches!(result, Err(GfxError::PresentFailed(_))));

        // The caller may retry once the environment recovers.
        backend.fail.resize = false;
        swapchain
            .resize(&mut backend, &device, 800, 600)
            .expect("retry");
        assert!(swapchain.is_ready());
        swapchain
            .present(&mut backend, &device, true)
            .expect("present");
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut backend = SimBackend::new();
        let (device, _context) = open_device(&mut backend);
        let mut swapchain =
            Swapchain::create(&mut backend, &device, SimWindow::new(1280, 720), &desc(1024, 768))
                .expect("swapchain");

        swapchain.destroy(&mut backend);
        assert!(!swapchain.is_ready());

        let journal = backend.journal();
        journal.clear();
        swapchain.destroy(&mut backend);
        assert!(journal.events().is_empty());
    }

    #[test]
    fn fullscreen_chain_exits_exclusive_mode_before_release() {
        let mut backend = SimBackend::new();
        let (device, _context) = open_device(&mut backend);
        let fullscreen_desc = ChainDesc {
            fullscreen: true,
            ..desc(1024, 768)
        };
        let mut swapchain = Swapchain::create(
            &mut backend,
            &device,
            SimWindow::new(1280, 720),
            &fullscreen_desc,
        )
        .expect("swapchain");

        let journal = backend.journal();
        journal.clear();
        swapchain.destroy(&mut backend);

        let events = journal.events();
        assert_eq!(events[0], "chain.exit_fullscreen");
        let chain_release = events.iter().position(|e| e == "chain.release").unwrap();
        assert!(chain_release > 0);
    }

    #[test]
    fn present_records_vsync_policy() {
        let mut backend = SimBackend::new();
        let (device, _context) = open_device(&mut backend);
        let mut swapchain =
            Swapchain::create(&mut backend, &device, SimWindow::new(1280, 720), &desc(1024, 768))
                .expect("swapchain");
        let journal = backend.journal();
        journal.clear();

        swapchain
            .present(&mut backend, &device, false)
            .expect("present");
        assert_eq!(journal.events(), vec!["present vsync=false"]);
    }
}
