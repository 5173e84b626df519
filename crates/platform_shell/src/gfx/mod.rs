//! Graphics device and swapchain lifecycle
//!
//! The only state with real invariants in this crate: resource acquisition
//! order, safe re-creation on resize, safe teardown order, and negotiated
//! capability fallback. Everything platform-specific sits behind the
//! [`backend::GfxBackend`] seam.

pub mod backend;
pub mod negotiate;
pub mod sim;
pub mod swapchain;
pub mod tier;
pub mod vulkan;

use thiserror::Error;

/// Graphics subsystem errors
#[derive(Error, Debug)]
pub enum GfxError {
    /// The requested adapter ordinal is out of range
    #[error("adapter {ordinal} not found")]
    AdapterNotFound {
        /// Ordinal that was requested
        ordinal: u32,
    },

    /// The underlying device creation call reported failure; causes
    /// (driver rejection, tier exhausted, out of memory) are not
    /// distinguished further
    #[error("device creation failed: {0}")]
    DeviceCreationFailed(String),

    /// Presentation chain creation failed
    #[error("swapchain creation failed: {0}")]
    SwapchainCreationFailed(String),

    /// Back-buffer fetch or view construction failed
    #[error("view creation failed: {0}")]
    ViewCreationFailed(String),

    /// An in-place resize sub-step failed; the swapchain is torn down
    #[error("swapchain resize failed: {0}")]
    ResizeFailed(String),

    /// Present was refused, or attempted on a torn-down swapchain
    #[error("present failed: {0}")]
    PresentFailed(String),
}

/// Result type for graphics operations
pub type GfxResult<T> = Result<T, GfxError>;
