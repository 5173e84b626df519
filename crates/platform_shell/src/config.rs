//! Initialization parameters for session construction
//!
//! Consumed, not owned, by the core: a session copies what it needs out of
//! [`InitParams`] during construction. A width or height of zero requests the
//! default client size.

use serde::{Deserialize, Serialize};

use crate::gfx::tier::CapabilityTier;

/// Default client width when the requested width is zero
pub const DEFAULT_WIDTH: u32 = 1280;
/// Default client height when the requested height is zero
pub const DEFAULT_HEIGHT: u32 = 720;

bitflags::bitflags! {
    /// Independently toggleable initialization bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct GfxFlags: u32 {
        /// Enable debug instrumentation on device creation
        const DEBUG = 1 << 0;
        /// Create the presentation chain in fullscreen exclusive mode
        const FULLSCREEN = 1 << 1;
        /// Synchronize presents with the vertical blank
        const VSYNC = 1 << 2;
    }
}

/// Session initialization parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitParams {
    /// Requested client width, 0 = [`DEFAULT_WIDTH`]
    pub width: u32,
    /// Requested client height, 0 = [`DEFAULT_HEIGHT`]
    pub height: u32,
    /// Ordinal of the graphics adapter to open
    pub adapter_ordinal: u32,
    /// Requested capability tier; [`CapabilityTier::Unknown`] negotiates the
    /// highest supported tier instead
    pub tier: CapabilityTier,
    /// Target refresh rate in Hz
    pub refresh_rate: u32,
    /// Debug / fullscreen / vsync bits
    pub flags: GfxFlags,
}

impl InitParams {
    /// Create parameters with library defaults
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            adapter_ordinal: 0,
            tier: CapabilityTier::Unknown,
            refresh_rate: 60,
            flags: GfxFlags::VSYNC,
        }
    }

    /// Set the requested client size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Select the adapter to open by ordinal
    pub fn with_adapter(mut self, ordinal: u32) -> Self {
        self.adapter_ordinal = ordinal;
        self
    }

    /// Request an exact capability tier (no fallback is attempted)
    pub fn with_tier(mut self, tier: CapabilityTier) -> Self {
        self.tier = tier;
        self
    }

    /// Set the target refresh rate
    pub fn with_refresh_rate(mut self, hz: u32) -> Self {
        self.refresh_rate = hz;
        self
    }

    /// Replace the flag word
    pub fn with_flags(mut self, flags: GfxFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The client size with zero values replaced by defaults
    pub fn resolved_size(&self) -> (u32, u32) {
        let width = if self.width == 0 { DEFAULT_WIDTH } else { self.width };
        let height = if self.height == 0 { DEFAULT_HEIGHT } else { self.height };
        (width, height)
    }

    /// Validate the parameter set
    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_rate == 0 {
            return Err("refresh rate must be at least 1 Hz".to_string());
        }
        Ok(())
    }
}

impl Default for InitParams {
    fn default() -> Self {
        Self::new()
    }
}
