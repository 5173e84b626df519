//! Display-mode inventory
//!
//! Enumerates adapters and the display modes of each attached monitor and
//! serializes the result as JSON for launcher and settings tooling. Modes
//! whose refresh rate is not a whole number of hertz are dropped from the
//! inventory.

use serde::{Deserialize, Serialize};

use crate::gfx::backend::GfxBackend;
use crate::gfx::GfxResult;
use crate::window::shell::MessagePump;

/// One display mode of a monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeRecord {
    /// Horizontal resolution in pixels
    pub width: u32,
    /// Vertical resolution in pixels
    pub height: u32,
    /// Whole-hertz refresh rate
    #[serde(rename = "refresh-rate")]
    pub refresh_rate: u32,
}

/// A display mode as reported by the window system, with the refresh rate
/// expressed as a rational number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RationalMode {
    pub width: u32,
    pub height: u32,
    pub numerator: u32,
    pub denominator: u32,
}

impl RationalMode {
    /// The inventory form of this mode, or `None` when the refresh rate is
    /// fractional.
    pub fn to_record(self) -> Option<ModeRecord> {
        if self.denominator != 1 {
            return None;
        }
        Some(ModeRecord {
            width: self.width,
            height: self.height,
            refresh_rate: self.numerator,
        })
    }
}

/// The modes of one monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Zero-based monitor index
    pub id: u32,
    /// Whole-hertz modes of this monitor
    pub monitors: Vec<ModeRecord>,
}

impl OutputRecord {
    /// Build a record from raw modes, dropping fractional refresh rates
    pub fn from_modes(id: u32, modes: impl IntoIterator<Item = RationalMode>) -> Self {
        Self {
            id,
            monitors: modes.into_iter().filter_map(RationalMode::to_record).collect(),
        }
    }
}

/// One graphics adapter and the monitors attached to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterRecord {
    /// Adapter name as reported by the driver
    pub name: String,
    /// Zero-based adapter ordinal
    pub id: u32,
    /// Monitors attached to this adapter
    pub outputs: Vec<OutputRecord>,
}

/// The full adapter and display-mode inventory
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayInventory {
    /// All adapters present on the system
    pub adapters: Vec<AdapterRecord>,
}

impl DisplayInventory {
    /// Serialize the inventory as a JSON document: a top-level array of
    /// adapter objects.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.adapters)
    }
}

/// Combine adapter descriptors with the window system's monitor inventory.
///
/// The window system does not report which adapter drives which monitor, so
/// every monitor is listed under the primary adapter.
pub fn build_inventory(mut adapters: Vec<AdapterRecord>, outputs: Vec<OutputRecord>) -> DisplayInventory {
    if let Some(primary) = adapters.first_mut() {
        primary.outputs = outputs;
    }
    DisplayInventory { adapters }
}

/// Query the adapter and monitor inventory of a live backend and pump
pub fn query<B: GfxBackend, P: MessagePump>(
    backend: &mut B,
    pump: &mut P,
) -> GfxResult<DisplayInventory> {
    let adapters = backend.adapter_records()?;
    let outputs = pump.outputs();
    Ok(build_inventory(adapters, outputs))
}
