//! Capability negotiation
//!
//! Opens a device on a chosen adapter at the highest feature tier it
//! supports, or at exactly the tier the caller asked for. The two request
//! modes behave differently on purpose: an unspecified request walks the
//! descending fallback list, while an explicit request tries that single
//! tier and fails rather than silently falling back.

use crate::gfx::{backend::GfxBackend, tier::CapabilityTier, GfxError, GfxResult};

/// An opened device with its immediate context and resolved tier.
///
/// Ownership of both handles transfers to the caller; dropping this value
/// releases them.
pub struct NegotiatedDevice<B: GfxBackend> {
    /// The open device
    pub device: B::Device,
    /// The device's immediate execution context
    pub context: B::Context,
    /// Tier the device actually supports, possibly lower than requested
    pub tier: CapabilityTier,
}

/// Negotiate and open a device.
///
/// `requested` = [`CapabilityTier::Unknown`] tries 11.0, 10.1, 10.0 in
/// order and accepts the highest supported; any other value is tried alone
/// with no fallback. `debug` forwards the debug-instrumentation flag to
/// device creation.
pub fn negotiate<B: GfxBackend>(
    backend: &mut B,
    adapter_ordinal: u32,
    requested: CapabilityTier,
    debug: bool,
) -> GfxResult<NegotiatedDevice<B>> {
    let adapters = backend.adapters()?;
    if adapter_ordinal as usize >= adapters.len() {
        return Err(GfxError::AdapterNotFound {
            ordinal: adapter_ordinal,
        });
    }
    let adapter = &adapters[adapter_ordinal as usize];
    log::info!(
        "negotiating device on adapter {} ({}), requested tier {}",
        adapter.ordinal,
        adapter.name,
        requested
    );

    let candidates: &[CapabilityTier] = if requested.is_unspecified() {
        &CapabilityTier::FALLBACK
    } else {
        std::slice::from_ref(&requested)
    };

    let (device, context, tier) = backend.create_device(adapter_ordinal, candidates, debug)?;
    log::info!("device opened at tier {}", tier);

    Ok(NegotiatedDevice {
        device,
        context,
        tier,
    })
}
