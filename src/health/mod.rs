//! Health Module
//!
//! Probing of interchangeable upstream backends and the per-capability
//! failover state that request handlers read.

mod probe;
mod tracker;
mod transport;

pub use probe::{Capability, ProbeQuery, ProbeReport};
pub use tracker::{
    CandidatePair, CapabilitySnapshot, CheckOutcome, Endpoint, EndpointSlot, TrackerSettings,
    UpstreamCapabilityState, UpstreamHealthTracker,
};
pub use transport::{HttpProbeTransport, ProbeTransport};
