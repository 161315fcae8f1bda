//! Domain model for the MAGERIT risk catalog.
//!
//! Entities are created from validated construction requests and mutated
//! only through domain operations; derived fields (criticality, inherent
//! and residual risk) are owned by the computation engine and are never
//! edited directly.

pub mod asset;
pub mod risk;
pub mod safeguard;
pub mod snapshot;
pub mod threat;
pub mod vulnerability;
