//! Simulated jump-host scan: scripted banners, then log extraction, then
//! review before anything reaches the inventory.

pub mod clock;
pub mod script;
pub mod workflow;

#[cfg(test)]
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use workflow::{ScanError, ScanPhase, ScanSnapshot, ScanWorkflow};
