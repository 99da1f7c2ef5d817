//! Port definitions for the platform boundary
//!
//! These traits separate the daemon's control loops from the OS-specific
//! adapters that synthesize input events and read idle timers.

pub mod idle;
pub mod input;

pub use idle::IdlePort;
pub use input::InputPort;
