//! Wakeguard platform adapters
//!
//! Implements the core's ports against the real OS: input simulation via
//! `enigo` and idle-time queries with a per-platform backend.

pub mod idle;
pub mod input;

pub use idle::SystemIdle;
pub use input::EnigoInput;
