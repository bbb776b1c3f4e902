//! Display driver implementations.
//!
//! - [`serial`] – the production SPE driver over a real serial port.
//! - [`mock`] – an in-memory recording driver for tests.

pub mod mock;
pub mod serial;
