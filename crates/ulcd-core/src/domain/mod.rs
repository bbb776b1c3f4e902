//! Domain value types for uLCD display modules.
//!
//! Everything in here is plain data: no I/O, no clocks, no global state.
//! Code in outer layers (the driver, the command dispatcher) depends on these
//! types, but they never depend on those layers.

/// Colours and the version triple reported by the module.
pub mod device;

/// Serial link parameters (supported baud rates).
pub mod link;

/// Touch points and touch events.
pub mod touch;
