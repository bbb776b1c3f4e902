//! Infrastructure layer for the command-line tool.
//!
//! Contains the OS-facing adapters: the serial display driver, the Ctrl-C
//! handler, and the config file loader.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `ulcd_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`display`** – `SpeDriver`, which implements `DisplayDriver` by speaking
//!   the SPE protocol over a `serialport` port, and `SerialConnector`, which
//!   opens it.  A recording `MockDisplay` is also provided for tests.
//!
//! - **`interrupt`** – `CtrlCInterrupts`, a tokio signal listener that cancels
//!   the interactive loop.  `MockInterrupts` stands in for it in tests.
//!
//! - **`config`** – the optional TOML config file and the merged run
//!   `Settings`.

pub mod config;
pub mod display;
pub mod interrupt;
