//! Configuration gate
//!
//! Blocks tool access until the session holds a valid credential pair.
//!
//! ```text
//!                 submit(valid) / refresh(authoritative)
//!  UNCONFIGURED ───────────────────────────────────────▶ CONFIGURED
//!       ▲                                                     │
//!       └──────────────────────── reset ──────────────────────┘
//! ```

mod configuration_gate;
mod error;

pub use configuration_gate::{ConfigurationGate, GateStatus};
pub use error::GateError;
