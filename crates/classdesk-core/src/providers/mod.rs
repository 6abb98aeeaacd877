//! Remote model clients
//!
//! The model is an opaque text-completion service: one prompt in, one
//! generated text out. `HttpModelClient` talks to a real endpoint;
//! `MockModelClient` is kept for testing.

mod traits;
mod error;
mod http;
mod mock;

pub use traits::{ModelClient, GenerationOptions};
pub use error::{ProviderError, ProviderResult, GENERIC_FAILURE_MESSAGE};
pub use http::{HttpModelClient, DEFAULT_REQUEST_TIMEOUT};
pub use mock::{MockModelClient, MockMode};
