//! Client for the remote browser-automation backend
//!
//! Every operation the tool catalog performs is expressed as a [`BrowserCall`]
//! and sent through a [`BrowserBackend`]. [`HttpBackend`] talks to the real
//! REST API; tests use `testing::MockBackend`.

mod error;
mod http;
mod traits;
mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{BackendError, BackendResult};
pub use http::{HttpBackend, HttpBackendConfig};
pub use traits::{BrowserBackend, SharedBackend};
pub use types::{BackendResponse, BrowserCall, Coordinate, SessionConfiguration};
