//! Tool hosting for Conduit
//!
//! The [`ToolRegistry`] validates and dispatches invocations, the
//! [`SessionRegistry`] remembers which sessions carry a browser profile, and
//! [`normalize`] renders backend error collections. [`browser_tools`] builds
//! the registry holding the browser catalog.

mod browser;
mod error;
pub mod normalize;
mod registry;
mod session;
mod traits;
pub mod validate;

pub use browser::browser_tools;
pub use error::{RegistryError, ToolError};
pub use normalize::{normalize, ApiError};
pub use registry::ToolRegistry;
pub use session::{SessionMetadata, SessionRegistry};
pub use traits::{BoxedTool, FunctionTool, Tool, ToolFuture, ToolHandler};
