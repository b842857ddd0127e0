//! # API Module
//!
//! HTTP endpoints of the local progress server started by `export --serve`.
//! They let an external UI follow a running export and stop it.
//!
//! ## Endpoints
//!
//! - [`health`] - Returns application status and version information.
//! - [`progress`] - Returns the current progress snapshot as JSON. Meant to be
//!   polled, once per second is enough.
//! - [`cancel`] - Raises the cancel signal of the running export. Accepts GET
//!   and POST, and is idempotent.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use trackport::server::{ServerState, router};
//!
//! let app = router(ServerState { progress, cancel });
//! ```
//!
//! Handlers only ever read the progress state; the orchestrator is its sole
//! writer.

mod cancel;
mod health;
mod progress;

pub use cancel::cancel;
pub use health::health;
pub use progress::progress;
