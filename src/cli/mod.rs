//! # CLI Module
//!
//! User-facing commands of trackport. Each command builds a
//! [`crate::service::ServiceClient`] from the configuration, delegates to the
//! service and acquisition layers and presents the result.
//!
//! ## Commands
//!
//! - [`auth`] - Runs the authorization handoff and waits for it to complete
//! - [`status`] - Shows whether the service has credentials and is authorized
//! - [`playlists`] - Lists the playlists of the authorized account
//! - [`tracks`] - Lists the tracks a playlist URL resolves to
//! - [`export`] - Downloads every track of a playlist into a directory
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Acquisition Layer (Orchestrator, Strategies, Progress)
//!     ↓
//! Service Layer (Resolution Service client)
//!     ↓
//! Network Layer (HTTP Requests)
//! ```
//!
//! ## Progress and cancellation
//!
//! `export` renders a progress bar from the shared progress snapshot, polled
//! once per second. Ctrl-C raises the cancel signal: the track in flight is
//! abandoned and the remaining tracks are skipped. With `--serve` the same
//! snapshot and cancel signal are exposed over HTTP.
//!
//! ## Usage Patterns
//!
//! ```bash
//! trackport status
//! trackport auth
//! trackport playlists
//! trackport tracks https://open.spotify.com/playlist/...
//! trackport export https://open.spotify.com/playlist/... --dest ~/Music/export
//! trackport export https://open.spotify.com/playlist/... --strategy stream-track --strategy stream-track-alt
//! ```

mod auth;
mod export;
mod playlists;
mod status;
mod tracks;

pub use auth::auth;
pub use export::export;
pub use export::status_text;
pub use playlists::playlists;
pub use status::status;
pub use tracks::tracks;
