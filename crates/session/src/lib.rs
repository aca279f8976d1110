//! Session layer for php.ini settings
//!
//! [`SettingsSession`] drives a synchronous [`phpmanager_core::ConfigService`]
//! from async code: service calls run on the blocking pool, reads are served
//! from the last good snapshot, mutations are serialized, and late fetch
//! results are discarded by generation.
//!
//! # Example
//!
//! ```rust
//! use phpmanager_core::{MemoryService, Setting};
//! use phpmanager_session::SettingsSession;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = SettingsSession::open(MemoryService::from_text("[PHP]\nengine = On\n")).await?;
//! session
//!     .add_or_update_batch(vec![Setting::new("engine", "Off", "PHP")])
//!     .await?;
//! assert_eq!(session.snapshot().find_by_name("engine").map(|e| e.value()), Some("Off"));
//! # Ok(())
//! # }
//! ```

mod error;
mod session;

pub use error::{SessionError, SessionResult};
pub use session::{FetchTicket, SettingsSession};
