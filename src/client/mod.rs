// ABOUTME: Console client module: sessions, the command driver trait, wizards and error classification
// ABOUTME: Re-exports everything a caller needs to open a session and drive the resource managers

//! Console Client Module
//!
//! * **Native async traits** - `async fn` in traits, no async_trait dependency
//! * **Explicit prompt state** - every exchange ends on a known prompt and moves
//!   the session between standard and wizard context
//! * **Ordered reply patterns** - each call site lists its expected replies,
//!   first match wins
//! * **One session per operation** - acquired, used and released, never pooled
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jcli::client::{Session, SessionConfig};
//! use jcli::resources::{MtRouterManager, NewRouter};
//!
//! # async fn example() -> Result<(), jcli::client::JcliError> {
//! let config = SessionConfig::from_env()?;
//!
//! let route = NewRouter::new("DefaultRoute")
//!     .with_smpp_connector("smsc-eu")
//!     .with_rate("0.0");
//!
//! let created = Session::scoped(&config, async |session| {
//!     session.create_mt_route(&route).await
//! })
//! .await?;
//! println!("default route now sends through {:?}", created.connectors);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! * [`CommandDriver`] - send one line, wait for one of an ordered list of replies
//! * [`Session`] - the live telnet implementation of [`CommandDriver`]
//! * [`wizard`] - multi-step `-a`/`-u` dialogs on top of any driver
//! * [`classify`] - turns a matched reply into success, not-found or failure
//! * [`JcliError`] - the single error type, with [`ErrorCategory`] for boundaries

pub mod classify;
pub mod error;
pub mod session;
pub mod traits;
pub mod types;
pub mod wizard;

pub use classify::{Context, Outcome, classify};
pub use error::{ErrorCategory, JcliError, JcliResult};
pub use session::Session;
pub use traits::{CommandDriver, PromptState};
pub use types::{Credentials, SessionConfig};
pub use wizard::WizardStep;
