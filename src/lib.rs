//! Kontragent - counterparty lookup by INN/OGRN
//!
//! This crate looks up Russian companies and individual entrepreneurs in the
//! DaData `findById/party` registry, renders the record as paginated
//! HTML-escaped text and splits it into transport-sized messages. An AI mode
//! hands the identifier to an OpenAI model that queries the registry through
//! the DaData MCP tool server.
//!
//! The chat transport itself is not part of the crate: it passes user text
//! in and sends the returned strings out.
//!
//! # Example
//!
//! ```rust,no_run
//! use kontragent::{Kontragent, Page};
//!
//! #[tokio::main]
//! async fn main() -> kontragent::Result<()> {
//!     // DADATA_API_KEY is read from the environment
//!     let service = Kontragent::builder().build()?;
//!
//!     let report = service.check("7707083893, 500100732259").await;
//!     if let Some((_, record)) = report.first_found() {
//!         for message in service.render_page(record, Page::Card) {
//!             println!("{message}");
//!         }
//!     }
//!     println!("{}", report.totals_line());
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod cache;
pub mod chunk;
pub mod config;
pub mod error;
pub mod format;
pub mod lookup;
pub mod providers;
pub mod service;
pub mod session;
pub mod telemetry;
pub mod types;
pub mod validate;

// Re-export main types at crate root
pub use batch::{BatchOptions, BatchReport, Outcome};
pub use cache::{CacheConfig, CacheRegistry, CacheSettings, TtlCache};
pub use config::{Config, Secrets};
pub use error::{KontragentError, Result};
pub use format::{PartyStateTable, Renderer, render, render_with};
pub use lookup::{AnalysisClient, LookupClient};
pub use providers::{AnalysisProvider, PartyProvider};
pub use service::{Kontragent, KontragentBuilder, KontragentService};
pub use session::ConversationState;
pub use types::{BranchType, EntityType, LookupQuery, Page, PartyStatus, Record};
pub use validate::{IdKind, Rejection, Strictness, Validation};

/// Crate version, for `--version` output.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
