//! Public types for the Kontragent API.

mod page;
mod query;

pub use page::Page;
pub use query::{BranchType, EntityType, FindByIdRequest, LookupQuery, MAX_COUNT, PartyStatus};

/// One registry suggestion (`{"value": ..., "data": {...}}`), kept as an
/// untyped JSON tree. The formatter reads it through optional paths only.
pub type Record = serde_json::Value;
