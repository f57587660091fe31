//! Trait Booter
//!
//! Hooks into the container's resolution events and runs the initializer of
//! every behavior unit a resolved object's class composes.
//!
//! # Flow
//!
//! ```text
//! Container builds a value
//!    ↓
//! resolving callback ── scalar? ──> ignore
//!    ↓
//! ClassRegistry lookup ── unknown type? ──> nothing to boot
//!    ↓
//! lineage: class, parent, grandparent, ...
//!    ↓
//! for each unit (own first, then inherited):
//!    key = <unit>::<prefix><ShortName>
//!    recorded? ──> skip
//!    no initializer in lineage? ──> skip
//!    record key, Container::call(initializer)
//!    ↓
//! any error ──> tracing::error!, resolution carries on
//! ```

mod error;
mod hook;
mod record;

pub use error::BootError;
pub use hook::TraitBooter;
pub use record::InitializationRecord;
