//! Class descriptors
//!
//! Rust has neither runtime reflection nor inheritance, so the shape the
//! booter walks is declared up front: which behavior units a class composes,
//! which class it extends (by embedding), and which initializers it exposes.
//!
//! ```text
//! Order ──uses──> Trackable, Cacheable
//!   │
//!   └─extends──> Model ──uses──> HasTimestamps
//! ```

mod descriptor;
mod registry;
mod unit;

pub use descriptor::{ClassBuilder, ClassDescriptor, ParentLink};
pub(crate) use descriptor::ErasedMethod;
pub use registry::ClassRegistry;
pub use unit::BehaviorUnit;
