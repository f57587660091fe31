mod builder;
mod container;
mod extractor;
mod injectable;
mod method;
mod resolved;

pub use builder::ContainerBuilder;
pub use container::Container;
pub use extractor::{FromContainer, Inject, InjectTrait};
pub use injectable::Injectable;
pub use method::{CallError, IntoOutcome, Method};
pub use resolved::{Resolved, ValueKind};
