use crate::di::Container;
use crate::error::Result;

/// Trait for types the container can build on demand
///
/// This trait is typically implemented automatically via the `#[derive(Injectable)]` macro.
/// Types implementing it can be bound with [`Container::bind`],
/// [`Container::singleton`] or built ad hoc with [`Container::make`]; every
/// such build is announced to the container's `resolving` callbacks.
///
/// # Example
/// ```
/// use class_trait_booter::{Container, Injectable, Result};
/// use std::sync::Arc;
///
/// struct Clock;
///
/// struct Order {
///     clock: Arc<Clock>,
/// }
///
/// impl Injectable for Order {
///     fn inject(container: &Container) -> Result<Self> {
///         Ok(Self {
///             clock: container.resolve::<Clock>()?,
///         })
///     }
/// }
///
/// let mut container = Container::new();
/// container.register(Clock);
/// let order = container.make::<Order>().unwrap();
/// # let _ = &order.clock;
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Create an instance by resolving dependencies from the container
    ///
    /// # Errors
    /// Returns an error if any required dependency is not found in the container.
    fn inject(container: &Container) -> Result<Self>;
}
