use crate::di::Container;
use crate::error::{ContainerError, Result};
use std::sync::Arc;

/// A parameter the container can supply when it invokes a method.
///
/// This is the container-side counterpart of an axum extractor: every
/// parameter of a method passed to [`Container::call`] after the receiver must
/// implement it.
pub trait FromContainer: Sized {
    fn from_container(container: &Container) -> Result<Self>;
}

/// Extractor for a concrete service
///
/// # Example
/// ```
/// use class_trait_booter::{Container, Inject};
///
/// struct Clock {
///     now: u64,
/// }
///
/// struct Order;
///
/// let mut container = Container::new();
/// container.register(Clock { now: 42 });
///
/// container
///     .call(&Order, &|_order: &Order, Inject(clock): Inject<Clock>| {
///         assert_eq!(clock.now, 42);
///     })
///     .unwrap();
/// ```
pub struct Inject<T>(pub Arc<T>);

impl<T> FromContainer for Inject<T>
where
    T: 'static + Send + Sync,
{
    fn from_container(container: &Container) -> Result<Self> {
        container.resolve::<T>().map(Inject)
    }
}

/// Deref implementation for convenient access to the inner service
impl<T> std::ops::Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Clone implementation to allow sharing the Arc
impl<T> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Inject(Arc::clone(&self.0))
    }
}

/// Extractor for a trait object bound with [`Container::register_trait`]
pub struct InjectTrait<T: ?Sized>(pub Arc<T>);

impl<T> FromContainer for InjectTrait<T>
where
    T: ?Sized + 'static + Send + Sync,
{
    fn from_container(container: &Container) -> Result<Self> {
        container.resolve_trait::<T>().map(InjectTrait)
    }
}

impl<T: ?Sized> std::ops::Deref for InjectTrait<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Optional dependency: a missing registration yields `None`, any other
/// failure still propagates.
impl<A: FromContainer> FromContainer for Option<A> {
    fn from_container(container: &Container) -> Result<Self> {
        match A::from_container(container) {
            Ok(value) => Ok(Some(value)),
            Err(ContainerError::DependencyNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// The container itself, as a shared handle.
impl FromContainer for Container {
    fn from_container(container: &Container) -> Result<Self> {
        Ok(container.clone())
    }
}
