use crate::di::{Container, Injectable, Resolved};
use crate::error::Result;
use crate::provider::ServiceProvider;
use std::sync::Arc;

/// Builder for constructing a dependency injection container
///
/// Use this to configure and register services before building the final container.
/// Service providers are registered first and booted afterwards, in the order
/// they were added, so a provider's `boot` can rely on everything every
/// provider registered.
///
/// # Example
/// ```
/// use class_trait_booter::{ClassRegistry, ContainerBuilder, TraitBooterServiceProvider};
/// use std::sync::Arc;
///
/// struct Clock;
///
/// let container = ContainerBuilder::new()
///     .register(Clock)
///     .provider(TraitBooterServiceProvider::new(Arc::new(ClassRegistry::new())))
///     .build()
///     .unwrap();
///
/// assert!(container.contains::<Clock>());
/// ```
pub struct ContainerBuilder {
    container: Container,
    providers: Vec<Box<dyn ServiceProvider>>,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self {
            container: Container::new(),
            providers: Vec::new(),
        }
    }

    /// Register a service instance
    pub fn register<T: 'static + Send + Sync>(mut self, instance: T) -> Self {
        self.container.register(instance);
        self
    }

    /// Bind a type built anew on every resolve
    pub fn bind<T: Injectable>(mut self) -> Self {
        self.container.bind::<T>();
        self
    }

    /// Bind a type built once, on first resolve
    pub fn singleton<T: Injectable>(mut self) -> Self {
        self.container.singleton::<T>();
        self
    }

    /// Bind a trait to a concrete implementation
    ///
    /// This enables resolving `Arc<dyn Trait>` to the registered implementation.
    /// The implementation must have been registered first (or will be).
    pub fn bind_trait<Trait, Impl, F>(mut self, caster: F) -> Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        self.container.register_trait::<Trait, Impl, F>(caster);
        self
    }

    /// Subscribe to resolution events
    pub fn resolving<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Resolved<'_>, &Container) + 'static + Send + Sync,
    {
        self.container.resolving(callback);
        self
    }

    /// Add a service provider
    pub fn provider<P: ServiceProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Build the container, registering and then booting every provider
    pub fn build(self) -> Result<Container> {
        let Self {
            mut container,
            providers,
        } = self;

        for provider in &providers {
            tracing::debug!("Registering provider {}", provider.name());
            provider.register(&mut container)?;
        }
        for provider in &providers {
            tracing::debug!("Booting provider {}", provider.name());
            provider.boot(&mut container)?;
        }

        Ok(container)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Clock;

    struct Recorder {
        log: Arc<Mutex<Vec<String>>>,
        name: &'static str,
    }

    impl ServiceProvider for Recorder {
        fn register(&self, _container: &mut Container) -> Result<()> {
            self.log.lock().unwrap().push(format!("register {}", self.name));
            Ok(())
        }

        fn boot(&self, _container: &mut Container) -> Result<()> {
            self.log.lock().unwrap().push(format!("boot {}", self.name));
            Ok(())
        }
    }

    #[test]
    fn test_providers_register_before_boot() {
        let log = Arc::new(Mutex::new(Vec::new()));
        ContainerBuilder::new()
            .provider(Recorder { log: Arc::clone(&log), name: "a" })
            .provider(Recorder { log: Arc::clone(&log), name: "b" })
            .build()
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["register a", "register b", "boot a", "boot b"]
        );
    }

    #[test]
    fn test_build_keeps_registrations() {
        let container = ContainerBuilder::new().register(Clock).build().unwrap();
        assert!(container.resolve::<Clock>().is_ok());
    }
}
