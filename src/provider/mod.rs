use crate::booter::{InitializationRecord, TraitBooter};
use crate::class::ClassRegistry;
use crate::config::{BooterConfig, ConfigService};
use crate::di::Container;
use crate::error::Result;
use std::sync::Arc;

/// Trait for units of container setup
///
/// `register` only binds services. `boot` runs once every provider has
/// registered, and is where a provider may resolve services or subscribe to
/// container events.
///
/// # Example
/// ```
/// use class_trait_booter::{Container, Result, ServiceProvider};
///
/// struct Clock;
///
/// struct ClockProvider;
///
/// impl ServiceProvider for ClockProvider {
///     fn register(&self, container: &mut Container) -> Result<()> {
///         container.register(Clock);
///         Ok(())
///     }
/// }
/// ```
pub trait ServiceProvider: Send + Sync {
    /// Bind this provider's services
    fn register(&self, container: &mut Container) -> Result<()>;

    /// Finish setup once all providers are registered
    fn boot(&self, _container: &mut Container) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Installs a [`TraitBooter`] into the container.
///
/// Registers the class registry and the initialization record as services,
/// so initializers can inject them, and attaches the booter to resolution
/// events on boot. Without an explicit config the booter reads a
/// [`ConfigService`] from the container if one is registered.
pub struct TraitBooterServiceProvider {
    registry: Arc<ClassRegistry>,
    record: Arc<InitializationRecord>,
    config: Option<BooterConfig>,
}

impl TraitBooterServiceProvider {
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        Self {
            registry,
            record: Arc::new(InitializationRecord::new()),
            config: None,
        }
    }

    /// Share an existing record instead of starting an empty one.
    pub fn with_record(mut self, record: Arc<InitializationRecord>) -> Self {
        self.record = record;
        self
    }

    pub fn with_config(mut self, config: BooterConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn record(&self) -> &Arc<InitializationRecord> {
        &self.record
    }

    fn resolve_config(&self, container: &Container) -> BooterConfig {
        if let Some(config) = &self.config {
            return config.clone();
        }
        match container.resolve::<ConfigService>() {
            Ok(service) => BooterConfig::from_config(&service),
            Err(_) => BooterConfig::default(),
        }
    }
}

impl ServiceProvider for TraitBooterServiceProvider {
    fn register(&self, container: &mut Container) -> Result<()> {
        container.register_arc(Arc::clone(&self.registry));
        container.register_arc(Arc::clone(&self.record));
        Ok(())
    }

    fn boot(&self, container: &mut Container) -> Result<()> {
        let config = self.resolve_config(container);
        if !config.enabled {
            tracing::info!("Trait booter disabled by configuration");
            return Ok(());
        }

        let booter = TraitBooter::with_config(
            Arc::clone(&self.registry),
            Arc::clone(&self.record),
            config,
        );
        Arc::new(booter).attach(container);

        tracing::info!(
            "Trait booter attached ({} classes registered)",
            self.registry.len()
        );
        Ok(())
    }
}
