//! The resolution hook

use super::{BootError, InitializationRecord};
use crate::class::{BehaviorUnit, ClassDescriptor, ClassRegistry, ErasedMethod};
use crate::config::BooterConfig;
use crate::di::{CallError, Container, Resolved};
use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Runs behavior-unit initializers for objects the container resolves.
///
/// For every resolved object the booter collects the units its class and
/// all of its ancestors compose, derives `<prefix><ShortName>` for each,
/// and calls that initializer through the container if the class (or an
/// ancestor) exposes one. Each `<unit>::<method>` key runs at most once for
/// the lifetime of the [`InitializationRecord`].
///
/// # Example
///
/// ```
/// use class_trait_booter::{
///     BehaviorUnit, ClassDescriptor, ClassRegistry, Container, InitializationRecord,
///     Injectable, Result, TraitBooter,
/// };
/// use std::sync::Arc;
///
/// struct Order;
///
/// impl Injectable for Order {
///     fn inject(_: &Container) -> Result<Self> {
///         Ok(Order)
///     }
/// }
///
/// let trackable = BehaviorUnit::new("app::Trackable");
/// let registry = Arc::new(ClassRegistry::new());
/// registry.register(
///     ClassDescriptor::builder::<Order>()
///         .uses(trackable.clone())
///         .initializer(&trackable, |_: &Order| {})
///         .build(),
/// );
///
/// let record = Arc::new(InitializationRecord::new());
/// let mut container = Container::new();
/// Arc::new(TraitBooter::new(registry, Arc::clone(&record))).attach(&mut container);
///
/// container.make::<Order>().unwrap();
/// assert!(record.contains("app::Trackable::initializeTrackable"));
/// ```
pub struct TraitBooter {
    registry: Arc<ClassRegistry>,
    record: Arc<InitializationRecord>,
    config: BooterConfig,
}

impl TraitBooter {
    pub fn new(registry: Arc<ClassRegistry>, record: Arc<InitializationRecord>) -> Self {
        Self::with_config(registry, record, BooterConfig::default())
    }

    pub fn with_config(
        registry: Arc<ClassRegistry>,
        record: Arc<InitializationRecord>,
        config: BooterConfig,
    ) -> Self {
        Self {
            registry,
            record,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    pub fn record(&self) -> &Arc<InitializationRecord> {
        &self.record
    }

    pub fn config(&self) -> &BooterConfig {
        &self.config
    }

    /// Subscribe to the container's resolution events.
    pub fn attach(self: Arc<Self>, container: &mut Container) {
        container.resolving(move |resolved, container| self.handle(resolved, container));
    }

    /// Resolution callback. Never fails: errors are logged and dropped.
    pub fn handle(&self, resolved: &Resolved<'_>, container: &Container) {
        if !self.config.enabled || !resolved.is_object() {
            return;
        }

        if let Err(e) = self.boot_object(resolved, container) {
            tracing::error!("Trait initialization error: {}", e);
        }
    }

    /// Run the pending initializers of one object.
    ///
    /// Returns how many initializers ran. Stops at the first failure; units
    /// after it stay unrecorded and are tried again on a later resolution.
    pub fn boot_object(
        &self,
        resolved: &Resolved<'_>,
        container: &Container,
    ) -> Result<usize, BootError> {
        let Some(class) = self.registry.get(resolved.type_id()) else {
            return Ok(0);
        };

        let lineage = self.lineage(class)?;
        let views = project_lineage(&lineage, resolved.as_any())?;
        let mut booted = 0;

        for unit in collect_units(&lineage) {
            let method = unit.initializer_name(&self.config.method_prefix);
            let key = unit.dedup_key(&method);
            // Fast path only; `mark` below is the atomic claim.
            if self.record.contains(&key) {
                continue;
            }

            let Some((level, initializer)) = find_initializer(&lineage, &unit, &method) else {
                continue;
            };

            // Claimed before the call: a failing initializer is not retried,
            // and an initializer resolving its own class does not recurse.
            if !self.record.mark(key) {
                continue;
            }

            let owner = lineage[level].type_name();
            tracing::debug!("Initializing {} via {}::{}", unit, owner, method);
            self.invoke(owner, method, &initializer, views[level], container)?;
            booted += 1;
        }

        Ok(booted)
    }

    /// Units composed by the class registered for `type_id` and its
    /// ancestors, own units first. Unregistered types compose nothing.
    pub fn used_units(&self, type_id: TypeId) -> Result<Vec<BehaviorUnit>, BootError> {
        match self.registry.get(type_id) {
            Some(class) => Ok(collect_units(&self.lineage(class)?)),
            None => Ok(Vec::new()),
        }
    }

    /// The class followed by its parent, grandparent, and so on to the root.
    fn lineage(&self, class: Arc<ClassDescriptor>) -> Result<Vec<Arc<ClassDescriptor>>, BootError> {
        let mut seen = HashSet::from([class.type_id()]);
        let mut lineage = vec![class];

        loop {
            let current = &lineage[lineage.len() - 1];
            let Some(parent) = current.parent() else {
                break;
            };

            if !seen.insert(parent.type_id()) {
                return Err(BootError::InheritanceCycle {
                    class: current.type_name(),
                });
            }

            let next = self
                .registry
                .get(parent.type_id())
                .ok_or(BootError::ParentNotRegistered {
                    class: current.type_name(),
                    parent: parent.type_name(),
                })?;
            lineage.push(next);
        }

        Ok(lineage)
    }

    fn invoke(
        &self,
        class: &'static str,
        method: String,
        initializer: &ErasedMethod,
        target: &(dyn Any + Send + Sync),
        container: &Container,
    ) -> Result<(), BootError> {
        let outcome =
            match panic::catch_unwind(AssertUnwindSafe(|| initializer(target, container))) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    return Err(BootError::InitializerPanicked {
                        class,
                        method,
                        message: panic_message(payload.as_ref()),
                    });
                }
            };

        outcome.map_err(|e| match e {
            CallError::Injection(source) => BootError::Injection {
                class,
                method,
                source,
            },
            CallError::TargetMismatch { .. } => BootError::TypeMismatch { class },
            CallError::Failed(source) => BootError::InitializerFailed {
                class,
                method,
                source,
            },
        })
    }
}

/// Every unit of the lineage once, at the position it is first seen.
fn collect_units(lineage: &[Arc<ClassDescriptor>]) -> Vec<BehaviorUnit> {
    let mut seen = HashSet::new();
    lineage
        .iter()
        .flat_map(|class| class.units())
        .filter(|unit| seen.insert(*unit))
        .cloned()
        .collect()
}

/// The nearest class in the lineage exposing an initializer for `unit`.
fn find_initializer(
    lineage: &[Arc<ClassDescriptor>],
    unit: &BehaviorUnit,
    method: &str,
) -> Option<(usize, ErasedMethod)> {
    lineage.iter().enumerate().find_map(|(level, class)| {
        class
            .initializer_for(unit, method)
            .map(|initializer| (level, Arc::clone(initializer)))
    })
}

/// The object seen as each class of its lineage.
fn project_lineage<'a>(
    lineage: &[Arc<ClassDescriptor>],
    object: &'a (dyn Any + Send + Sync),
) -> Result<Vec<&'a (dyn Any + Send + Sync)>, BootError> {
    let mut views = Vec::with_capacity(lineage.len());
    let mut current = object;
    views.push(current);

    for pair in lineage.windows(2) {
        let (child, parent) = (&pair[0], &pair[1]);
        current = child
            .parent()
            .and_then(|link| link.project(current))
            .ok_or(BootError::TypeMismatch {
                class: parent.type_name(),
            })?;
        views.push(current);
    }

    Ok(views)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::{Inject, Injectable};
    use crate::error::Result as ContainerResult;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Calls(Mutex<Vec<String>>);

    impl Calls {
        fn push(&self, call: &str) {
            self.0.lock().unwrap().push(call.to_string());
        }

        fn snapshot(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Model;

    impl Injectable for Model {
        fn inject(_: &Container) -> ContainerResult<Self> {
            Ok(Model)
        }
    }

    struct Order {
        base: Model,
    }

    impl Injectable for Order {
        fn inject(_: &Container) -> ContainerResult<Self> {
            Ok(Order { base: Model })
        }
    }

    struct Invoice;

    impl Injectable for Invoice {
        fn inject(_: &Container) -> ContainerResult<Self> {
            Ok(Invoice)
        }
    }

    fn trackable() -> BehaviorUnit {
        BehaviorUnit::new("app::concerns::Trackable")
    }

    fn cacheable() -> BehaviorUnit {
        BehaviorUnit::new("app::concerns::Cacheable")
    }

    fn timestamps() -> BehaviorUnit {
        BehaviorUnit::new("app::concerns::HasTimestamps")
    }

    fn setup(registry: ClassRegistry) -> (Container, Arc<InitializationRecord>, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let record = Arc::new(InitializationRecord::new());
        let mut container = Container::new();
        container.register_arc(Arc::clone(&calls));
        Arc::new(TraitBooter::new(Arc::new(registry), Arc::clone(&record))).attach(&mut container);
        (container, record, calls)
    }

    #[test]
    fn test_initializer_runs_once_per_process() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Order>()
                .uses(trackable())
                .uses(cacheable())
                .initializer(&trackable(), |_: &Order, Inject(calls): Inject<Calls>| {
                    calls.push("initializeTrackable");
                })
                .build(),
        );
        let (container, record, calls) = setup(registry);

        container.make::<Order>().unwrap();
        assert_eq!(calls.snapshot(), vec!["initializeTrackable"]);
        assert_eq!(
            record.keys(),
            vec!["app::concerns::Trackable::initializeTrackable"]
        );

        container.make::<Order>().unwrap();
        assert_eq!(calls.snapshot().len(), 1);
    }

    #[test]
    fn test_unit_without_initializer_is_not_recorded() {
        let registry = ClassRegistry::new();
        registry.register(ClassDescriptor::builder::<Invoice>().uses(cacheable()).build());
        let (container, record, _) = setup(registry);

        container.make::<Invoice>().unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_units_of_ancestors_are_initialized() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Model>()
                .uses(timestamps())
                .initializer(&timestamps(), |_: &Model, Inject(calls): Inject<Calls>| {
                    calls.push("initializeHasTimestamps");
                })
                .build(),
        );
        registry.register(
            ClassDescriptor::builder::<Order>()
                .extends::<Model, _>(|order| &order.base)
                .uses(trackable())
                .build(),
        );
        let (container, record, calls) = setup(registry);

        container.make::<Order>().unwrap();
        assert_eq!(calls.snapshot(), vec!["initializeHasTimestamps"]);
        assert!(record.contains("app::concerns::HasTimestamps::initializeHasTimestamps"));

        // Resolving the parent class itself finds the unit already booted.
        container.make::<Model>().unwrap();
        assert_eq!(calls.snapshot().len(), 1);
    }

    #[test]
    fn test_child_initializer_for_inherited_unit() {
        let registry = ClassRegistry::new();
        registry.register(ClassDescriptor::builder::<Model>().uses(timestamps()).build());
        registry.register(
            ClassDescriptor::builder::<Order>()
                .extends::<Model, _>(|order| &order.base)
                .method("initializeHasTimestamps", |_: &Order, Inject(calls): Inject<Calls>| {
                    calls.push("Order::initializeHasTimestamps");
                })
                .build(),
        );
        let (container, _, calls) = setup(registry);

        container.make::<Order>().unwrap();
        assert_eq!(calls.snapshot(), vec!["Order::initializeHasTimestamps"]);
    }

    #[test]
    fn test_used_units_order_and_duplicates() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Model>()
                .uses(timestamps())
                .uses(trackable())
                .build(),
        );
        registry.register(
            ClassDescriptor::builder::<Order>()
                .extends::<Model, _>(|order| &order.base)
                .uses(trackable())
                .uses(cacheable())
                .build(),
        );
        let booter = TraitBooter::new(Arc::new(registry), Arc::new(InitializationRecord::new()));

        let units = booter.used_units(TypeId::of::<Order>()).unwrap();
        assert_eq!(units, vec![trackable(), cacheable(), timestamps()]);
        assert!(booter.used_units(TypeId::of::<Invoice>()).unwrap().is_empty());
    }

    #[test]
    fn test_unregistered_parent_is_an_error() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Order>()
                .extends::<Model, _>(|order| &order.base)
                .build(),
        );
        let booter = TraitBooter::new(Arc::new(registry), Arc::new(InitializationRecord::new()));

        assert!(matches!(
            booter.used_units(TypeId::of::<Order>()),
            Err(BootError::ParentNotRegistered { .. })
        ));
    }

    #[test]
    fn test_failure_stops_remaining_units_and_is_not_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Order>()
                .uses(trackable())
                .uses(cacheable())
                .initializer(&trackable(), move |_: &Order| -> anyhow::Result<()> {
                    counter.fetch_add(1, Ordering::SeqCst);
                    anyhow::bail!("tracking backend unavailable")
                })
                .initializer(&cacheable(), |_: &Order, Inject(calls): Inject<Calls>| {
                    calls.push("initializeCacheable");
                })
                .build(),
        );
        let calls = Arc::new(Calls::default());
        let record = Arc::new(InitializationRecord::new());
        let booter = TraitBooter::new(Arc::new(registry), Arc::clone(&record));
        let mut container = Container::new();
        container.register_arc(Arc::clone(&calls));

        let order = Order { base: Model };
        let resolved = Resolved::new(&order, "Order");
        let err = booter.boot_object(&resolved, &container).unwrap_err();
        assert!(matches!(err, BootError::InitializerFailed { .. }));
        assert!(err.to_string().contains("tracking backend unavailable"));
        assert!(calls.snapshot().is_empty());

        // Second pass: Trackable is consumed, Cacheable now runs.
        assert_eq!(booter.boot_object(&resolved, &container).unwrap(), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(calls.snapshot(), vec!["initializeCacheable"]);
    }

    #[test]
    fn test_panicking_initializer_is_contained() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Invoice>()
                .uses(trackable())
                .initializer(&trackable(), |_: &Invoice| -> anyhow::Result<()> {
                    panic!("boom")
                })
                .build(),
        );
        let booter = TraitBooter::new(Arc::new(registry), Arc::new(InitializationRecord::new()));

        let invoice = Invoice;
        let err = booter
            .boot_object(&Resolved::new(&invoice, "Invoice"), &Container::new())
            .unwrap_err();
        match err {
            BootError::InitializerPanicked { message, .. } => assert_eq!(message, "boom"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_panic_never_escapes_resolution() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Invoice>()
                .uses(trackable())
                .initializer(&trackable(), |_: &Invoice| -> anyhow::Result<()> {
                    panic!("boom")
                })
                .build(),
        );
        let (container, record, _) = setup(registry);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| container.make::<Invoice>()));
        assert!(matches!(outcome, Ok(Ok(_))));
        assert!(record.contains("app::concerns::Trackable::initializeTrackable"));
    }

    #[test]
    fn test_inheritance_cycle_is_an_error() {
        struct Parent;
        struct Child;

        static PARENT: Parent = Parent;
        static CHILD: Child = Child;

        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Child>()
                .extends::<Parent, _>(|_| &PARENT)
                .uses(trackable())
                .build(),
        );
        registry.register(
            ClassDescriptor::builder::<Parent>()
                .extends::<Child, _>(|_| &CHILD)
                .uses(cacheable())
                .build(),
        );
        let booter = TraitBooter::new(Arc::new(registry), Arc::new(InitializationRecord::new()));

        assert!(matches!(
            booter.used_units(TypeId::of::<Child>()),
            Err(BootError::InheritanceCycle { .. })
        ));
        let err = booter
            .boot_object(&Resolved::new(&CHILD, "Child"), &Container::new())
            .unwrap_err();
        assert!(err.to_string().contains("inheritance cycle"));
    }

    #[test]
    fn test_initializer_resolving_own_class_does_not_recurse() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Invoice>()
                .uses(trackable())
                .initializer(
                    &trackable(),
                    |_: &Invoice, Inject(calls): Inject<Calls>, container: Container| {
                        calls.push("initializeTrackable");
                        container.make::<Invoice>().map(|_| ())
                    },
                )
                .build(),
        );
        let (container, record, calls) = setup(registry);

        container.make::<Invoice>().unwrap();
        container.make::<Invoice>().unwrap();
        assert_eq!(calls.snapshot(), vec!["initializeTrackable"]);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_missing_dependency_is_injection_error() {
        struct Mailer;

        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Invoice>()
                .uses(trackable())
                .initializer(&trackable(), |_: &Invoice, _: Inject<Mailer>| {})
                .build(),
        );
        let booter = TraitBooter::new(Arc::new(registry), Arc::new(InitializationRecord::new()));

        let invoice = Invoice;
        let err = booter
            .boot_object(&Resolved::new(&invoice, "Invoice"), &Container::new())
            .unwrap_err();
        assert!(matches!(err, BootError::Injection { .. }));
    }

    #[test]
    fn test_configured_prefix_changes_key() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Invoice>()
                .uses(trackable())
                .initializer(&trackable(), |_: &Invoice| {})
                .build(),
        );
        let record = Arc::new(InitializationRecord::new());
        let config = BooterConfig {
            method_prefix: "boot".to_string(),
            ..BooterConfig::default()
        };
        let booter = TraitBooter::with_config(Arc::new(registry), Arc::clone(&record), config);

        let invoice = Invoice;
        booter
            .boot_object(&Resolved::new(&invoice, "Invoice"), &Container::new())
            .unwrap();
        assert_eq!(record.keys(), vec!["app::concerns::Trackable::bootTrackable"]);
    }

    #[test]
    fn test_disabled_booter_ignores_events() {
        let registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Invoice>()
                .uses(trackable())
                .initializer(&trackable(), |_: &Invoice| {})
                .build(),
        );
        let record = Arc::new(InitializationRecord::new());
        let config = BooterConfig {
            enabled: false,
            ..BooterConfig::default()
        };
        let booter = TraitBooter::with_config(Arc::new(registry), Arc::clone(&record), config);

        let invoice = Invoice;
        booter.handle(&Resolved::new(&invoice, "Invoice"), &Container::new());
        assert!(record.is_empty());
    }
}
