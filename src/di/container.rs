use crate::di::{CallError, Injectable, Method, Resolved};
use crate::error::{ContainerError, Result};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

type Instance = Arc<dyn Any + Send + Sync>;

/// Builds a fresh instance of a bound service.
type FactoryFn = Arc<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;

/// Type alias for a function that can cast an `Arc<dyn Any>` to another `Arc<dyn Any>`.
/// The inner value is usually an `Arc<dyn Trait>`.
type CasterFn = Arc<dyn Fn(Instance) -> Option<Instance> + Send + Sync>;

type ResolvingCallback = Arc<dyn Fn(&Resolved<'_>, &Container) + Send + Sync>;

/// Thread-safe dependency injection container.
///
/// Cloning is cheap and yields a handle to the same registrations, which is
/// how the container injects itself into methods.
#[derive(Clone)]
pub struct Container {
    services: Arc<DashMap<TypeId, ServiceEntry>>,
    trait_mappings: Arc<DashMap<TypeId, TypeId>>,
    casters: Arc<DashMap<TypeId, CasterFn>>,
    resolving: Arc<RwLock<Vec<ResolvingCallback>>>,
}

#[derive(Clone)]
struct ServiceEntry {
    type_name: &'static str,
    kind: EntryKind,
}

#[derive(Clone)]
enum EntryKind {
    /// Registered as a ready instance; never announced.
    Instance(Instance),
    /// Built on every resolve.
    Transient(FactoryFn),
    /// Built on first resolve, then shared.
    Singleton {
        factory: FactoryFn,
        cell: Arc<OnceLock<Instance>>,
    },
}

impl Container {
    pub fn new() -> Self {
        Self {
            services: Arc::new(DashMap::new()),
            trait_mappings: Arc::new(DashMap::new()),
            casters: Arc::new(DashMap::new()),
            resolving: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a ready-made instance.
    ///
    /// The instance was not built by the container, so `resolving` callbacks
    /// do not see it.
    pub fn register<T: 'static + Send + Sync>(&mut self, instance: T) -> &mut Self {
        self.register_arc(Arc::new(instance))
    }

    /// Register an instance that is already shared elsewhere.
    pub fn register_arc<T: 'static + Send + Sync>(&mut self, instance: Arc<T>) -> &mut Self {
        self.insert::<T>(EntryKind::Instance(instance));
        self
    }

    /// Bind `T` so that every resolve builds a new instance through [`Injectable`].
    pub fn bind<T: Injectable>(&mut self) -> &mut Self {
        self.bind_factory(T::inject)
    }

    /// Bind `T` to a factory that runs on every resolve.
    pub fn bind_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&Container) -> Result<T> + 'static + Send + Sync,
    {
        self.insert::<T>(EntryKind::Transient(erase_factory(factory)));
        self
    }

    /// Bind `T` so that it is built through [`Injectable`] on first resolve and shared afterwards.
    pub fn singleton<T: Injectable>(&mut self) -> &mut Self {
        self.singleton_factory(T::inject)
    }

    /// Bind `T` to a factory that runs once, on first resolve.
    pub fn singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&Container) -> Result<T> + 'static + Send + Sync,
    {
        self.insert::<T>(EntryKind::Singleton {
            factory: erase_factory(factory),
            cell: Arc::new(OnceLock::new()),
        });
        self
    }

    pub fn register_trait<Trait, Impl, F>(&mut self, caster_fn: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        let trait_id = TypeId::of::<Trait>();
        let impl_id = TypeId::of::<Impl>();

        self.trait_mappings.insert(trait_id, impl_id);

        let caster: CasterFn = Arc::new(move |instance: Instance| {
            let concrete = instance.downcast::<Impl>().ok()?;
            let trait_obj: Arc<Trait> = caster_fn(concrete);
            Some(Arc::new(trait_obj) as Instance) // Wrap the Arc<dyn Trait> in an Arc<dyn Any>
        });

        self.casters.insert(trait_id, caster);
        self
    }

    /// Subscribe to resolution events.
    ///
    /// The callback runs after every build the container performs (transient
    /// binds, the first build of a singleton, [`Container::make`]), in
    /// registration order. Callbacks must not fail; whatever they do with the
    /// value is their own business.
    pub fn resolving<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Resolved<'_>, &Container) + 'static + Send + Sync,
    {
        self.resolving
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
        self
    }

    pub fn resolve<T: 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let requested_type_id = TypeId::of::<T>();
        let entry = self
            .services
            .get(&requested_type_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(ContainerError::not_found::<T>)?;

        self.instantiate(entry)?
            .downcast::<T>()
            .map_err(|_| ContainerError::downcast::<T>())
    }

    pub fn resolve_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let requested_type_id = TypeId::of::<T>();

        let caster = self
            .casters
            .get(&requested_type_id)
            .map(|caster| Arc::clone(caster.value()))
            .ok_or_else(ContainerError::not_found::<T>)?;

        let impl_type_id = self
            .trait_mappings
            .get(&requested_type_id)
            .map(|id| *id.value())
            .ok_or_else(|| ContainerError::DependencyNotFound {
                type_name: format!(
                    "No implementation mapping found for trait '{}'",
                    std::any::type_name::<T>()
                ),
            })?;

        let entry = self
            .services
            .get(&impl_type_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ContainerError::DependencyNotFound {
                type_name: format!(
                    "Implementation for trait '{}' not registered",
                    std::any::type_name::<T>()
                ),
            })?;

        let instance = self.instantiate(entry)?;
        let cast_result = caster(instance).ok_or_else(ContainerError::downcast::<T>)?;

        // The caster returns an Arc<dyn Any> which holds an Arc<T>.
        // We need to downcast to Arc<T>, which is Sized.
        let wrapper = cast_result
            .downcast::<Arc<T>>()
            .map_err(|_| ContainerError::downcast::<T>())?;
        // The result of downcast is Arc<Arc<T>>, so we clone the inner Arc.
        Ok(wrapper.as_ref().clone())
    }

    /// Build `T`, using its binding if there is one.
    ///
    /// Unbound types are built through [`Injectable`] and announced to the
    /// `resolving` callbacks like any other build.
    pub fn make<T: Injectable>(&self) -> Result<Arc<T>> {
        if self.services.contains_key(&TypeId::of::<T>()) {
            return self.resolve::<T>();
        }

        let instance = Arc::new(T::inject(self)?);
        self.fire_resolving(&*instance, std::any::type_name::<T>());
        Ok(instance)
    }

    /// Invoke `method` on `target`, resolving every parameter after the
    /// receiver from this container.
    pub fn call<T, Args, M>(&self, target: &T, method: &M) -> std::result::Result<(), CallError>
    where
        T: ?Sized,
        M: Method<T, Args>,
    {
        method.invoke(target, self)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.services.contains_key(&type_id) || self.trait_mappings.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    fn insert<T: 'static>(&self, kind: EntryKind) {
        let entry = ServiceEntry {
            type_name: std::any::type_name::<T>(),
            kind,
        };
        self.services.insert(TypeId::of::<T>(), entry);
    }

    // The entry is a clone, so no map guard is held while factories run and
    // resolve their own dependencies.
    fn instantiate(&self, entry: ServiceEntry) -> Result<Instance> {
        match entry.kind {
            EntryKind::Instance(instance) => Ok(instance),
            EntryKind::Transient(factory) => {
                let instance = factory(self)?;
                self.fire_resolving(&*instance, entry.type_name);
                Ok(instance)
            }
            EntryKind::Singleton { factory, cell } => {
                if let Some(instance) = cell.get() {
                    return Ok(Arc::clone(instance));
                }

                // Concurrent first resolves may each build; only the stored
                // instance is announced.
                let built = factory(self)?;
                match cell.set(Arc::clone(&built)) {
                    Ok(()) => {
                        self.fire_resolving(&*built, entry.type_name);
                        Ok(built)
                    }
                    Err(_) => cell.get().cloned().ok_or_else(|| {
                        ContainerError::Internal(format!(
                            "singleton '{}' vanished after initialization",
                            entry.type_name
                        ))
                    }),
                }
            }
        }
    }

    fn fire_resolving(&self, value: &(dyn Any + Send + Sync), type_name: &'static str) {
        // Snapshot so callbacks may subscribe or resolve without holding the lock.
        let callbacks: Vec<ResolvingCallback> = self
            .resolving
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if callbacks.is_empty() {
            return;
        }

        let resolved = Resolved::new(value, type_name);
        tracing::debug!(
            "Resolved {} ({} callbacks)",
            resolved.type_name(),
            callbacks.len()
        );
        for callback in &callbacks {
            callback(&resolved, self);
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

fn erase_factory<T, F>(factory: F) -> FactoryFn
where
    T: 'static + Send + Sync,
    F: Fn(&Container) -> Result<T> + 'static + Send + Sync,
{
    Arc::new(move |container: &Container| factory(container).map(|value| Arc::new(value) as Instance))
}
