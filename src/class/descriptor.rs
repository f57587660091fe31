use crate::class::BehaviorUnit;
use crate::di::{CallError, Container, Method};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A method stored without its receiver type.
pub(crate) type ErasedMethod =
    Arc<dyn Fn(&(dyn Any + Send + Sync), &Container) -> Result<(), CallError> + Send + Sync>;

/// Everything the booter needs to know about a class: the units it composes,
/// its parent and the initializers it exposes.
///
/// Built with [`ClassDescriptor::builder`].
///
/// # Example
///
/// ```
/// use class_trait_booter::{BehaviorUnit, ClassDescriptor, Inject};
///
/// struct Clock;
///
/// struct Model;
///
/// struct Order {
///     base: Model,
/// }
///
/// let timestamps = BehaviorUnit::new("app::HasTimestamps");
///
/// let order = ClassDescriptor::builder::<Order>()
///     .extends::<Model, _>(|order| &order.base)
///     .uses(timestamps.clone())
///     .initializer(&timestamps, |_order: &Order, _clock: Inject<Clock>| {})
///     .build();
///
/// assert_eq!(order.units(), &[timestamps]);
/// ```
pub struct ClassDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    units: Vec<BehaviorUnit>,
    parent: Option<ParentLink>,
    methods: HashMap<String, ErasedMethod>,
    unit_initializers: HashMap<BehaviorUnit, ErasedMethod>,
}

impl ClassDescriptor {
    pub fn builder<T: Any + Send + Sync>() -> ClassBuilder<T> {
        ClassBuilder::new()
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Units composed directly by this class, in declaration order.
    pub fn units(&self) -> &[BehaviorUnit] {
        &self.units
    }

    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Whether the class itself exposes a method called `name`.
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// The initializer for `unit`: a method registered under the conventional
    /// `name` wins over one registered against the unit.
    pub(crate) fn initializer_for(&self, unit: &BehaviorUnit, name: &str) -> Option<&ErasedMethod> {
        self.methods
            .get(name)
            .or_else(|| self.unit_initializers.get(unit))
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("ClassDescriptor")
            .field("type_name", &self.type_name)
            .field("units", &self.units)
            .field("parent", &self.parent.as_ref().map(ParentLink::type_name))
            .field("methods", &methods)
            .field("unit_initializers", &self.unit_initializers.len())
            .finish()
    }
}

/// Link from a class to the class it extends.
///
/// Rust has no inheritance, so the child embeds its parent and the link
/// carries the projection from one to the other.
pub struct ParentLink {
    type_id: TypeId,
    type_name: &'static str,
    upcast: Box<dyn Upcast>,
}

impl ParentLink {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Project a child instance onto its parent. `None` if `child` is not
    /// an instance of the class owning this link.
    pub fn project<'a>(
        &self,
        child: &'a (dyn Any + Send + Sync),
    ) -> Option<&'a (dyn Any + Send + Sync)> {
        self.upcast.upcast(child)
    }
}

trait Upcast: Send + Sync {
    fn upcast<'a>(&self, child: &'a (dyn Any + Send + Sync)) -> Option<&'a (dyn Any + Send + Sync)>;
}

struct Projection<T, P, F> {
    project: F,
    _marker: PhantomData<fn(&T) -> &P>,
}

impl<T, P, F> Upcast for Projection<T, P, F>
where
    T: Any + Send + Sync,
    P: Any + Send + Sync,
    F: Fn(&T) -> &P + Send + Sync,
{
    fn upcast<'a>(&self, child: &'a (dyn Any + Send + Sync)) -> Option<&'a (dyn Any + Send + Sync)> {
        let child = child.downcast_ref::<T>()?;
        let parent: &'a P = (self.project)(child);
        Some(parent)
    }
}

/// Fluent builder for a [`ClassDescriptor`] of `T`.
pub struct ClassBuilder<T> {
    descriptor: ClassDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ClassBuilder<T> {
    fn new() -> Self {
        Self {
            descriptor: ClassDescriptor {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                units: Vec::new(),
                parent: None,
                methods: HashMap::new(),
                unit_initializers: HashMap::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Compose a behavior unit. Repeats are ignored.
    pub fn uses(mut self, unit: impl Into<BehaviorUnit>) -> Self {
        let unit = unit.into();
        if !self.descriptor.units.contains(&unit) {
            self.descriptor.units.push(unit);
        }
        self
    }

    /// Declare `P` as the parent class, embedded in `T` and reached through `project`.
    pub fn extends<P, F>(mut self, project: F) -> Self
    where
        P: Any + Send + Sync,
        F: Fn(&T) -> &P + Send + Sync + 'static,
    {
        self.descriptor.parent = Some(ParentLink {
            type_id: TypeId::of::<P>(),
            type_name: std::any::type_name::<P>(),
            upcast: Box::new(Projection {
                project,
                _marker: PhantomData,
            }),
        });
        self
    }

    /// Register the initializer for `unit`, whatever the configured method prefix.
    pub fn initializer<Args, M>(mut self, unit: &BehaviorUnit, method: M) -> Self
    where
        Args: 'static,
        M: Method<T, Args>,
    {
        self.descriptor
            .unit_initializers
            .insert(unit.clone(), erase::<T, Args, M>(method));
        self
    }

    /// Register a method under an explicit name, e.g. `"initializeTrackable"`.
    pub fn method<Args, M>(mut self, name: impl Into<String>, method: M) -> Self
    where
        Args: 'static,
        M: Method<T, Args>,
    {
        self.descriptor
            .methods
            .insert(name.into(), erase::<T, Args, M>(method));
        self
    }

    pub fn build(self) -> ClassDescriptor {
        self.descriptor
    }
}

fn erase<T, Args, M>(method: M) -> ErasedMethod
where
    T: Any + Send + Sync,
    Args: 'static,
    M: Method<T, Args>,
{
    Arc::new(
        move |target: &(dyn Any + Send + Sync), container: &Container| {
            let target = target
                .downcast_ref::<T>()
                .ok_or(CallError::TargetMismatch {
                    type_name: std::any::type_name::<T>(),
                })?;
            container.call::<T, Args, M>(target, &method)
        },
    )
}
