use crate::class::ClassDescriptor;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;

/// Table of class descriptors keyed by `TypeId`.
///
/// Stands in for runtime reflection: a type the registry does not know
/// composes nothing.
#[derive(Default)]
pub struct ClassRegistry {
    classes: DashMap<TypeId, Arc<ClassDescriptor>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor, returning the one it replaced.
    pub fn register(&self, descriptor: ClassDescriptor) -> Option<Arc<ClassDescriptor>> {
        tracing::debug!(
            "Registering class {} ({} units)",
            descriptor.type_name(),
            descriptor.units().len()
        );
        self.classes
            .insert(descriptor.type_id(), Arc::new(descriptor))
    }

    pub fn get(&self, type_id: TypeId) -> Option<Arc<ClassDescriptor>> {
        self.classes
            .get(&type_id)
            .map(|descriptor| Arc::clone(descriptor.value()))
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.classes.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
