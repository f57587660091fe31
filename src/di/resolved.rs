use std::any::{Any, TypeId};
use std::fmt;

/// Whether a resolved value can compose behavior units at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Primitives and strings.
    Scalar,
    /// Any other structured value.
    Object,
}

/// A borrowed view of a value the container has just built.
///
/// Handed to every `resolving` callback. The concrete type is erased, but the
/// `TypeId` and type name survive so listeners can look the type up.
#[derive(Clone, Copy)]
pub struct Resolved<'a> {
    value: &'a (dyn Any + Send + Sync),
    type_id: TypeId,
    type_name: &'static str,
}

impl<'a> Resolved<'a> {
    pub(crate) fn new(value: &'a (dyn Any + Send + Sync), type_name: &'static str) -> Self {
        Self {
            value,
            type_id: value.type_id(),
            type_name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> ValueKind {
        if scalar_type_ids().contains(&self.type_id) {
            ValueKind::Scalar
        } else {
            ValueKind::Object
        }
    }

    pub fn is_object(&self) -> bool {
        self.kind() == ValueKind::Object
    }

    pub fn as_any(&self) -> &'a (dyn Any + Send + Sync) {
        self.value
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind())
            .finish()
    }
}

fn scalar_type_ids() -> [TypeId; 19] {
    [
        TypeId::of::<()>(),
        TypeId::of::<bool>(),
        TypeId::of::<char>(),
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<i128>(),
        TypeId::of::<isize>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<u128>(),
        TypeId::of::<usize>(),
        TypeId::of::<f32>(),
        TypeId::of::<f64>(),
        TypeId::of::<String>(),
        TypeId::of::<&'static str>(),
    ]
}
