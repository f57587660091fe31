use std::borrow::Cow;
use std::fmt;

/// A named, reusable bundle of behavior composed into a class.
///
/// Units are identified by their fully-qualified name, e.g.
/// `app::concerns::Trackable`. The last `::` segment is the short name the
/// initializer convention is built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BehaviorUnit {
    name: Cow<'static, str>,
}

impl BehaviorUnit {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    /// A unit named after a Rust type, usually a marker trait:
    /// `BehaviorUnit::of::<dyn Trackable>()`. Auto-trait bounds such as
    /// `+ Send` are not part of the name.
    pub fn of<T: ?Sized>() -> Self {
        let name = std::any::type_name::<T>();
        let name = name.strip_prefix("dyn ").unwrap_or(name);
        Self::new(name.split(" + ").next().unwrap_or(name))
    }

    /// Fully-qualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The final path segment, generic arguments dropped.
    pub fn short_name(&self) -> &str {
        let path = self.name.split('<').next().unwrap_or_default();
        path.rsplit("::").next().unwrap_or(path)
    }

    /// Conventional initializer name: `prefix` followed by the short name.
    pub fn initializer_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.short_name())
    }

    /// Key under which an initializer run is recorded: `<unit>::<method>`.
    pub fn dedup_key(&self, method: &str) -> String {
        format!("{}::{}", self.name, method)
    }
}

impl fmt::Display for BehaviorUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&'static str> for BehaviorUnit {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}
