//! Trait booting errors

use crate::error::ContainerError;
use thiserror::Error;

/// Errors raised while booting the units of one resolved object
///
/// None of these reach the container's caller: the resolution hook logs them
/// and moves on.
#[derive(Debug, Error)]
pub enum BootError {
    /// A class names a parent the registry does not know
    #[error("class {class} extends {parent}, which is not registered")]
    ParentNotRegistered {
        class: &'static str,
        parent: &'static str,
    },

    /// Walking parents came back to a class already visited
    #[error("inheritance cycle detected at {class}")]
    InheritanceCycle { class: &'static str },

    /// The resolved value could not be viewed as the named class
    #[error("resolved value cannot be viewed as {class}")]
    TypeMismatch { class: &'static str },

    /// An initializer parameter could not be resolved
    #[error("{method} on {class} could not be injected: {source}")]
    Injection {
        class: &'static str,
        method: String,
        #[source]
        source: ContainerError,
    },

    /// The initializer returned an error
    #[error("{method} on {class} failed: {source}")]
    InitializerFailed {
        class: &'static str,
        method: String,
        #[source]
        source: anyhow::Error,
    },

    /// The initializer panicked
    #[error("{method} on {class} panicked: {message}")]
    InitializerPanicked {
        class: &'static str,
        method: String,
        message: String,
    },
}
