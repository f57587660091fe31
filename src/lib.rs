//! # Class Trait Booter
//!
//! Runs per-trait initializers when a dependency injection container resolves
//! an object.
//!
//! A class declares the reusable behavior units ("traits") it composes and,
//! optionally, the class it extends. Whenever the container builds an
//! instance, the booter walks that declaration, derives the conventional
//! initializer name for each unit (`initialize` + the unit's short name) and
//! calls the initializer once per process, injecting its parameters from the
//! container.
//!
//! ## Features
//!
//! - **Resolution hook**: subscribes to the container's `resolving` events
//! - **Inherited units**: units composed by any ancestor are booted too
//! - **Method injection**: initializer parameters are resolved like axum extractors
//! - **Once per process**: a shared, thread-safe record of booted units
//! - **Contained failures**: errors and panics are logged, resolution carries on
//!
//! ## Quick Start
//!
//! ```rust
//! use class_trait_booter::prelude::*;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! // 1. Define your services
//! #[derive(Default)]
//! pub struct AuditLog {
//!     entries: AtomicUsize,
//! }
//!
//! #[derive(Injectable)]
//! pub struct Order {
//!     audit: Arc<AuditLog>,
//! }
//!
//! // 2. Describe the class
//! let trackable = BehaviorUnit::new("app::concerns::Trackable");
//! let registry = Arc::new(ClassRegistry::new());
//! registry.register(
//!     ClassDescriptor::builder::<Order>()
//!         .uses(trackable.clone())
//!         .initializer(&trackable, |_order: &Order, Inject(audit): Inject<AuditLog>| {
//!             audit.entries.fetch_add(1, Ordering::SeqCst);
//!         })
//!         .build(),
//! );
//!
//! // 3. Bootstrap the container
//! let container = ContainerBuilder::new()
//!     .register(AuditLog::default())
//!     .bind::<Order>()
//!     .provider(TraitBooterServiceProvider::new(registry))
//!     .build()
//!     .unwrap();
//!
//! // 4. Resolve: the initializer runs once, however many orders are built
//! let first = container.resolve::<Order>().unwrap();
//! let _second = container.resolve::<Order>().unwrap();
//! assert_eq!(first.audit.entries.load(Ordering::SeqCst), 1);
//! ```

// Lets the derive macro's `::class_trait_booter` paths resolve inside this crate.
extern crate self as class_trait_booter;

pub mod booter;
pub mod class;
pub mod config;
pub mod di;
pub mod error;
pub mod provider;

// Re-export core types
pub use booter::{BootError, InitializationRecord, TraitBooter};
pub use class::{BehaviorUnit, ClassBuilder, ClassDescriptor, ClassRegistry};
pub use config::{BooterConfig, ConfigService};
pub use di::{
    CallError, Container, ContainerBuilder, FromContainer, Inject, InjectTrait, Injectable,
    Resolved, ValueKind,
};
pub use error::{ContainerError, Result};
pub use provider::{ServiceProvider, TraitBooterServiceProvider};

// Re-export macros
pub use class_trait_booter_macro::Injectable as DeriveInjectable;

/// Prelude module for convenient imports
///
/// ```
/// use class_trait_booter::prelude::*;
/// ```
pub mod prelude {
    pub use crate::DeriveInjectable as Injectable;
    pub use crate::booter::{BootError, InitializationRecord, TraitBooter};
    pub use crate::class::{BehaviorUnit, ClassDescriptor, ClassRegistry};
    pub use crate::config::{BooterConfig, ConfigService};
    pub use crate::di::{
        Container, ContainerBuilder, FromContainer, Inject, InjectTrait, Injectable, Resolved,
    };
    pub use crate::error::{ContainerError, Result};
    pub use crate::provider::{ServiceProvider, TraitBooterServiceProvider};
    pub use std::sync::Arc;
}
