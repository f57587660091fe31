use proc_macro::TokenStream;

mod injectable;

/// Derive macro for making a struct buildable by the DI container
///
/// Every `Arc<T>` field is resolved from the container, `Arc<dyn Trait>`
/// fields through the trait binding. Fields marked `#[inject(default)]` are
/// initialized with `Default::default()` instead, which suits per-instance
/// state.
///
/// # Example
/// ```ignore
/// use class_trait_booter::DeriveInjectable as Injectable;
///
/// #[derive(Injectable)]
/// pub struct OrderService {
///     repository: Arc<dyn OrderRepository>,
///     clock: Arc<Clock>,
///     #[inject(default)]
///     seen: AtomicUsize,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}
