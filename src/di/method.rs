use crate::di::{Container, FromContainer};
use crate::error::ContainerError;
use thiserror::Error;

/// Failure of a [`Container::call`].
#[derive(Debug, Error)]
pub enum CallError {
    /// A parameter could not be resolved, the method was never entered.
    #[error("failed to resolve parameter: {0}")]
    Injection(#[from] ContainerError),

    /// The receiver handed to an erased method was not of the expected type.
    #[error("receiver is not a {type_name}")]
    TargetMismatch { type_name: &'static str },

    /// The method ran and reported an error.
    #[error(transparent)]
    Failed(anyhow::Error),
}

/// What a method may return: nothing, or a `Result` with any error
/// convertible into `anyhow::Error`.
pub trait IntoOutcome {
    fn into_outcome(self) -> anyhow::Result<()>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<E> IntoOutcome for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_outcome(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}

/// A method on `T` whose parameters after the receiver are supplied by the
/// container.
///
/// Implemented for every `Fn(&T, A1, .., An)` with up to eight
/// [`FromContainer`] parameters. `Args` is the parameter tuple and only exists
/// to keep the implementations apart.
pub trait Method<T: ?Sized, Args>: Send + Sync + 'static {
    fn invoke(&self, target: &T, container: &Container) -> Result<(), CallError>;
}

macro_rules! impl_method {
    ($($arg:ident),*) => {
        impl<F, T, R, $($arg,)*> Method<T, ($($arg,)*)> for F
        where
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
            T: ?Sized,
            R: IntoOutcome,
            $($arg: FromContainer,)*
        {
            #[allow(non_snake_case, unused_variables)]
            fn invoke(&self, target: &T, container: &Container) -> Result<(), CallError> {
                $(let $arg = $arg::from_container(container)?;)*
                (self)(target, $($arg),*)
                    .into_outcome()
                    .map_err(CallError::Failed)
            }
        }
    };
}

impl_method!();
impl_method!(A1);
impl_method!(A1, A2);
impl_method!(A1, A2, A3);
impl_method!(A1, A2, A3, A4);
impl_method!(A1, A2, A3, A4, A5);
impl_method!(A1, A2, A3, A4, A5, A6);
impl_method!(A1, A2, A3, A4, A5, A6, A7);
impl_method!(A1, A2, A3, A4, A5, A6, A7, A8);
