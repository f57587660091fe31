use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContainerError>;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Provider registration failed: {message}")]
    ProviderRegistrationFailed { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContainerError {
    pub(crate) fn not_found<T: ?Sized>() -> Self {
        ContainerError::DependencyNotFound {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    pub(crate) fn downcast<T: ?Sized>() -> Self {
        ContainerError::DowncastFailed {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }
}
