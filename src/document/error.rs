use thiserror::Error;

use crate::dom::TreeError;

/// Failures a document call reports through the engine's exception slot.
///
/// Lookup misses and unknown property names are not errors; they come back as
/// null values and [`PropertySlot::Delegate`](super::PropertySlot::Delegate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("Failed to execute '{method}' on 'Document': {required} argument required, but only {given} present.")]
    ArgumentCount {
        method: &'static str,
        required: usize,
        given: usize,
    },
    #[error("Failed to execute '{method}' on 'Document': {message}")]
    ArgumentType {
        method: &'static str,
        message: String,
    },
    #[error("'{0}' is not a callable property of 'Document'")]
    NotCallable(String),
    #[error("native document tree is detached")]
    Detached,
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl BindingError {
    /// Errors the engine should raise as a `TypeError`.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            BindingError::ArgumentCount { .. }
                | BindingError::ArgumentType { .. }
                | BindingError::NotCallable(_)
        )
    }
}
