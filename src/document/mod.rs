//! The Document object as the script engine sees it.
//!
//! Property reads go through a process-wide dispatch table, calls go through a
//! per-document binding table, and `getElementById` is answered from an
//! identifier registry kept in step with the native tree.

pub mod binding;
pub mod error;
pub mod instance;
pub mod property;
pub mod registry;
pub mod value;

pub use binding::{FunctionBinding, FunctionBindingTable, NativeEntry};
pub use error::BindingError;
pub use instance::{DocumentConfig, DocumentInstance, TagNameCase, DOCUMENT_NODE_NAME};
pub use property::{PropertyId, PropertyTable};
pub use registry::{ElementIdRegistry, IdentifierObserver};
pub use value::{ArgValue, EngineValue, PropertySlot};
