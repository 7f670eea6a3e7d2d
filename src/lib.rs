// Library exports for testing

pub mod config;
pub mod document;
pub mod dom;
pub mod js;

// Re-export commonly used types for tests
pub use config::{BridgeConfig, ConfigError, EngineConfig};
pub use document::{BindingError, DocumentConfig, DocumentInstance, PropertyTable, TagNameCase};
pub use dom::{NativeDocumentHandle, NativeTree, NodeId, SharedTree};
pub use js::{JsDocumentEnvironment, QuickJsEngine};
