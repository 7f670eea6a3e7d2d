pub mod environment;
pub mod processor;
pub mod runtime;
pub mod script;

pub use environment::{install_document_bindings, JsDocumentEnvironment};
pub use processor::{collect_scripts, execute_inline_scripts, run_inline_scripts, ScriptExecutionSummary};
pub use runtime::QuickJsEngine;
pub use script::{ScriptDescriptor, ScriptExecution, ScriptKind, ScriptSource};
