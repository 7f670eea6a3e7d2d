//! The natively owned node tree and the handle the binding layer holds to it.

pub mod native;
pub mod tree;

pub use native::{NativeDocumentHandle, SharedTree};
pub use tree::{
    ElementData, ElementKind, NativeTree, Node, NodeId, NodeKind, TreeError, DOCUMENT_NODE_ID,
};
