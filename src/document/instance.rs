use serde::Deserialize;
use tracing::{debug, trace};

use crate::dom::{ElementData, ElementKind, NativeDocumentHandle, Node, NodeId, SharedTree};

use super::binding::FunctionBindingTable;
use super::error::BindingError;
use super::property::{PropertyId, PropertyTable};
use super::registry::ElementIdRegistry;
use super::value::{ArgValue, EngineValue, PropertySlot};

pub const DOCUMENT_NODE_NAME: &str = "#document";

/// How `createElement` stores the tag name it was given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagNameCase {
    #[default]
    Lowercase,
    Preserve,
}

impl TagNameCase {
    pub fn apply(self, tag_name: &str) -> String {
        match self {
            TagNameCase::Lowercase => tag_name.to_ascii_lowercase(),
            TagNameCase::Preserve => tag_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub tag_name_case: TagNameCase,
}

/// The engine-facing Document object.
///
/// Owns its function bindings and identifier registry. The native tree is only
/// reachable through [`NativeDocumentHandle`], so dropping the instance leaves
/// the tree untouched.
#[derive(Debug)]
pub struct DocumentInstance {
    properties: &'static PropertyTable,
    bindings: FunctionBindingTable,
    registry: ElementIdRegistry,
    native: NativeDocumentHandle,
    body: Option<NodeId>,
    document_element: Option<NodeId>,
    config: DocumentConfig,
}

impl DocumentInstance {
    pub fn new(
        properties: &'static PropertyTable,
        native: NativeDocumentHandle,
        config: DocumentConfig,
    ) -> Self {
        let mut registry = ElementIdRegistry::new();
        if let Some(tree) = native.tree() {
            let tree = tree.borrow();
            for element in tree.elements_in_tree_order() {
                if let Some(id) = tree.element(element).and_then(ElementData::id) {
                    registry.add_element_by_id(id, element);
                }
            }
        }

        let bindings = FunctionBindingTable::new(properties);
        debug!(
            target: "document",
            attached = native.is_attached(),
            identifiers = registry.len(),
            "document instance created"
        );

        Self {
            properties,
            bindings,
            registry,
            native,
            body: None,
            document_element: None,
            config,
        }
    }

    pub fn properties(&self) -> &'static PropertyTable {
        self.properties
    }

    pub fn bindings(&self) -> &FunctionBindingTable {
        &self.bindings
    }

    pub fn registry(&self) -> &ElementIdRegistry {
        &self.registry
    }

    pub fn native(&self) -> &NativeDocumentHandle {
        &self.native
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    fn tree(&self) -> Result<SharedTree, BindingError> {
        self.native.tree().ok_or(BindingError::Detached)
    }

    /// Resolves a property read. Names outside the dispatch table delegate to
    /// the base node behaviour.
    pub fn get_property(&mut self, name: &str) -> PropertySlot {
        let Some(property) = self.properties.resolve(name) else {
            trace!(target: "document", name, "property delegated to node");
            return PropertySlot::Delegate;
        };

        match property {
            PropertyId::Body => PropertySlot::Value(EngineValue::from_node(self.body())),
            PropertyId::DocumentElement => {
                PropertySlot::Value(EngineValue::from_node(self.document_element()))
            }
            PropertyId::NodeName => {
                PropertySlot::Value(EngineValue::String(DOCUMENT_NODE_NAME.to_string()))
            }
            PropertyId::All => PropertySlot::Value(EngineValue::Collection(self.all())),
            callable => PropertySlot::Callable(callable),
        }
    }

    pub fn property_names(&self) -> impl ExactSizeIterator<Item = &'static str> + Clone {
        self.properties.names()
    }

    /// Calls the function bound to `name`.
    pub fn invoke(&mut self, name: &str, args: &[ArgValue]) -> Result<EngineValue, BindingError> {
        let entry = self
            .bindings
            .by_name(name)
            .map(|binding| binding.entry())
            .ok_or_else(|| BindingError::NotCallable(name.to_string()))?;
        entry(self, args)
    }

    /// The cached body element, re-resolved when the cache no longer matches
    /// the tree.
    pub fn body(&mut self) -> Option<NodeId> {
        let Some(tree) = self.native.tree() else {
            self.body = None;
            return None;
        };
        let tree = tree.borrow();
        let current = tree.body();
        if self.body != current {
            self.body = current;
        }
        self.body
    }

    pub fn document_element(&mut self) -> Option<NodeId> {
        let Some(tree) = self.native.tree() else {
            self.document_element = None;
            return None;
        };
        let tree = tree.borrow();
        let current = tree.document_element();
        if self.document_element != current {
            self.document_element = current;
        }
        self.document_element
    }

    /// Every element in tree order.
    pub fn all(&self) -> Vec<NodeId> {
        let Some(tree) = self.native.tree() else {
            return Vec::new();
        };
        let tree = tree.borrow();
        tree.elements_in_tree_order()
    }

    pub fn create_element(&mut self, args: &[ArgValue]) -> Result<EngineValue, BindingError> {
        const METHOD: &str = "createElement";
        let tag_name = string_arg(METHOD, args)?;
        if tag_name.is_empty() {
            return Err(BindingError::ArgumentType {
                method: METHOD,
                message: "The tag name provided ('') is not a valid name.".to_string(),
            });
        }

        let tag_name = self.config.tag_name_case.apply(tag_name);
        let element = self.tree()?.borrow_mut().create_element(&tag_name);
        trace!(target: "document", element, tag = %tag_name, "element created");
        Ok(EngineValue::Node(element))
    }

    pub fn create_text_node(&mut self, args: &[ArgValue]) -> Result<EngineValue, BindingError> {
        let data = coerced_arg("createTextNode", args)?;
        let node = self.tree()?.borrow_mut().create_text(&data);
        Ok(EngineValue::Node(node))
    }

    pub fn create_comment(&mut self, args: &[ArgValue]) -> Result<EngineValue, BindingError> {
        let data = coerced_arg("createComment", args)?;
        let node = self.tree()?.borrow_mut().create_comment(&data);
        Ok(EngineValue::Node(node))
    }

    pub fn get_element_by_id(&mut self, args: &[ArgValue]) -> Result<EngineValue, BindingError> {
        let id = string_arg("getElementById", args)?;
        Ok(EngineValue::from_node(self.registry.get_element_by_id(id)))
    }

    pub fn get_elements_by_tag_name(
        &mut self,
        args: &[ArgValue],
    ) -> Result<EngineValue, BindingError> {
        let tag_name = string_arg("getElementsByTagName", args)?;
        let Some(tree) = self.native.tree() else {
            return Ok(EngineValue::Collection(Vec::new()));
        };
        let elements = tree.borrow().elements_by_tag_name(tag_name);
        Ok(EngineValue::Collection(elements))
    }

    pub fn add_element_by_id(&mut self, id: &str, element: NodeId) {
        self.registry.add_element_by_id(id, element);
    }

    pub fn remove_element_by_id(&mut self, id: &str, element: NodeId) {
        self.registry.remove_element_by_id(id, element);
    }

    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), BindingError> {
        let tree = self.tree()?;
        tree.borrow_mut()
            .set_attribute(node, name, value, &mut self.registry)?;
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), BindingError> {
        let tree = self.tree()?;
        tree.borrow_mut()
            .remove_attribute(node, name, &mut self.registry)?;
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), BindingError> {
        self.tree()?.borrow_mut().append_child(parent, child)?;
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), BindingError> {
        self.tree()?.borrow_mut().remove_child(parent, child)?;
        Ok(())
    }

    /// Destroys a node and its subtree, dropping their identifiers.
    pub fn destroy_node(&mut self, node: NodeId) -> Result<(), BindingError> {
        let tree = self.tree()?;
        tree.borrow_mut().destroy(node, &mut self.registry)?;
        Ok(())
    }

    fn with_node<T>(&self, node: NodeId, f: impl FnOnce(&Node) -> T) -> Option<T> {
        let tree = self.native.tree()?;
        let tree = tree.borrow();
        tree.node(node).map(f)
    }

    pub fn node_type(&self, node: NodeId) -> Option<u16> {
        self.with_node(node, Node::node_type)
    }

    pub fn node_name(&self, node: NodeId) -> Option<String> {
        self.with_node(node, Node::node_name)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.with_node(node, |node| {
            node.as_element().map(|element| element.tag_name().to_string())
        })
        .flatten()
    }

    pub fn element_kind(&self, node: NodeId) -> Option<ElementKind> {
        self.with_node(node, |node| node.as_element().map(ElementData::kind))
            .flatten()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.native.tree()?;
        let tree = tree.borrow();
        tree.attribute(node, name).map(str::to_string)
    }

    pub fn text_content(&self, node: NodeId) -> Option<String> {
        let tree = self.native.tree()?;
        let text = tree.borrow().text_content(node);
        text
    }

    pub fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.with_node(node, Node::parent).flatten()
    }

    pub fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.with_node(node, |node| node.children().to_vec())
            .unwrap_or_default()
    }
}

impl Drop for DocumentInstance {
    fn drop(&mut self) {
        debug!(
            target: "document",
            identifiers = self.registry.len(),
            tree_alive = self.native.is_attached(),
            "document instance released"
        );
    }
}

fn require_args(method: &'static str, args: &[ArgValue], required: usize) -> Result<(), BindingError> {
    if args.len() < required {
        return Err(BindingError::ArgumentCount {
            method,
            required,
            given: args.len(),
        });
    }
    Ok(())
}

fn string_arg<'a>(method: &'static str, args: &'a [ArgValue]) -> Result<&'a str, BindingError> {
    require_args(method, args, 1)?;
    args[0].as_str().ok_or_else(|| BindingError::ArgumentType {
        method,
        message: format!(
            "parameter 1 is not of type 'string' (got {}).",
            args[0].type_name()
        ),
    })
}

fn coerced_arg(method: &'static str, args: &[ArgValue]) -> Result<String, BindingError> {
    require_args(method, args, 1)?;
    Ok(args[0].coerce_to_string())
}
