use html_escape::{encode_double_quoted_attribute, encode_text};
use kuchiki::traits::*;
use thiserror::Error;

use crate::document::registry::IdentifierObserver;

/// Arena index of a node. Ids are never reused, so equal ids mean the same node.
pub type NodeId = usize;

/// The document node always lives in slot zero.
pub const DOCUMENT_NODE_ID: NodeId = 0;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("no node with id {0}")]
    UnknownNode(NodeId),
    #[error("node {0} cannot have children")]
    NotAContainer(NodeId),
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("node {child} cannot be inserted into node {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    #[error("node {child} is not a child of node {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

/// Built-in element classes the document knows how to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Anchor,
    AnimationPlayer,
    Audio,
    Canvas,
    Iframe,
    Image,
    Object,
    Video,
    Generic,
}

impl ElementKind {
    pub fn from_tag_name(tag_name: &str) -> Self {
        match tag_name.to_ascii_lowercase().as_str() {
            "a" => Self::Anchor,
            "animation-player" => Self::AnimationPlayer,
            "audio" => Self::Audio,
            "canvas" => Self::Canvas,
            "iframe" => Self::Iframe,
            "img" => Self::Image,
            "object" => Self::Object,
            "video" => Self::Video,
            _ => Self::Generic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    tag_name: String,
    kind: ElementKind,
    attributes: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag_name: impl Into<String>) -> Self {
        let tag_name = tag_name.into();
        let kind = ElementKind::from_tag_name(&tag_name);
        Self {
            tag_name,
            kind,
            attributes: Vec::new(),
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The element's identifier, ignoring an empty `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id").filter(|value| !value.is_empty())
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Option<String> {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value.to_string())),
            None => {
                self.attributes.push((name.to_string(), value.to_string()));
                None
            }
        }
    }

    fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let position = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(position).1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// DOM `nodeType` constant.
    pub fn node_type(&self) -> u16 {
        match self.kind {
            NodeKind::Element(_) => 1,
            NodeKind::Text(_) => 3,
            NodeKind::Comment(_) => 8,
            NodeKind::Document => 9,
        }
    }

    pub fn node_name(&self) -> String {
        match &self.kind {
            NodeKind::Document => "#document".to_string(),
            NodeKind::Element(element) => element.tag_name.to_ascii_uppercase(),
            NodeKind::Text(_) => "#text".to_string(),
            NodeKind::Comment(_) => "#comment".to_string(),
        }
    }

    fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element(_))
    }
}

/// Natively owned node tree. The binding layer only ever holds ids into it.
#[derive(Debug)]
pub struct NativeTree {
    nodes: Vec<Option<Node>>,
    doctype: Option<String>,
}

impl Default for NativeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeTree {
    /// An empty tree: a document node with no document element yet.
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node {
                id: DOCUMENT_NODE_ID,
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            })],
            doctype: None,
        }
    }

    pub fn from_html(html: &str) -> Self {
        let parsed = kuchiki::parse_html().one(html);
        let mut tree = Self::new();
        for child in parsed.children() {
            if let Some(doctype) = child.as_doctype() {
                tree.doctype = Some(doctype.name.clone());
                continue;
            }
            tree.import(&child, DOCUMENT_NODE_ID);
        }
        tree
    }

    /// Copies a parsed node and its subtree under `parent`.
    ///
    /// kuchiki keeps attributes in a sorted map, so imported attributes come
    /// out in name order rather than source order. Namespace prefixes such as
    /// `xlink:href` are kept as part of the name.
    fn import(&mut self, source: &kuchiki::NodeRef, parent: NodeId) {
        let kind = if let Some(element) = source.as_element() {
            let mut data = ElementData::new(element.name.local.to_string());
            for (name, attribute) in element.attributes.borrow().map.iter() {
                let qualified = match &attribute.prefix {
                    Some(prefix) => format!("{}:{}", prefix, name.local),
                    None => name.local.to_string(),
                };
                data.attributes.push((qualified, attribute.value.clone()));
            }
            NodeKind::Element(data)
        } else if let Some(text) = source.as_text() {
            NodeKind::Text(text.borrow().clone())
        } else if let Some(comment) = source.as_comment() {
            NodeKind::Comment(comment.borrow().clone())
        } else {
            return;
        };

        let id = self.insert(kind);
        self.link(parent, id);
        for child in source.children() {
            self.import(&child, id);
        }
    }

    pub fn root(&self) -> NodeId {
        DOCUMENT_NODE_ID
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).and_then(Node::as_element)
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, TreeError> {
        match self.node_mut(id) {
            Some(Node {
                kind: NodeKind::Element(element),
                ..
            }) => Ok(element),
            Some(_) => Err(TreeError::NotAnElement(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(Node {
            id,
            parent: None,
            children: Vec::new(),
            kind,
        }));
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&id| id != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Creates a detached element. Attaching it is the caller's business.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.insert(NodeKind::Element(ElementData::new(tag_name)))
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.insert(NodeKind::Text(data.to_string()))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.insert(NodeKind::Comment(data.to_string()))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let parent_node = self.node(parent).ok_or(TreeError::UnknownNode(parent))?;
        if !parent_node.is_container() {
            return Err(TreeError::NotAContainer(parent));
        }
        if !self.contains(child) {
            return Err(TreeError::UnknownNode(child));
        }
        if child == DOCUMENT_NODE_ID
            || self.is_inclusive_ancestor(child, parent)
            || (parent == DOCUMENT_NODE_ID && !self.document_accepts(child))
        {
            return Err(TreeError::HierarchyRequest { parent, child });
        }

        self.detach(child);
        self.link(parent, child);
        Ok(())
    }

    /// The document node holds comments and at most one element.
    fn document_accepts(&self, child: NodeId) -> bool {
        match self.node(child).map(Node::kind) {
            Some(NodeKind::Comment(_)) => true,
            Some(NodeKind::Element(_)) => self
                .document_element()
                .map_or(true, |current| current == child),
            _ => false,
        }
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::UnknownNode(parent));
        }
        if !self.contains(child) {
            return Err(TreeError::UnknownNode(child));
        }
        if self.parent(child) != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(())
    }

    /// Drops `node` and its descendants. Identified elements are reported to
    /// `observer` before their slots are freed.
    pub fn destroy(
        &mut self,
        node: NodeId,
        observer: &mut dyn IdentifierObserver,
    ) -> Result<(), TreeError> {
        if node == DOCUMENT_NODE_ID {
            return Err(TreeError::HierarchyRequest {
                parent: node,
                child: node,
            });
        }
        if !self.contains(node) {
            return Err(TreeError::UnknownNode(node));
        }

        self.detach(node);
        for id in self.subtree(node) {
            let Some(removed) = self.nodes.get_mut(id).and_then(Option::take) else {
                continue;
            };
            if let Some(identifier) = removed.as_element().and_then(ElementData::id) {
                observer.identifier_removed(identifier, id);
            }
        }
        Ok(())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attribute(&name.to_ascii_lowercase())
    }

    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: &str,
        observer: &mut dyn IdentifierObserver,
    ) -> Result<(), TreeError> {
        let name = name.to_ascii_lowercase();
        let previous = self.element_mut(node)?.set_attribute(&name, value);

        if name == "id" {
            if let Some(old) = previous.filter(|old| !old.is_empty()) {
                observer.identifier_removed(&old, node);
            }
            if !value.is_empty() {
                observer.identifier_added(value, node);
            }
        }
        Ok(())
    }

    pub fn remove_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        observer: &mut dyn IdentifierObserver,
    ) -> Result<(), TreeError> {
        let name = name.to_ascii_lowercase();
        let previous = self.element_mut(node)?.remove_attribute(&name);

        if name == "id" {
            if let Some(old) = previous.filter(|old| !old.is_empty()) {
                observer.identifier_removed(&old, node);
            }
        }
        Ok(())
    }

    /// First element child of the document node, if the tree has one yet.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(DOCUMENT_NODE_ID)
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    pub fn body(&self) -> Option<NodeId> {
        let root = self.document_element()?;
        self.children(root).iter().copied().find(|&id| {
            self.element(id)
                .is_some_and(|element| element.tag_name.eq_ignore_ascii_case("body"))
        })
    }

    /// Pre-order traversal rooted at `root`, including `root` itself.
    fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut ordered = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                ordered.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        ordered
    }

    pub fn elements_in_tree_order(&self) -> Vec<NodeId> {
        self.subtree(DOCUMENT_NODE_ID)
            .into_iter()
            .filter(|&id| self.element(id).is_some())
            .collect()
    }

    pub fn elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId> {
        if tag_name == "*" {
            return self.elements_in_tree_order();
        }
        self.subtree(DOCUMENT_NODE_ID)
            .into_iter()
            .filter(|&id| {
                self.element(id)
                    .is_some_and(|element| element.tag_name.eq_ignore_ascii_case(tag_name))
            })
            .collect()
    }

    /// DOM `textContent`: `None` for the document node.
    pub fn text_content(&self, node: NodeId) -> Option<String> {
        match &self.node(node)?.kind {
            NodeKind::Document => None,
            NodeKind::Text(data) | NodeKind::Comment(data) => Some(data.clone()),
            NodeKind::Element(_) => {
                let mut collected = String::new();
                for id in self.subtree(node) {
                    if let Some(NodeKind::Text(data)) = self.node(id).map(Node::kind) {
                        collected.push_str(data);
                    }
                }
                Some(collected)
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut output = String::new();
        if let Some(name) = &self.doctype {
            output.push_str("<!DOCTYPE ");
            output.push_str(name);
            output.push('>');
        }
        for &child in self.children(DOCUMENT_NODE_ID) {
            self.serialize_node(child, false, &mut output);
        }
        output
    }

    fn serialize_node(&self, id: NodeId, raw_text: bool, output: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Document => {}
            NodeKind::Text(data) if raw_text => output.push_str(data),
            NodeKind::Text(data) => output.push_str(&encode_text(data)),
            NodeKind::Comment(data) => {
                output.push_str("<!--");
                output.push_str(data);
                output.push_str("-->");
            }
            NodeKind::Element(element) => {
                output.push('<');
                output.push_str(&element.tag_name);
                for (name, value) in &element.attributes {
                    output.push(' ');
                    output.push_str(name);
                    output.push_str("=\"");
                    output.push_str(&encode_double_quoted_attribute(value));
                    output.push('"');
                }
                output.push('>');

                let tag = element.tag_name.to_ascii_lowercase();
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                let raw_children = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
                for &child in &node.children {
                    self.serialize_node(child, raw_children, output);
                }
                output.push_str("</");
                output.push_str(&element.tag_name);
                output.push('>');
            }
        }
    }
}
