use std::collections::HashMap;
use std::sync::OnceLock;

/// Properties the Document interface resolves itself, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    CreateElement,
    Body,
    CreateTextNode,
    CreateComment,
    NodeName,
    GetElementById,
    DocumentElement,
    GetElementsByTagName,
    All,
}

impl PropertyId {
    pub const ALL: [PropertyId; 9] = [
        PropertyId::CreateElement,
        PropertyId::Body,
        PropertyId::CreateTextNode,
        PropertyId::CreateComment,
        PropertyId::NodeName,
        PropertyId::GetElementById,
        PropertyId::DocumentElement,
        PropertyId::GetElementsByTagName,
        PropertyId::All,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PropertyId::CreateElement => "createElement",
            PropertyId::Body => "body",
            PropertyId::CreateTextNode => "createTextNode",
            PropertyId::CreateComment => "createComment",
            PropertyId::NodeName => "nodeName",
            PropertyId::GetElementById => "getElementById",
            PropertyId::DocumentElement => "documentElement",
            PropertyId::GetElementsByTagName => "getElementsByTagName",
            PropertyId::All => "all",
        }
    }

    /// Whether reading the property yields a function rather than a value.
    pub const fn is_callable(self) -> bool {
        matches!(
            self,
            PropertyId::CreateElement
                | PropertyId::CreateTextNode
                | PropertyId::CreateComment
                | PropertyId::GetElementById
                | PropertyId::GetElementsByTagName
        )
    }
}

static PROPERTY_TABLE: OnceLock<PropertyTable> = OnceLock::new();

/// Immutable name lookup for [`PropertyId`]. There is no way to add or remove
/// entries once built.
#[derive(Debug)]
pub struct PropertyTable {
    by_name: HashMap<&'static str, PropertyId>,
}

impl PropertyTable {
    /// Builds the process-wide table on the first call; later calls return the
    /// same table.
    pub fn install() -> &'static PropertyTable {
        PROPERTY_TABLE.get_or_init(PropertyTable::build)
    }

    fn build() -> Self {
        let by_name = PropertyId::ALL
            .iter()
            .map(|&property| (property.name(), property))
            .collect();
        tracing::debug!(target: "document", "document property table built");
        Self { by_name }
    }

    pub fn resolve(&self, name: &str) -> Option<PropertyId> {
        self.by_name.get(name).copied()
    }

    pub fn ids(&self) -> impl ExactSizeIterator<Item = PropertyId> + Clone {
        PropertyId::ALL.into_iter()
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &'static str> + Clone {
        self.ids().map(PropertyId::name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
