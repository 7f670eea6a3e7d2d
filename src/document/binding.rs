use std::fmt;

use tracing::debug;

use super::error::BindingError;
use super::instance::DocumentInstance;
use super::property::{PropertyId, PropertyTable};
use super::value::{ArgValue, EngineValue};

/// Native entry point behind a callable document property.
pub type NativeEntry = fn(&mut DocumentInstance, &[ArgValue]) -> Result<EngineValue, BindingError>;

#[derive(Clone, Copy)]
pub struct FunctionBinding {
    property: PropertyId,
    entry: NativeEntry,
}

impl fmt::Debug for FunctionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionBinding")
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}

impl FunctionBinding {
    pub fn property(&self) -> PropertyId {
        self.property
    }

    pub fn name(&self) -> &'static str {
        self.property.name()
    }

    pub fn entry(&self) -> NativeEntry {
        self.entry
    }
}

/// The callable properties of one document, acquired when the document is
/// built and released with it.
#[derive(Debug)]
pub struct FunctionBindingTable {
    bindings: Vec<FunctionBinding>,
}

impl FunctionBindingTable {
    pub(crate) fn new(properties: &PropertyTable) -> Self {
        let bindings: Vec<_> = properties
            .ids()
            .filter_map(|property| {
                entry_for(property).map(|entry| FunctionBinding { property, entry })
            })
            .collect();
        debug!(target: "document", count = bindings.len(), "function bindings acquired");
        Self { bindings }
    }

    pub fn get(&self, property: PropertyId) -> Option<&FunctionBinding> {
        self.bindings
            .iter()
            .find(|binding| binding.property == property)
    }

    pub fn by_name(&self, name: &str) -> Option<&FunctionBinding> {
        self.bindings.iter().find(|binding| binding.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Drop for FunctionBindingTable {
    fn drop(&mut self) {
        debug!(target: "document", count = self.bindings.len(), "function bindings released");
    }
}

fn entry_for(property: PropertyId) -> Option<NativeEntry> {
    let entry: NativeEntry = match property {
        PropertyId::CreateElement => DocumentInstance::create_element,
        PropertyId::CreateTextNode => DocumentInstance::create_text_node,
        PropertyId::CreateComment => DocumentInstance::create_comment,
        PropertyId::GetElementById => DocumentInstance::get_element_by_id,
        PropertyId::GetElementsByTagName => DocumentInstance::get_elements_by_tag_name,
        PropertyId::Body
        | PropertyId::NodeName
        | PropertyId::DocumentElement
        | PropertyId::All => return None,
    };
    Some(entry)
}
