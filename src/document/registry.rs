use std::collections::HashMap;

use crate::dom::NodeId;

/// Hook the element side calls when an element's identifier changes or the
/// element goes away.
pub trait IdentifierObserver {
    fn identifier_added(&mut self, id: &str, element: NodeId);
    fn identifier_removed(&mut self, id: &str, element: NodeId);
}

/// Identifier to elements index. Duplicate identifiers are kept in insertion
/// order and the most recently added element wins lookups.
#[derive(Debug, Default)]
pub struct ElementIdRegistry {
    elements_by_id: HashMap<String, Vec<NodeId>>,
}

impl ElementIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element_by_id(&mut self, id: &str, element: NodeId) {
        self.elements_by_id
            .entry(id.to_string())
            .or_default()
            .push(element);
    }

    /// Removes the first entry for `id` that is `element`. Unknown pairs are
    /// ignored.
    pub fn remove_element_by_id(&mut self, id: &str, element: NodeId) {
        let Some(elements) = self.elements_by_id.get_mut(id) else {
            return;
        };
        if let Some(position) = elements.iter().position(|&candidate| candidate == element) {
            elements.remove(position);
        }
        if elements.is_empty() {
            self.elements_by_id.remove(id);
        }
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements_by_id
            .get(id)
            .and_then(|elements| elements.last().copied())
    }

    pub fn elements_with_id(&self, id: &str) -> &[NodeId] {
        self.elements_by_id
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.elements_by_id.contains_key(id)
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.elements_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements_by_id.is_empty()
    }
}

impl IdentifierObserver for ElementIdRegistry {
    fn identifier_added(&mut self, id: &str, element: NodeId) {
        if id.is_empty() {
            return;
        }
        tracing::trace!(target: "document", id, element, "identifier registered");
        self.add_element_by_id(id, element);
    }

    fn identifier_removed(&mut self, id: &str, element: NodeId) {
        tracing::trace!(target: "document", id, element, "identifier released");
        self.remove_element_by_id(id, element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_added_element_wins() {
        let mut registry = ElementIdRegistry::new();
        registry.add_element_by_id("hero", 1);
        registry.add_element_by_id("hero", 2);
        registry.add_element_by_id("hero", 3);
        assert_eq!(registry.get_element_by_id("hero"), Some(3));
        assert_eq!(registry.elements_with_id("hero"), &[1, 2, 3]);
    }

    #[test]
    fn removing_last_entry_drops_identifier() {
        let mut registry = ElementIdRegistry::new();
        registry.add_element_by_id("solo", 7);
        registry.remove_element_by_id("solo", 7);
        assert_eq!(registry.get_element_by_id("solo"), None);
        assert!(!registry.contains_id("solo"));
        assert!(registry.is_empty());
    }

    #[test]
    fn removing_middle_entry_keeps_order() {
        let mut registry = ElementIdRegistry::new();
        for element in [10, 20, 30] {
            registry.add_element_by_id("dup", element);
        }
        registry.remove_element_by_id("dup", 20);
        assert_eq!(registry.elements_with_id("dup"), &[10, 30]);
        assert_eq!(registry.get_element_by_id("dup"), Some(30));
    }

    #[test]
    fn removing_most_recent_falls_back_to_previous() {
        let mut registry = ElementIdRegistry::new();
        registry.add_element_by_id("dup", 1);
        registry.add_element_by_id("dup", 2);
        registry.remove_element_by_id("dup", 2);
        assert_eq!(registry.get_element_by_id("dup"), Some(1));
    }

    #[test]
    fn removal_only_excises_first_matching_entry() {
        let mut registry = ElementIdRegistry::new();
        registry.add_element_by_id("twice", 5);
        registry.add_element_by_id("twice", 6);
        registry.add_element_by_id("twice", 5);
        registry.remove_element_by_id("twice", 5);
        assert_eq!(registry.elements_with_id("twice"), &[6, 5]);
    }

    #[test]
    fn unknown_removal_is_a_no_op() {
        let mut registry = ElementIdRegistry::new();
        registry.add_element_by_id("a", 1);
        registry.remove_element_by_id("a", 99);
        registry.remove_element_by_id("missing", 1);
        registry.remove_element_by_id("a", 1);
        registry.remove_element_by_id("a", 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn observer_ignores_empty_identifiers() {
        let mut registry = ElementIdRegistry::new();
        registry.identifier_added("", 1);
        assert!(registry.is_empty());
        registry.identifier_added("x", 1);
        registry.identifier_removed("x", 1);
        assert!(registry.is_empty());
    }
}
