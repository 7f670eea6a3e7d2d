use frontier_document::document::ElementIdRegistry;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(usize, usize),
    Remove(usize, usize),
}

const IDS: [&str; 3] = ["a", "b", "c"];

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..IDS.len(), 0usize..6).prop_map(|(id, element)| Op::Add(id, element)),
        (0..IDS.len(), 0usize..6).prop_map(|(id, element)| Op::Remove(id, element)),
    ]
}

proptest! {
    #[test]
    fn lookup_matches_last_surviving_add(ops in prop::collection::vec(op(), 0..40)) {
        let mut registry = ElementIdRegistry::new();
        let mut model: Vec<Vec<usize>> = vec![Vec::new(); IDS.len()];

        for op in &ops {
            match *op {
                Op::Add(id, element) => {
                    registry.add_element_by_id(IDS[id], element);
                    model[id].push(element);
                }
                Op::Remove(id, element) => {
                    registry.remove_element_by_id(IDS[id], element);
                    if let Some(position) = model[id].iter().position(|&e| e == element) {
                        model[id].remove(position);
                    }
                }
            }
        }

        for (index, id) in IDS.iter().enumerate() {
            prop_assert_eq!(registry.get_element_by_id(id), model[index].last().copied());
            prop_assert_eq!(registry.elements_with_id(id), model[index].as_slice());
            prop_assert_eq!(registry.contains_id(id), !model[index].is_empty());
        }
    }

    #[test]
    fn add_then_remove_restores_lookup(
        existing in prop::collection::vec(0usize..6, 0..5),
        element in 6usize..12,
    ) {
        let mut registry = ElementIdRegistry::new();
        for &e in &existing {
            registry.add_element_by_id("x", e);
        }
        let before = registry.get_element_by_id("x");

        registry.add_element_by_id("x", element);
        prop_assert_eq!(registry.get_element_by_id("x"), Some(element));

        registry.remove_element_by_id("x", element);
        prop_assert_eq!(registry.get_element_by_id("x"), before);
    }
}
