use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::tree::{NativeTree, NodeId};

/// Shared ownership of a native tree, held by whoever hosts the page.
pub type SharedTree = Rc<RefCell<NativeTree>>;

/// Non-owning handle to a native tree root, passed across the engine boundary.
///
/// Dropping the handle never frees the tree. Once the host drops the tree the
/// handle reports no root and every lookup through it misses.
#[derive(Debug, Clone)]
pub struct NativeDocumentHandle {
    tree: Weak<RefCell<NativeTree>>,
}

impl NativeDocumentHandle {
    pub fn new(tree: &SharedTree) -> Self {
        Self {
            tree: Rc::downgrade(tree),
        }
    }

    /// A handle that was never attached to a tree.
    pub fn detached() -> Self {
        Self { tree: Weak::new() }
    }

    pub fn tree(&self) -> Option<SharedTree> {
        self.tree.upgrade()
    }

    pub fn root(&self) -> Option<NodeId> {
        let tree = self.tree()?;
        let root = tree.borrow().root();
        Some(root)
    }

    pub fn is_attached(&self) -> bool {
        self.tree.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_does_not_keep_tree_alive() {
        let tree: SharedTree = Rc::new(RefCell::new(NativeTree::new()));
        let handle = NativeDocumentHandle::new(&tree);
        assert!(handle.is_attached());
        assert_eq!(handle.root(), Some(0));

        drop(tree);
        assert!(!handle.is_attached());
        assert_eq!(handle.root(), None);
    }

    #[test]
    fn dropping_handle_leaves_tree_intact() {
        let tree: SharedTree = Rc::new(RefCell::new(NativeTree::from_html("<p>x</p>")));
        let handle = NativeDocumentHandle::new(&tree);
        drop(handle);
        assert_eq!(Rc::strong_count(&tree), 1);
        assert!(tree.borrow().document_element().is_some());
    }

    #[test]
    fn detached_handle_has_no_root() {
        assert_eq!(NativeDocumentHandle::detached().root(), None);
    }
}
