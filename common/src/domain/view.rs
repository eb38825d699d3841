//! Session-scoped presentation state over a built tree.
//!
//! The view never mutates tree nodes; any change to the underlying content
//! means rebuilding the tree and wrapping it again.

use std::collections::BTreeSet;

use super::tree::TreeNode;

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub expanded: BTreeSet<String>,
    pub selected: Option<String>,
    pub filter: String,
}

pub struct TreeView<'t> {
    roots: &'t [TreeNode],
    state: ViewState,
}

#[derive(Debug, PartialEq)]
pub struct VisibleRow<'t> {
    pub node: &'t TreeNode,
    pub path: String,
    pub depth: usize,
}

impl<'t> TreeView<'t> {
    pub fn new(roots: &'t [TreeNode]) -> Self {
        Self::with_state(roots, ViewState::default())
    }

    pub fn with_state(roots: &'t [TreeNode], state: ViewState) -> Self {
        Self { roots, state }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Flips expansion for a folder path. Paths that do not name a folder
    /// in the current tree are ignored.
    pub fn toggle_folder(&mut self, path: &str) {
        if self.folder_at(path).is_none() {
            return;
        }
        if !self.state.expanded.remove(path) {
            self.state.expanded.insert(path.to_string());
        }
    }

    /// Selection is not validated; a stale path simply matches nothing on
    /// the next render.
    pub fn select_file(&mut self, path: &str) {
        self.state.selected = Some(path.to_string());
    }

    pub fn set_filter(&mut self, text: &str) {
        self.state.filter = text.to_string();
    }

    /// Walks the tree in display order, honoring expansion when no filter
    /// is set and pruning non-matching branches when one is. Recomputed
    /// from current state on every call.
    pub fn visible_nodes(&self) -> VisibleNodes<'_, 't> {
        let mut stack = Vec::with_capacity(self.roots.len());
        for node in self.roots.iter().rev() {
            stack.push((node, node.name().to_string(), 0));
        }
        VisibleNodes {
            state: &self.state,
            filter: self.state.filter.to_lowercase(),
            stack,
        }
    }

    fn folder_at(&self, path: &str) -> Option<&'t TreeNode> {
        let mut nodes = self.roots;
        let mut found = None;
        for segment in path.split('/') {
            let node = nodes.iter().find(|n| n.name() == segment)?;
            nodes = node.children();
            found = Some(node);
        }
        found.filter(|n| n.is_folder())
    }
}

pub struct VisibleNodes<'v, 't> {
    state: &'v ViewState,
    filter: String,
    stack: Vec<(&'t TreeNode, String, usize)>,
}

impl<'v, 't> Iterator for VisibleNodes<'v, 't> {
    type Item = VisibleRow<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path, depth)) = self.stack.pop() {
            if self.filter.is_empty() {
                if node.is_folder() && self.state.expanded.contains(&path) {
                    self.push_children(node, &path, depth);
                }
                return Some(VisibleRow { node, path, depth });
            }

            if !subtree_matches(node, &self.filter) {
                continue;
            }
            if node.is_folder() {
                self.push_children(node, &path, depth);
            }
            return Some(VisibleRow { node, path, depth });
        }
        None
    }
}

impl<'v, 't> VisibleNodes<'v, 't> {
    fn push_children(&mut self, node: &'t TreeNode, path: &str, depth: usize) {
        for child in node.children().iter().rev() {
            let child_path = format!("{}/{}", path, child.name());
            self.stack.push((child, child_path, depth + 1));
        }
    }
}

fn subtree_matches(node: &TreeNode, filter_lower: &str) -> bool {
    if node.name().to_lowercase().contains(filter_lower) {
        return true;
    }
    node.children()
        .iter()
        .any(|child| subtree_matches(child, filter_lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::build_tree_from_paths;

    fn sample_tree() -> Vec<TreeNode> {
        build_tree_from_paths([
            "src/components/Header.tsx".to_string(),
            "src/App.tsx".to_string(),
            "package.json".to_string(),
        ])
        .unwrap()
    }

    fn rows(view: &TreeView<'_>) -> Vec<(String, usize)> {
        view.visible_nodes()
            .map(|row| (row.path, row.depth))
            .collect()
    }

    #[test]
    fn collapsed_tree_shows_only_roots() {
        let tree = sample_tree();
        let view = TreeView::new(&tree);
        assert_eq!(
            rows(&view),
            vec![("package.json".to_string(), 0), ("src".to_string(), 0)]
        );
    }

    #[test]
    fn expansion_reveals_children() {
        let tree = sample_tree();
        let mut view = TreeView::new(&tree);
        view.toggle_folder("src");
        view.toggle_folder("src/components");
        assert_eq!(
            rows(&view),
            vec![
                ("package.json".to_string(), 0),
                ("src".to_string(), 0),
                ("src/App.tsx".to_string(), 1),
                ("src/components".to_string(), 1),
                ("src/components/Header.tsx".to_string(), 2),
            ]
        );

        view.toggle_folder("src/components");
        assert_eq!(
            rows(&view),
            vec![
                ("package.json".to_string(), 0),
                ("src".to_string(), 0),
                ("src/App.tsx".to_string(), 1),
                ("src/components".to_string(), 1),
            ]
        );
    }

    #[test]
    fn toggling_a_file_or_missing_path_is_a_no_op() {
        let tree = sample_tree();
        let mut view = TreeView::new(&tree);
        view.toggle_folder("package.json");
        view.toggle_folder("src/App.tsx");
        view.toggle_folder("does/not/exist");
        assert!(view.state().expanded.is_empty());
    }

    #[test]
    fn filter_keeps_matching_branches_and_prunes_the_rest() {
        let tree = sample_tree();
        let mut view = TreeView::new(&tree);
        view.set_filter("header");

        let paths: Vec<String> = view.visible_nodes().map(|row| row.path).collect();
        assert_eq!(
            paths,
            vec![
                "src".to_string(),
                "src/components".to_string(),
                "src/components/Header.tsx".to_string(),
            ]
        );
        assert!(!paths.iter().any(|p| p.ends_with("App.tsx")));
        assert!(!paths.iter().any(|p| p.ends_with("package.json")));
    }

    #[test]
    fn filter_matching_is_case_insensitive() {
        let tree = sample_tree();
        let mut view = TreeView::new(&tree);
        view.set_filter("HEADER");
        assert_eq!(view.visible_nodes().count(), 3);
    }

    #[test]
    fn visible_nodes_is_restartable() {
        let tree = sample_tree();
        let mut view = TreeView::new(&tree);
        view.set_filter("header");
        let first: Vec<String> = view.visible_nodes().map(|r| r.path).collect();
        let second: Vec<String> = view.visible_nodes().map(|r| r.path).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn stale_selection_is_allowed() {
        let tree = sample_tree();
        let mut view = TreeView::new(&tree);
        view.select_file("src/Deleted.tsx");
        assert_eq!(view.state().selected.as_deref(), Some("src/Deleted.tsx"));
    }
}
