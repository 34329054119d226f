//! Display projection of a full tree.

use super::item::Node;

/// Returns true for generated injection variants, which the editable list hides.
#[must_use]
pub fn is_injection_item(item: &Node) -> bool {
    item.name().to_lowercase().contains("injection")
}

/// Projects the full tree's items onto the filtered view: injection items are
/// dropped, and folders left without any item are dropped with them.
#[must_use]
pub fn filtered_view(items: &[Node]) -> Vec<Node> {
    items.iter().filter_map(project).collect()
}

fn project(item: &Node) -> Option<Node> {
    if is_injection_item(item) {
        return None;
    }
    match item {
        Node::Request(_) => Some(item.clone()),
        Node::Folder(folder) => {
            let items = filtered_view(&folder.items);
            if items.is_empty() {
                return None;
            }
            let mut kept = folder.clone();
            kept.items = items;
            Some(Node::Folder(kept))
        }
    }
}
