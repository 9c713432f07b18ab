use super::*;

#[test]
fn append_returns_sequential_ids() {
    let mut surface = MemorySurface::new();
    let a = surface.append(MessageNode::new(Sender::User, "hi", "hi"));
    let b = surface.append(MessageNode::new(Sender::Assistant, "", ""));
    assert_eq!(a, NodeId(0));
    assert_eq!(b, NodeId(1));
    assert_eq!(surface.nodes().len(), 2);
    assert_eq!(surface.last().map(|n| n.sender), Some(Sender::Assistant));
}

#[test]
fn replace_swaps_text_and_markup() {
    let mut surface = MemorySurface::new();
    let id = surface.append(MessageNode::new(Sender::Assistant, "", ""));
    surface.replace(id, "**hi**", "<strong>hi</strong>");
    let node = surface.node(id).unwrap();
    assert_eq!(node.text, "**hi**");
    assert_eq!(node.markup, "<strong>hi</strong>");
    assert_eq!(node.sender, Sender::Assistant);
}

#[test]
fn replace_of_unknown_id_is_ignored() {
    let mut surface = MemorySurface::new();
    surface.replace(NodeId(7), "x", "x");
    assert!(surface.nodes().is_empty());
}

#[test]
fn clear_drops_nodes_and_suggestions() {
    let mut surface = MemorySurface::new();
    surface.append(MessageNode::new(Sender::Notice, "n", "n"));
    surface.show_suggestions(&Suggestions { heading: "h", items: &["a"], enabled: true });
    surface.clear();
    assert!(surface.nodes().is_empty());
    assert!(surface.suggestions().is_none());
}

#[test]
fn badge_and_suggestions_are_recorded() {
    let mut surface = MemorySurface::new();
    surface.set_badge(3);
    surface.show_suggestions(&Suggestions { heading: "h", items: &["a"], enabled: false });
    surface.show_suggestions(&Suggestions { heading: "h", items: &["a"], enabled: true });
    assert_eq!(surface.badge(), 3);
    assert_eq!(surface.suggestion_renders().len(), 2);
    assert!(surface.suggestions().unwrap().enabled);
}
