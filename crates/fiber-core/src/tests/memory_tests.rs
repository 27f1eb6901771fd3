use super::*;
use std::cell::Cell;
use std::rc::Rc;

fn document_with_list() -> (MemoryDocument, HostId, HostId, HostId) {
    let mut document = MemoryDocument::new();
    let list = document.create_container("ul");
    let first = document.create_element("li").expect("li");
    let second = document.create_element("li").expect("li");
    document.append_child(list, first).expect("append");
    document.append_child(list, second).expect("append");
    (document, list, first, second)
}

#[test]
fn insert_before_places_child_at_anchor() {
    let (mut document, list, first, second) = document_with_list();
    let inserted = document.create_element("li").expect("li");

    document.insert_before(list, inserted, second).expect("insert");

    assert_eq!(document.children(list), &[first, inserted, second]);
    assert_eq!(document.parent(inserted), Some(list));
}

#[test]
fn insert_before_unknown_anchor_fails() {
    let (mut document, list, _, _) = document_with_list();
    let stray = document.create_element("li").expect("li");
    let orphan = document.create_element("li").expect("li");

    assert_eq!(
        document.insert_before(list, stray, orphan),
        Err(HostError::Missing { id: orphan })
    );
}

#[test]
fn appending_moves_an_attached_child() {
    let (mut document, list, first, second) = document_with_list();
    document.append_child(list, first).expect("append");
    assert_eq!(document.children(list), &[second, first]);
}

#[test]
fn remove_child_requires_parentage() {
    let (mut document, list, first, _) = document_with_list();
    let other = document.create_container("div");

    assert_eq!(
        document.remove_child(other, first),
        Err(HostError::Missing { id: first })
    );
    document.remove_child(list, first).expect("remove");
    assert_eq!(document.parent(first), None);
    assert_eq!(document.children(list).len(), 1);
}

#[test]
fn text_nodes_reject_children() {
    let mut document = MemoryDocument::new();
    let text = document.create_text("a").expect("text");
    let child = document.create_text("b").expect("text");

    assert!(!document.accepts_children(text));
    assert!(!document.accepts_children(99));
    assert_eq!(
        document.append_child(text, child),
        Err(HostError::NotAContainer { id: text })
    );
}

#[test]
fn serialize_escapes_text_and_attributes() {
    let mut document = MemoryDocument::new();
    let node = document.create_element("a").expect("a");
    document
        .set_property(node, "title", &PropValue::from(r#"say "hi" & <go>"#))
        .expect("set");
    document.set_property(node, "hidden", &PropValue::Bool(false)).expect("set");
    document.set_property(node, "tabIndex", &PropValue::Int(3)).expect("set");
    let text = document.create_text("1 < 2").expect("text");
    document.append_child(node, text).expect("append");

    assert_eq!(
        document.serialize(node),
        r#"<a title="say &quot;hi&quot; &amp; &lt;go&gt;" tabIndex="3">1 &lt; 2</a>"#
    );
}

#[test]
fn text_node_value_follows_node_value_property() {
    let mut document = MemoryDocument::new();
    let text = document.create_text("old").expect("text");

    document
        .set_property(text, NODE_VALUE, &PropValue::from("new"))
        .expect("set");
    assert_eq!(document.text(text), Some("new"));

    document.clear_property(text, NODE_VALUE).expect("clear");
    assert_eq!(document.text(text), Some(""));
}

#[test]
fn dispatch_runs_listeners_for_the_event_only() {
    let mut document = MemoryDocument::new();
    let button = document.create_element("button").expect("button");
    let clicks = Rc::new(Cell::new(0));
    let seen = Rc::clone(&clicks);
    let handler = EventHandler::new(move |event| {
        assert_eq!(event.name, "click");
        seen.set(seen.get() + 1);
    });
    document.add_listener(button, "click", &handler).expect("listen");

    assert_eq!(document.dispatch(button, "click"), 1);
    assert_eq!(document.dispatch(button, "keydown"), 0);
    assert_eq!(clicks.get(), 1);

    document.remove_listener(button, "click", &handler).expect("unlisten");
    assert_eq!(document.dispatch(button, "click"), 0);
    assert_eq!(clicks.get(), 1);
}

#[test]
fn dump_tree_outlines_nesting() {
    let (mut document, list, first, second) = document_with_list();
    let text = document.create_text("x").expect("text");
    document.append_child(first, text).expect("append");

    let dump = document.dump_tree(list);
    assert_eq!(
        dump,
        format!("[{list}] <ul>\n  [{first}] <li>\n    [{text}] \"x\"\n  [{second}] <li>\n")
    );
}

#[test]
fn mutation_log_records_only_host_operations() {
    let (mut document, _, _, _) = document_with_list();
    let log = document.take_mutations();

    assert_eq!(log.len(), 4);
    assert!(log[2].is_structural());
    assert!(!log[0].is_structural());
    assert!(document.mutations().is_empty());
}
