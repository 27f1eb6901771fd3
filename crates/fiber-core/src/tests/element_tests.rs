use super::*;
use std::rc::Rc;

fn greeting(_: &Props) -> Element {
    element!("p", Props::new(), "hi")
}

fn farewell(_: &Props) -> Element {
    element!("p", Props::new(), "bye")
}

#[test]
fn primitive_children_become_text_elements() {
    let element = element!("div", props! { "id" => "x" }, "hello", 42, true);

    assert_eq!(element.element_type(), &ElementType::from("div"));
    assert_eq!(element.props().get_str("id"), Some("x"));
    let texts: Vec<_> = element.children().iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec![Some("hello"), Some("42"), Some("true")]);
    for child in element.children() {
        assert_eq!(child.element_type(), &ElementType::Text);
        assert!(child.children().is_empty());
    }
}

#[test]
fn element_children_are_kept_in_order() {
    let element = element!(
        "ul",
        Props::new(),
        element!("li", Props::new(), "a"),
        "b",
        element!("li", Props::new())
    );

    let types: Vec<_> = element
        .children()
        .iter()
        .map(|c| c.element_type().clone())
        .collect();
    assert_eq!(
        types,
        vec![ElementType::from("li"), ElementType::Text, ElementType::from("li")]
    );
}

#[test]
fn element_without_children_has_empty_sequence() {
    let element = element!("br");
    assert!(element.children().is_empty());
    assert!(element.props().is_empty());
    assert_eq!(element.text(), None);
}

#[test]
fn children_key_is_not_a_plain_property() {
    let mut props = Props::new();
    props.insert(CHILDREN, "nope");
    assert!(!props.contains_key(CHILDREN));
}

#[test]
fn classify_splits_listeners_from_properties() {
    assert_eq!(classify("children"), PropKind::Children);
    assert_eq!(classify("onClick"), PropKind::Listener("click".into()));
    assert_eq!(classify("onMouseDown"), PropKind::Listener("mousedown".into()));
    assert_eq!(classify("title"), PropKind::Property);
    assert_eq!(classify("on"), PropKind::Property);
}

#[test]
fn handlers_compare_by_identity() {
    let first = EventHandler::new(|_| {});
    let same = first.clone();
    let other = EventHandler::new(|_| {});

    assert_eq!(PropValue::from(first.clone()), PropValue::from(same));
    assert_ne!(PropValue::from(first), PropValue::from(other));
}

#[test]
fn component_identity_follows_render_function() {
    let a = Component::new(greeting);
    let b = Component::new(greeting);
    let c = Component::new(farewell);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.name(), "greeting");
    assert!(ElementType::from(a).is_component());
    assert!(!ElementType::from("div").is_component());
}

#[test]
fn fn_pointers_are_told_apart_by_value() {
    let first: fn(&Props) -> Element = greeting;
    let second: fn(&Props) -> Element = farewell;

    let a = Component::new(first);
    let b = Component::new(second);
    let again = Component::new(first);

    assert_ne!(a, b);
    assert_ne!(a, again);
    assert_eq!(a, a.clone());
    assert_eq!(a.name(), "anonymous");
}

#[test]
fn fn_pointer_components_are_keyed_by_address() {
    let first: fn(&Props) -> Element = greeting;

    assert_eq!(Component::from_fn(first), Component::from_fn(first));
    assert_ne!(Component::from_fn(first), Component::from_fn(farewell));
    assert_ne!(Component::from_fn(first), Component::new(first));
    assert_eq!(Component::from_fn(farewell).name(), "anonymous");
}

#[test]
fn capturing_closures_match_only_their_clones() {
    let label = String::from("x");
    let make = |label: String| {
        Component::named("label", move |_: &Props| {
            element!("p", Props::new(), label.clone())
        })
    };

    let a = make(label.clone());
    let b = make(label);

    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn component_render_output_is_normalized() {
    let list = Component::named("list", |props: &Props| {
        let count = props.get("count").map(ToString::to_string).unwrap_or_default();
        vec![element!("li", Props::new(), count), element!("li", Props::new())]
    });
    let rendered = list.invoke(&props! { "count" => 2 });
    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0].children()[0].text(), Some("2"));

    let nothing = Component::named("empty", |_: &Props| None::<Element>);
    assert!(nothing.invoke(&Props::new()).is_empty());
}

#[test]
fn elements_share_props_when_cloned() {
    let element = element!("div", props! { "id" => "x" });
    let clone = element.clone();
    assert!(Rc::ptr_eq(element.props(), clone.props()));
}
