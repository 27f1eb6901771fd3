use fiber_testing::prelude::*;

fn my_app(props: &Props) -> Element {
    let text = props.get_str("mytext").unwrap_or_default().to_owned();
    element!(
        "div",
        props! { "id" => "test" },
        element!("h1", Props::new(), "Hello"),
        element!("p", props! { "title" => "title" }, text)
    )
}

fn counter(_: &Props) -> Element {
    let (count, set) = use_state(1);
    let on_click = EventHandler::new(move |_| set.update(|c| c + 1));
    element!("div", props! { "onClick" => on_click }, " Count: ", count, " ")
}

fn toggle(_: &Props) -> Element {
    let (open, set) = use_state(false);
    let on_click = EventHandler::new(move |_| set.update(|open| !open));
    let detail = open.then(|| element!(Component::new(counter)));
    let mut children = vec![element!("button", props! { "onClick" => on_click }, "toggle")];
    children.extend(detail);
    children.push(element!("footer"));
    fiber_core::create_element("section", Props::new(), children)
}

#[test]
fn component_props_reach_the_host_tree() {
    run_test_root(|root| {
        let app = element!(Component::new(my_app), props! { "mytext" => "my text" });
        root.set_content(app).expect("render");

        assert_eq!(
            root.html(),
            r#"<div id="test"><h1>Hello</h1><p title="title">my text</p></div>"#
        );
    });
}

#[test]
fn clicking_the_counter_increments_it() {
    run_test_root(|root| {
        root.set_content(element!(Component::new(counter)))
            .expect("render");
        assert_eq!(root.html(), "<div> Count: 1 </div>");

        let div = root.find_by_tag("div")[0];
        assert_eq!(root.click(div), Ok(1));
        assert_eq!(root.click(div), Ok(1));

        assert_eq!(root.html(), "<div> Count: 3 </div>");
        assert_eq!(root.find_by_tag("div"), vec![div]);
    });
}

#[test]
fn nested_component_mounts_and_unmounts() {
    run_test_root(|root| {
        root.set_content(element!(Component::new(toggle)))
            .expect("render");
        assert_eq!(
            root.html(),
            "<section><button>toggle</button><footer></footer></section>"
        );

        let button = root.find_by_tag("button")[0];
        root.click(button).expect("open");
        assert_eq!(
            root.html(),
            "<section><button>toggle</button><div> Count: 1 </div><footer></footer></section>"
        );

        let counter_div = root.find_by_tag("div")[0];
        root.click(counter_div).expect("increment");
        assert_eq!(
            root.html(),
            "<section><button>toggle</button><div> Count: 2 </div><footer></footer></section>"
        );

        root.click(button).expect("close");
        assert_eq!(
            root.html(),
            "<section><button>toggle</button><footer></footer></section>"
        );
    });
}

#[test]
fn stepping_keeps_the_document_stable_until_commit() {
    run_test_root(|root| {
        root.set_content(element!(Component::new(counter)))
            .expect("render");
        let div = root.find_by_tag("div")[0];
        root.take_mutations();

        root.document().dispatch(div, "click");
        let mut statuses = Vec::new();
        loop {
            let status = root.step().expect("step");
            statuses.push(status);
            if status != WorkStatus::Yielded {
                break;
            }
            assert_eq!(root.html(), "<div> Count: 1 </div>");
        }

        assert_eq!(statuses.last(), Some(&WorkStatus::Committed));
        assert_eq!(root.html(), "<div> Count: 2 </div>");
        assert!(!root.take_mutations().iter().any(|m| m.is_structural()));
    });
}

#[test]
fn list_edits_follow_positions() {
    let list = |items: &[&str]| {
        let children: Vec<Element> = items
            .iter()
            .map(|item| element!("li", Props::new(), *item))
            .collect();
        fiber_core::create_element("ul", Props::new(), children)
    };

    run_test_root(|root| {
        root.set_content(list(&["a", "b"])).expect("render");
        root.set_content(list(&["a", "b", "c"])).expect("grow");
        assert_eq!(root.html(), "<ul><li>a</li><li>b</li><li>c</li></ul>");

        root.set_content(list(&["c"])).expect("shrink");
        assert_eq!(root.html(), "<ul><li>c</li></ul>");
        assert_eq!(root.find_by_tag("li").len(), 1);
    });
}
