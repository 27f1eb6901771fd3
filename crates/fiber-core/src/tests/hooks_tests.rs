use super::*;
use std::cell::{Cell, RefCell};
use std::sync::Arc;

thread_local! {
    static SETTER: RefCell<Option<SetState<i32>>> = RefCell::new(None);
    static EXTRA_HOOK: Cell<bool> = Cell::new(false);
    static RENDERS: Cell<usize> = Cell::new(0);
}

fn counter(_: &Props) -> Element {
    RENDERS.with(|renders| renders.set(renders.get() + 1));
    let (count, set) = use_state(1);
    SETTER.with(|slot| *slot.borrow_mut() = Some(set.clone()));
    let on_click = EventHandler::new(move |_| set.update(|c| c + 1));
    element!("button", props! { "onClick" => on_click }, count)
}

fn unstable(_: &Props) -> Element {
    let (label, _) = use_state(String::from("label"));
    if EXTRA_HOOK.with(Cell::get) {
        let _ = use_state(0u8);
    }
    element!("p", Props::new(), label)
}

fn setter() -> SetState<i32> {
    SETTER.with(|slot| slot.borrow().clone().expect("counter rendered"))
}

fn mount_with(runtime: Runtime, element: Element) -> (FiberRoot<MemoryDocument>, HostId) {
    let mut document = MemoryDocument::new();
    let container = document.create_container("main");
    let mut root = FiberRoot::with_runtime(document, runtime);
    root.render(element, container).expect("container accepts children");
    (root, container)
}

fn mount(element: Element) -> (FiberRoot<MemoryDocument>, HostId) {
    mount_with(Runtime::default(), element)
}

fn counter_tree() -> Element {
    element!(Component::new(counter))
}

#[test]
fn queued_updates_apply_in_order_on_next_render() {
    let (mut root, container) = mount(counter_tree());
    root.flush().expect("first commit");
    assert_eq!(root.host().inner_html(container), "<button>1</button>");

    let set = setter();
    set.update(|c| c + 1);
    set.update(|c| c + 1);
    assert!(root.has_pending_work());
    assert_eq!(root.flush(), Ok(WorkStatus::Committed));
    assert_eq!(root.host().inner_html(container), "<button>3</button>");

    // The settled value is the new base.
    assert_eq!(root.flush(), Ok(WorkStatus::Idle));
    root.render(counter_tree(), container).expect("render");
    root.flush().expect("re-render");
    assert_eq!(root.host().inner_html(container), "<button>3</button>");
}

#[test]
fn replace_and_update_compose() {
    let (mut root, container) = mount(counter_tree());
    root.flush().expect("first commit");

    let set = setter();
    set.set(10);
    set.update(|c| c * 2);
    root.flush().expect("commit");

    assert_eq!(root.host().inner_html(container), "<button>20</button>");
}

#[test]
fn click_updates_text_in_place() {
    let (mut root, container) = mount(counter_tree());
    root.flush().expect("first commit");
    let button = root.host().find_by_tag(container, "button")[0];
    let text = root.host().children(button)[0];
    root.host_mut().take_mutations();

    assert_eq!(root.host().dispatch(button, "click"), 1);
    root.flush().expect("commit");

    assert_eq!(root.host().inner_html(container), "<button>2</button>");
    assert_eq!(root.host().children(button), &[text]);
    assert!(root.host().mutations().contains(&Mutation::SetProperty {
        node: text,
        name: NODE_VALUE.into(),
        value: PropValue::from("2"),
    }));
    assert!(!root.host().mutations().iter().any(Mutation::is_structural));
}

#[test]
fn update_during_yield_restarts_generation() {
    let tree = || {
        element!(
            "section",
            Props::new(),
            counter_tree(),
            element!("p", Props::new(), "tail")
        )
    };
    let (mut root, container) = mount(tree());
    root.flush().expect("first commit");
    RENDERS.with(|renders| renders.set(0));

    root.render(tree(), container).expect("render");
    // Generation root, section, counter and button.
    assert_eq!(root.work_loop(&UnitBudget::new(4)), Ok(WorkStatus::Yielded));
    assert_eq!(RENDERS.with(Cell::get), 1);

    setter().set(5);
    assert_eq!(root.work_loop(&Unbounded), Ok(WorkStatus::Committed));

    assert_eq!(RENDERS.with(Cell::get), 2);
    assert_eq!(
        root.host().inner_html(container),
        "<section><button>5</button><p>tail</p></section>"
    );
    assert_eq!(root.generation(), 2);
    assert_eq!(root.arena().len(), 7);
}

#[test]
fn discarded_generation_does_not_consume_updates() {
    let (mut root, container) = mount(element!("div", Props::new(), counter_tree(), "end"));
    root.flush().expect("first commit");

    setter().update(|c| c + 1);
    // Render the counter with the update applied, then abandon the generation.
    assert_eq!(root.work_loop(&UnitBudget::new(3)), Ok(WorkStatus::Yielded));
    setter().update(|c| c + 1);
    root.flush().expect("commit");

    assert_eq!(root.host().inner_html(container), "<div><button>3</button>end</div>");
}

#[test]
fn extra_hook_is_a_hook_order_error() {
    EXTRA_HOOK.with(|extra| extra.set(false));
    let tree = || element!(Component::named("unstable", unstable));
    let (mut root, container) = mount(tree());
    root.flush().expect("first commit");
    root.host_mut().take_mutations();

    EXTRA_HOOK.with(|extra| extra.set(true));
    root.render(tree(), container).expect("render");
    assert_eq!(
        root.flush(),
        Err(RenderError::HookOrder {
            component: "unstable",
            index: 1,
            reason: "more hooks than during the previous render",
        })
    );
    assert_eq!(root.work_in_progress(), None);
    assert_eq!(root.host().inner_html(container), "<p>label</p>");
    assert!(!root.host().mutations().iter().any(Mutation::is_structural));

    EXTRA_HOOK.with(|extra| extra.set(false));
    root.render(tree(), container).expect("render");
    assert_eq!(root.flush(), Ok(WorkStatus::Committed));
}

#[test]
fn missing_hook_is_a_hook_order_error() {
    EXTRA_HOOK.with(|extra| extra.set(true));
    let tree = || element!(Component::named("unstable", unstable));
    let (mut root, container) = mount(tree());
    root.flush().expect("first commit");

    EXTRA_HOOK.with(|extra| extra.set(false));
    root.render(tree(), container).expect("render");
    let err = root.flush().expect_err("hook count shrank");
    assert!(matches!(err, RenderError::HookOrder { index: 1, .. }));
    EXTRA_HOOK.with(|extra| extra.set(false));
}

#[test]
fn updates_request_one_frame_until_handled() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let runtime = Runtime::new(scheduler.clone());
    let (mut root, _) = mount_with(runtime.clone(), counter_tree());
    root.flush().expect("first commit");
    assert_eq!(scheduler.frames(), 0);
    assert_eq!(runtime.request_count(), 0);

    let set = setter();
    set.update(|c| c + 1);
    set.update(|c| c + 1);
    assert_eq!(scheduler.frames(), 1);
    assert_eq!(runtime.request_count(), 2);

    root.flush().expect("commit");
    assert!(!runtime.has_update_request());
    set.update(|c| c + 1);
    assert_eq!(scheduler.frames(), 2);
    assert_eq!(runtime.request_count(), 3);
}

#[test]
fn setter_outliving_its_root_is_inert() {
    let (mut root, _) = mount(counter_tree());
    root.flush().expect("first commit");
    let handle = root.runtime_handle();
    drop(root);

    assert!(!handle.is_alive());
    setter().set(3);
}

#[test]
#[should_panic(expected = "outside of a component render")]
fn use_state_outside_render_panics() {
    let _ = use_state(0);
}

#[test]
fn lazy_initializer_runs_only_on_mount() {
    thread_local! {
        static INITS: Cell<usize> = Cell::new(0);
    }
    fn lazy(_: &Props) -> Element {
        let (value, _) = use_state_with(|| {
            INITS.with(|inits| inits.set(inits.get() + 1));
            7
        });
        element!("i", Props::new(), value)
    }

    let tree = || element!(Component::new(lazy));
    let (mut root, container) = mount(tree());
    root.flush().expect("first commit");
    root.render(tree(), container).expect("render");
    root.flush().expect("second commit");

    assert_eq!(INITS.with(Cell::get), 1);
    assert_eq!(root.host().inner_html(container), "<i>7</i>");
}
