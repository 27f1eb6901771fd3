use fiber_core::{
    element, props, use_state, Component, Element, EventHandler, FiberRoot, Host, HostId,
    MemoryDocument, Props, RenderError,
};
use fiber_runtime_std::StdRuntime;

const CLICKS: usize = 3;

fn counter(_: &Props) -> Element {
    let (count, set_count) = use_state(1);
    let on_click = EventHandler::new(move |_| set_count.update(|c| c + 1));
    element!("div", props! { "onClick" => on_click }, " Count: ", count, " ")
}

fn greeting(props: &Props) -> Element {
    let text = props.get_str("text").unwrap_or_default().to_owned();
    element!(
        "div",
        props! { "id" => "test" },
        element!("h1", Props::new(), "Hello fiber"),
        element!("p", props! { "title" => "title" }, text)
    )
}

fn app(_: &Props) -> Vec<Element> {
    vec![
        element!(Component::new(greeting), props! { "text" => "rendered incrementally" }),
        element!(Component::new(counter)),
    ]
}

fn main() {
    env_logger::init();

    println!("=== fiber counter demo ===");
    println!("Renders a counter into an in-memory document and clicks it {CLICKS} times.");
    println!("Set RUST_LOG=debug to watch yields and commits.");

    if let Err(err) = run() {
        log::error!("counter demo failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), RenderError> {
    let runtime = StdRuntime::new();
    let mut document = MemoryDocument::new();
    let container = document.create_container("div");
    document.set_property(container, "id", &"container".into())?;

    let mut root = FiberRoot::with_runtime(document, runtime.runtime());
    root.render(element!(Component::new(app)), container)?;
    let report = runtime.run_until_idle(&mut root)?;
    log::info!("initial render took {} frame(s)", report.frames);
    print_document(&root, container);

    for click in 1..=CLICKS {
        let Some(&target) = root.host().find_by_tag(container, "div").last() else {
            log::warn!("no counter to click");
            break;
        };
        root.host().dispatch(target, "click");
        if runtime.take_frame_request() {
            let report = runtime.run_until_idle(&mut root)?;
            log::debug!("click {click}: {report:?}");
        }
        print_document(&root, container);
    }

    if let Some(summary) = root.last_commit() {
        println!(
            "generation {}: {} inserted, {} updated, {} deleted",
            summary.generation, summary.inserted, summary.updated, summary.deleted
        );
    }
    Ok(())
}

fn print_document(root: &FiberRoot<MemoryDocument>, container: HostId) {
    println!("{}", root.host().serialize(container));
}
