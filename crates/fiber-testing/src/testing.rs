use fiber_core::{
    Element, FiberRoot, HostId, MemoryDocument, Mutation, RenderError, RuntimeHandle,
    UnitBudget, WorkStatus,
};

/// Headless harness for exercising render roots in tests.
///
/// `TestRoot` owns a root rendered into a fresh [`MemoryDocument`] container
/// and exposes helpers for stepping the work loop one unit at a time, draining
/// it, firing events and snapshotting the resulting HTML.
pub struct TestRoot {
    root: FiberRoot<MemoryDocument>,
    container: HostId,
    content: Option<Element>,
}

impl TestRoot {
    /// Create a new harness with an empty `<div>` container.
    pub fn new() -> Self {
        let mut document = MemoryDocument::new();
        let container = document.create_container("div");
        Self {
            root: FiberRoot::new(document),
            container,
            content: None,
        }
    }

    /// Install `content` and drain the resulting generation.
    pub fn set_content(&mut self, content: Element) -> Result<(), RenderError> {
        self.schedule(content)?;
        self.pump_until_idle()
    }

    /// Install `content` without performing any work yet.
    pub fn schedule(&mut self, content: Element) -> Result<(), RenderError> {
        self.root.render(content.clone(), self.container)?;
        self.content = Some(content);
        Ok(())
    }

    /// Render the installed content again and drain.
    pub fn rerender(&mut self) -> Result<(), RenderError> {
        if let Some(content) = self.content.clone() {
            self.root.render(content, self.container)?;
        }
        self.pump_until_idle()
    }

    /// Perform exactly one unit of work, committing if it was the last one.
    pub fn step(&mut self) -> Result<WorkStatus, RenderError> {
        self.root.work_loop(&UnitBudget::new(1))
    }

    /// Drive the root until no generation is in flight and no update is pending.
    pub fn pump_until_idle(&mut self) -> Result<(), RenderError> {
        self.root.flush().map(|_| ())
    }

    /// Fire `event` at `node`, then drain any updates its listeners requested.
    /// Returns how many listeners ran.
    pub fn dispatch(&mut self, node: HostId, event: &str) -> Result<usize, RenderError> {
        let handled = self.root.host().dispatch(node, event);
        self.pump_until_idle()?;
        Ok(handled)
    }

    pub fn click(&mut self, node: HostId) -> Result<usize, RenderError> {
        self.dispatch(node, "click")
    }

    /// Serialized children of the container.
    pub fn html(&self) -> String {
        self.root.host().inner_html(self.container)
    }

    /// Elements below the container with the given tag, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<HostId> {
        self.root.host().find_by_tag(self.container, tag)
    }

    pub fn document(&self) -> &MemoryDocument {
        self.root.host()
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        self.root.host_mut().take_mutations()
    }

    pub fn container(&self) -> HostId {
        self.container
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.root.runtime_handle()
    }

    /// Returns whether content has been installed in this harness.
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Gain mutable access to the raw root for advanced scenarios.
    pub fn root(&mut self) -> &mut FiberRoot<MemoryDocument> {
        &mut self.root
    }
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `TestRoot`.
pub fn run_test_root<R>(f: impl FnOnce(&mut TestRoot) -> R) -> R {
    let mut root = TestRoot::new();
    f(&mut root)
}
