// Recording stubs for the host, graphics and scheduling traits.

#![allow(dead_code)]

use scene_core::*;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::rc::Rc;

// ---------------- Scheduler ----------------

#[derive(Default)]
struct SchedulerInner {
    next_id: u64,
    tasks: BTreeMap<u64, Option<FrameTask>>,
    cancelled: u32,
}

/// Frames only advance when the test calls `run_frame`.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl FrameScheduler for ManualScheduler {
    fn schedule(&self, task: FrameTask) -> TaskHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.tasks.insert(id, Some(task));
        TaskHandle(id)
    }

    fn cancel(&self, handle: TaskHandle) {
        let mut inner = self.inner.borrow_mut();
        if inner.tasks.remove(&handle.0).is_some() {
            inner.cancelled += 1;
        }
    }
}

impl ManualScheduler {
    /// Run every pending task once. Returns how many ran.
    pub fn run_frame(&self) -> usize {
        let ids: Vec<u64> = self.inner.borrow().tasks.keys().copied().collect();
        let mut ran = 0;
        for id in ids {
            let task = self
                .inner
                .borrow_mut()
                .tasks
                .get_mut(&id)
                .and_then(|slot| slot.take());
            let Some(mut task) = task else {
                continue;
            };
            ran += 1;
            let flow = task();
            let mut inner = self.inner.borrow_mut();
            if let ControlFlow::Continue(()) = flow {
                // A task cancelled during its own run has no slot left.
                if let Some(slot) = inner.tasks.get_mut(&id) {
                    *slot = Some(task);
                }
            } else {
                inner.tasks.remove(&id);
            }
        }
        ran
    }

    pub fn run_frames(&self, n: usize) {
        for _ in 0..n {
            self.run_frame();
        }
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    pub fn cancelled(&self) -> u32 {
        self.inner.borrow().cancelled
    }
}

// ---------------- Clock ----------------

#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn set(&self, secs: f64) {
        self.now.set(secs);
    }
}

impl AnimationClock for ManualClock {
    fn elapsed_secs(&self) -> f64 {
        self.now.get()
    }
}

// ---------------- Host container ----------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StubSurface(pub u32);

struct ContainerInner {
    attached: bool,
    bounds: ViewportBounds,
    surfaces: Vec<StubSurface>,
    next_listener: u64,
    listeners: BTreeMap<u64, (ListenerKind, Option<EventHandler>)>,
    fail_listener: Option<ListenerKind>,
    remove_after_attach: bool,
}

#[derive(Clone)]
pub struct StubContainer {
    inner: Rc<RefCell<ContainerInner>>,
}

impl StubContainer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ContainerInner {
                attached: true,
                bounds: ViewportBounds::sized(width, height),
                surfaces: Vec::new(),
                next_listener: 0,
                listeners: BTreeMap::new(),
                fail_listener: None,
                remove_after_attach: false,
            })),
        }
    }

    pub fn detached(self) -> Self {
        self.inner.borrow_mut().attached = false;
        self
    }

    pub fn failing_listener(self, kind: ListenerKind) -> Self {
        self.inner.borrow_mut().fail_listener = Some(kind);
        self
    }

    /// Simulate the page removing the container while the context loads.
    pub fn removed_after_attach(self) -> Self {
        self.inner.borrow_mut().remove_after_attach = true;
        self
    }

    pub fn set_size(&self, width: f32, height: f32) {
        let mut inner = self.inner.borrow_mut();
        inner.bounds.width = width;
        inner.bounds.height = height;
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn surfaces(&self) -> Vec<StubSurface> {
        self.inner.borrow().surfaces.clone()
    }

    pub fn fire(&self, kind: ListenerKind, event: HostEvent) {
        let ids: Vec<u64> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|(_, (k, _))| *k == kind)
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            let handler = self
                .inner
                .borrow_mut()
                .listeners
                .get_mut(&id)
                .and_then(|(_, h)| h.take());
            if let Some(mut handler) = handler {
                handler(event);
                if let Some((_, slot)) = self.inner.borrow_mut().listeners.get_mut(&id) {
                    *slot = Some(handler);
                }
            }
        }
    }

    pub fn pointer_move(&self, client_x: f32, client_y: f32) {
        self.fire(ListenerKind::PointerMove, HostEvent::PointerMove { client_x, client_y });
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.set_size(width, height);
        self.fire(ListenerKind::WindowResize, HostEvent::Resize);
    }
}

impl HostContainer for StubContainer {
    type Surface = StubSurface;
    type Subscription = u64;

    fn is_attached(&self) -> bool {
        self.inner.borrow().attached
    }

    fn measure(&self) -> ViewportBounds {
        self.inner.borrow().bounds
    }

    fn attach_surface(&self, surface: &StubSurface) -> Result<(), AttachmentError> {
        let mut inner = self.inner.borrow_mut();
        if !inner.surfaces.is_empty() {
            return Err(AttachmentError::Occupied);
        }
        inner.surfaces.push(*surface);
        if inner.remove_after_attach {
            inner.attached = false;
        }
        Ok(())
    }

    fn detach_surface(&self, surface: &StubSurface) {
        self.inner.borrow_mut().surfaces.retain(|s| s != surface);
    }

    fn add_listener(
        &self,
        kind: ListenerKind,
        handler: EventHandler,
    ) -> Result<u64, AttachmentError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_listener == Some(kind) {
            return Err(AttachmentError::Listener(kind.event_name()));
        }
        inner.next_listener += 1;
        let id = inner.next_listener;
        inner.listeners.insert(id, (kind, Some(handler)));
        Ok(id)
    }

    fn remove_listener(&self, subscription: u64) {
        self.inner.borrow_mut().listeners.remove(&subscription);
    }
}

// ---------------- Graphics backend ----------------

#[derive(Default)]
pub struct RecorderState {
    pub frames: u32,
    pub disposed: bool,
    pub dispose_calls: u32,
    pub resizes: Vec<(u32, u32)>,
    pub fail_render: bool,
    pub last_drawables: usize,
    pub last_aspect: f32,
}

#[derive(Clone, Default)]
pub struct ContextRecorder(pub Rc<RefCell<RecorderState>>);

impl ContextRecorder {
    pub fn frames(&self) -> u32 {
        self.0.borrow().frames
    }

    pub fn is_disposed(&self) -> bool {
        self.0.borrow().disposed
    }

    pub fn resizes(&self) -> Vec<(u32, u32)> {
        self.0.borrow().resizes.clone()
    }

    pub fn fail_next_render(&self) {
        self.0.borrow_mut().fail_render = true;
    }
}

pub struct StubContext {
    recorder: ContextRecorder,
}

impl GraphicsContext for StubContext {
    fn resize(&mut self, width: u32, height: u32) {
        self.recorder.0.borrow_mut().resizes.push((width, height));
    }

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), RuntimeTickError> {
        let mut st = self.recorder.0.borrow_mut();
        if st.disposed {
            return Err(RuntimeTickError::Disposed);
        }
        if st.fail_render {
            return Err(RuntimeTickError::Render("device lost".into()));
        }
        st.frames += 1;
        st.last_drawables = frame.scene.drawables().len();
        st.last_aspect = frame.camera.aspect;
        Ok(())
    }

    fn dispose(&mut self) {
        let mut st = self.recorder.0.borrow_mut();
        st.dispose_calls += 1;
        st.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.recorder.0.borrow().disposed
    }
}

#[derive(Default)]
pub struct StubBackend {
    pub recorder: ContextRecorder,
    pub fail_context: bool,
    surfaces_created: Cell<u32>,
}

impl StubBackend {
    pub fn failing() -> Self {
        Self {
            fail_context: true,
            ..Self::default()
        }
    }

    pub fn surfaces_created(&self) -> u32 {
        self.surfaces_created.get()
    }
}

impl GraphicsBackend for StubBackend {
    type Surface = StubSurface;
    type Context = StubContext;

    fn create_surface(&self, _width: u32, _height: u32) -> Result<StubSurface, ResourceError> {
        self.surfaces_created.set(self.surfaces_created.get() + 1);
        Ok(StubSurface(self.surfaces_created.get()))
    }

    async fn create_context(
        &self,
        _surface: &StubSurface,
        _width: u32,
        _height: u32,
    ) -> Result<StubContext, ResourceError> {
        if self.fail_context {
            return Err(ResourceError::NoAdapter);
        }
        Ok(StubContext {
            recorder: self.recorder.clone(),
        })
    }
}

pub type TestViewport = Viewport<StubContainer, StubBackend, ManualScheduler>;

pub fn mount(
    container: &StubContainer,
    backend: &StubBackend,
    scheduler: &ManualScheduler,
    clock: &ManualClock,
    config: SceneConfig,
) -> Result<TestViewport, MountError> {
    pollster::block_on(Viewport::mount(
        container.clone(),
        backend,
        scheduler.clone(),
        Box::new(clock.clone()),
        config,
    ))
}
