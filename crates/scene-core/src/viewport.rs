//! Mount/unmount orchestration for one scene viewport.
//!
//! Every resource acquired during mount is pushed onto a cleanup stack and
//! released in reverse order, on `unmount`, on drop, or when a later mount
//! step fails. The render loop is always acquired last, so its pending frame
//! is cancelled before any listener or graphics resource goes away.

use crate::clock::{oscillate, AnimationClock};
use crate::config::SceneConfig;
use crate::error::{AttachmentError, MountError, RuntimeTickError};
use crate::host::{
    pixel_size, EventHandler, GraphicsBackend, HostContainer, HostEvent, ListenerKind,
};
use crate::model::{AttachedModel, ProceduralModel};
use crate::orientation::{self, Orientation, PointerOrientationController};
use crate::resources::SceneResources;
use crate::schedule::{FrameScheduler, LoopState, RenderLoop};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type ErrorHook = Box<dyn FnMut(&RuntimeTickError)>;

enum Acquired<L> {
    Resources,
    Listener(ListenerKind, L),
    RenderLoop,
}

struct ViewportState<H, G: GraphicsBackend> {
    container: H,
    resources: SceneResources<G>,
    model: AttachedModel,
    controller: PointerOrientationController,
    current: Orientation,
    config: SceneConfig,
    clock: Box<dyn AnimationClock>,
    // Latest measured size, applied by the next tick.
    pending_size: Option<(u32, u32)>,
}

impl<H, G> ViewportState<H, G>
where
    H: HostContainer<Surface = G::Surface>,
    G: GraphicsBackend,
{
    fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::PointerMove { client_x, client_y } => {
                let bounds = self.container.measure();
                self.controller.on_pointer_move(bounds, client_x, client_y);
            }
            HostEvent::Resize => {
                self.pending_size = Some(pixel_size(self.container.measure()));
            }
        }
    }

    fn tick(&mut self) -> Result<(), RuntimeTickError> {
        if self.resources.is_disposed() {
            return Err(RuntimeTickError::Disposed);
        }
        if let Some((w, h)) = self.pending_size.take() {
            self.resources.resize(w, h);
        }

        let target = self.controller.target();
        self.current = orientation::step(self.current, target, self.config.smoothing);

        let t = self.clock.elapsed_secs();
        let cfg = &self.config;
        let bob = oscillate(t, 0.0, cfg.bob_amplitude, cfg.bob_rate);
        let glow = oscillate(t, cfg.glow_base, cfg.glow_amplitude, cfg.glow_rate);

        let parts = &self.model.parts;
        let scene = self.resources.scene_mut();
        let root = scene.node_mut(parts.root);
        root.transform.rotation.x = self.current.pitch;
        root.transform.rotation.y = self.current.yaw;
        root.transform.position = self.model.base_position + Vec3::Y * bob;
        scene.material_mut(parts.display_material).opacity = glow;

        self.resources.render_frame()
    }
}

pub struct Viewport<H, G, S>
where
    H: HostContainer<Surface = G::Surface> + 'static,
    G: GraphicsBackend + 'static,
    S: FrameScheduler,
{
    state: Rc<RefCell<ViewportState<H, G>>>,
    scheduler: S,
    render_loop: RenderLoop,
    cleanup: Vec<Acquired<H::Subscription>>,
    tick_error: Rc<RefCell<Option<RuntimeTickError>>>,
    error_hook: Rc<RefCell<Option<ErrorHook>>>,
}

impl<H, G, S> Viewport<H, G, S>
where
    H: HostContainer<Surface = G::Surface> + 'static,
    G: GraphicsBackend + 'static,
    S: FrameScheduler,
{
    /// Mount a scene into `container` and start rendering.
    ///
    /// Any failure after the first acquisition releases what was acquired
    /// before returning the error.
    pub async fn mount(
        container: H,
        backend: &G,
        scheduler: S,
        clock: Box<dyn AnimationClock>,
        config: SceneConfig,
    ) -> Result<Self, MountError> {
        config.validate()?;
        if !container.is_attached() {
            return Err(AttachmentError::Detached.into());
        }
        let (width, height) = pixel_size(container.measure());
        let mut resources =
            SceneResources::initialize(backend, &container, width, height, &config).await?;
        if !container.is_attached() {
            resources.dispose(&container);
            return Err(AttachmentError::RemovedDuringMount.into());
        }

        let scene_root = resources.scene().root();
        let model = ProceduralModel::build().attach(
            resources.scene_mut(),
            scene_root,
            Vec3::new(0.0, config.model_offset_y, 0.0),
        );

        let state = ViewportState {
            container,
            resources,
            model,
            controller: PointerOrientationController::from_config(&config),
            current: Orientation::default(),
            config,
            clock,
            pending_size: None,
        };
        let mut viewport = Self {
            state: Rc::new(RefCell::new(state)),
            scheduler,
            render_loop: RenderLoop::new(),
            cleanup: vec![Acquired::Resources],
            tick_error: Rc::new(RefCell::new(None)),
            error_hook: Rc::new(RefCell::new(None)),
        };

        // From here on, an early return drops `viewport`, which unwinds.
        viewport.listen(ListenerKind::PointerMove)?;
        viewport.listen(ListenerKind::WindowResize)?;
        viewport.start_loop();
        log::info!("[viewport] mounted at {width}x{height}");
        Ok(viewport)
    }

    fn listen(&mut self, kind: ListenerKind) -> Result<(), AttachmentError> {
        let weak: Weak<RefCell<ViewportState<H, G>>> = Rc::downgrade(&self.state);
        let handler: EventHandler = Box::new(move |event| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            match state.try_borrow_mut() {
                Ok(mut st) => st.handle_event(event),
                Err(_) => log::warn!("[viewport] dropped {:?} while busy", event),
            };
        });
        let subscription = self.state.borrow().container.add_listener(kind, handler)?;
        self.cleanup.push(Acquired::Listener(kind, subscription));
        Ok(())
    }

    fn start_loop(&mut self) {
        let weak = Rc::downgrade(&self.state);
        let tick_error = self.tick_error.clone();
        let error_hook = self.error_hook.clone();
        let started = self.render_loop.start(
            &self.scheduler,
            move || {
                let state = weak.upgrade().ok_or(RuntimeTickError::Disposed)?;
                let mut st = state.try_borrow_mut().map_err(|_| RuntimeTickError::Reentrant)?;
                st.tick()
            },
            move |err| {
                log::error!("[loop] tick failed, loop stopped: {err}");
                if let Some(hook) = error_hook.borrow_mut().as_mut() {
                    hook(&err);
                }
                *tick_error.borrow_mut() = Some(err);
            },
        );
        if started {
            self.cleanup.push(Acquired::RenderLoop);
        }
    }

    /// Tear everything down. Safe to call more than once.
    pub fn unmount(&mut self) {
        if self.cleanup.is_empty() {
            return;
        }
        while let Some(item) = self.cleanup.pop() {
            match item {
                Acquired::RenderLoop => self.render_loop.stop(&self.scheduler),
                Acquired::Listener(kind, subscription) => {
                    self.state.borrow().container.remove_listener(subscription);
                    log::debug!("[viewport] removed {} listener", kind.event_name());
                }
                Acquired::Resources => {
                    let mut st = self.state.borrow_mut();
                    let st = &mut *st;
                    st.resources.dispose(&st.container);
                }
            }
        }
        log::info!("[viewport] unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        !self.cleanup.is_empty()
    }

    pub fn loop_state(&self) -> LoopState {
        self.render_loop.state()
    }

    pub fn ticks(&self) -> u64 {
        self.render_loop.ticks()
    }

    /// `(current, target)` orientation of the model.
    pub fn orientation(&self) -> (Orientation, Orientation) {
        let st = self.state.borrow();
        (st.current, st.controller.target())
    }

    /// Register a callback for a tick failure; the loop has already stopped
    /// when it runs.
    pub fn on_tick_error(&self, hook: impl FnMut(&RuntimeTickError) + 'static) {
        *self.error_hook.borrow_mut() = Some(Box::new(hook));
    }

    pub fn take_tick_error(&self) -> Option<RuntimeTickError> {
        self.tick_error.borrow_mut().take()
    }

    pub fn model(&self) -> AttachedModel {
        self.state.borrow().model.clone()
    }

    pub fn with_resources<R>(&self, f: impl FnOnce(&SceneResources<G>) -> R) -> R {
        f(&self.state.borrow().resources)
    }
}

impl<H, G, S> Drop for Viewport<H, G, S>
where
    H: HostContainer<Surface = G::Surface> + 'static,
    G: GraphicsBackend + 'static,
    S: FrameScheduler,
{
    fn drop(&mut self) {
        self.unmount();
    }
}
