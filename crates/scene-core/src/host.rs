//! Capabilities the scene needs from its host page and graphics stack.

use crate::camera::Camera;
use crate::error::{AttachmentError, ResourceError, RuntimeTickError};
use crate::orientation::ViewportBounds;
use crate::scene::{Light, SceneGraph};
use glam::Vec3;
use std::future::Future;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Pointer movement scoped to the container.
    PointerMove,
    /// Window-level resize.
    WindowResize,
}

impl ListenerKind {
    pub fn event_name(self) -> &'static str {
        match self {
            ListenerKind::PointerMove => "pointermove",
            ListenerKind::WindowResize => "resize",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    PointerMove { client_x: f32, client_y: f32 },
    Resize,
}

pub type EventHandler = Box<dyn FnMut(HostEvent)>;

/// The rectangular element the scene is mounted into.
pub trait HostContainer {
    type Surface: 'static;
    type Subscription: 'static;

    /// Whether the container is still part of a live document.
    fn is_attached(&self) -> bool;
    fn measure(&self) -> ViewportBounds;
    /// A container holds at most one mounted surface at a time; attaching a
    /// second fails with [`AttachmentError::Occupied`].
    fn attach_surface(&self, surface: &Self::Surface) -> Result<(), AttachmentError>;
    fn detach_surface(&self, surface: &Self::Surface);
    fn add_listener(
        &self,
        kind: ListenerKind,
        handler: EventHandler,
    ) -> Result<Self::Subscription, AttachmentError>;
    fn remove_listener(&self, subscription: Self::Subscription);
}

/// Everything a context needs to draw one frame.
pub struct FrameView<'a> {
    pub scene: &'a SceneGraph,
    pub lights: &'a [Light],
    pub camera: &'a Camera,
    pub clear_color: Vec3,
}

pub trait GraphicsBackend {
    type Surface: 'static;
    type Context: GraphicsContext + 'static;

    /// Create the drawable surface. Sizes are CSS pixels.
    fn create_surface(&self, width: u32, height: u32) -> Result<Self::Surface, ResourceError>;

    /// Acquire a context that draws into `surface`.
    fn create_context(
        &self,
        surface: &Self::Surface,
        width: u32,
        height: u32,
    ) -> impl Future<Output = Result<Self::Context, ResourceError>>;
}

pub trait GraphicsContext {
    fn resize(&mut self, width: u32, height: u32);
    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), RuntimeTickError>;
    /// Release GPU resources. Must tolerate repeated calls.
    fn dispose(&mut self);
    fn is_disposed(&self) -> bool;
}

/// Round measured bounds to whole pixels, never below one.
#[inline]
pub fn pixel_size(bounds: ViewportBounds) -> (u32, u32) {
    let w = bounds.width.max(0.0).round() as u32;
    let h = bounds.height.max(0.0).round() as u32;
    (
        w.max(crate::constants::MIN_VIEWPORT_PX),
        h.max(crate::constants::MIN_VIEWPORT_PX),
    )
}
