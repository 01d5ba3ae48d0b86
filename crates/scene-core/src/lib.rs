//! Platform-free core of the contact-section scene: scene graph, procedural
//! laptop model, pointer orientation, render loop and viewport lifecycle.
//!
//! The web crate supplies the host container, frame scheduler and graphics
//! backend; tests supply recording stubs for the same traits.

pub mod camera;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod model;
pub mod orientation;
pub mod resources;
pub mod scene;
pub mod schedule;
pub mod viewport;

pub use camera::Camera;
pub use clock::{oscillate, AnimationClock, InstantClock};
pub use config::SceneConfig;
pub use error::{AttachmentError, ConfigError, MountError, ResourceError, RuntimeTickError};
pub use host::{
    pixel_size, EventHandler, FrameView, GraphicsBackend, GraphicsContext, HostContainer, HostEvent,
    ListenerKind,
};
pub use model::{AttachedModel, ModelHandle, ModelParts, ProceduralModel};
pub use orientation::{
    normalize_pointer, step, Orientation, PointerOrientationController, PointerState,
    ViewportBounds,
};
pub use resources::{default_lights, SceneResources};
pub use scene::{Drawable, Light, Material, Mesh, Node, NodeId, SceneGraph, Shading, Transform};
pub use schedule::{FrameScheduler, FrameTask, LoopState, RenderLoop, TaskHandle};
pub use viewport::Viewport;
