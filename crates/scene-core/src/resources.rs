//! Graphics context, camera, lights and scene root for one viewport.

use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::error::{MountError, RuntimeTickError};
use crate::host::{FrameView, GraphicsBackend, GraphicsContext, HostContainer};
use crate::scene::{rgb_from_hex, Light, SceneGraph};
use glam::Vec3;

pub struct SceneResources<G: GraphicsBackend> {
    surface: G::Surface,
    context: G::Context,
    camera: Camera,
    lights: Vec<Light>,
    scene: SceneGraph,
    clear_color: Vec3,
    size: (u32, u32),
    disposed: bool,
}

impl<G: GraphicsBackend> SceneResources<G> {
    /// Create the surface, attach it to `container` and acquire a context.
    ///
    /// On failure nothing stays attached to the container.
    pub async fn initialize<H>(
        backend: &G,
        container: &H,
        width: u32,
        height: u32,
        config: &SceneConfig,
    ) -> Result<Self, MountError>
    where
        H: HostContainer<Surface = G::Surface>,
    {
        let surface = backend.create_surface(width, height)?;
        container.attach_surface(&surface)?;
        let context = match backend.create_context(&surface, width, height).await {
            Ok(context) => context,
            Err(err) => {
                log::error!("[gpu] context unavailable: {err}");
                container.detach_surface(&surface);
                return Err(err.into());
            }
        };
        log::info!("[gpu] context ready at {width}x{height}");
        Ok(Self {
            surface,
            context,
            camera: Camera::from_config(config, width, height),
            lights: default_lights(),
            scene: SceneGraph::new("scene"),
            clear_color: rgb_from_hex(config.clear_color),
            size: (width, height),
            disposed: false,
        })
    }

    /// Match camera aspect and surface size to the viewport. Returns `false`
    /// when the size is unchanged or the resources are already disposed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.disposed || self.size == (width, height) {
            return false;
        }
        self.size = (width, height);
        self.camera.set_viewport(width, height);
        self.context.resize(width, height);
        log::debug!("[gpu] resized to {width}x{height}");
        true
    }

    pub fn render_frame(&mut self) -> Result<(), RuntimeTickError> {
        if self.disposed || self.context.is_disposed() {
            return Err(RuntimeTickError::Disposed);
        }
        let frame = FrameView {
            scene: &self.scene,
            lights: &self.lights,
            camera: &self.camera,
            clear_color: self.clear_color,
        };
        self.context.render(&frame)
    }

    /// Release the context and detach the surface. Returns `true` only for the
    /// call that actually released them.
    pub fn dispose<H>(&mut self, container: &H) -> bool
    where
        H: HostContainer<Surface = G::Surface>,
    {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        self.context.dispose();
        container.detach_surface(&self.surface);
        log::info!("[gpu] context released");
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn context(&self) -> &G::Context {
        &self.context
    }
}

/// Soft ambient fill, one white key light and two coloured accents.
pub fn default_lights() -> Vec<Light> {
    vec![
        Light::Ambient {
            color: rgb_from_hex(0x404040),
            intensity: 0.4,
        },
        Light::Directional {
            color: Vec3::ONE,
            intensity: 0.8,
            position: Vec3::new(5.0, 5.0, 5.0),
        },
        Light::Point {
            color: rgb_from_hex(0x00ffaa),
            intensity: 0.6,
            position: Vec3::new(-3.0, 3.0, 3.0),
        },
        Light::Point {
            color: rgb_from_hex(0xaa00ff),
            intensity: 0.4,
            position: Vec3::new(3.0, -2.0, 2.0),
        },
    ]
}
