// Web-side constants: DOM wiring and GPU buffer sizing.

// Element the scene mounts into on start, when present.
pub const CONTAINER_ID: &str = "contact-scene";

// Marks canvases this crate created, so a remount can clear stale ones.
pub const SURFACE_ATTR: &str = "data-scene-surface";

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// Initial instance buffer capacity; grows on demand.
pub const INITIAL_INSTANCE_CAPACITY: usize = 64;

// Point lights beyond this are ignored by the shader.
pub const MAX_POINT_LIGHTS: usize = 4;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
