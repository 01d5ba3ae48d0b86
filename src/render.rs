use crate::constants::{INITIAL_INSTANCE_CAPACITY, MAX_POINT_LIGHTS};
use crate::dom;
use glam::Vec3;
use scene_core::{
    FrameView, GraphicsBackend, GraphicsContext, Light, Mesh, ResourceError, RuntimeTickError,
    Shading,
};
use web_sys as web;
use wgpu::util::DeviceExt;

mod helpers;
mod instance;
mod mesh;

use instance::{srgb_to_linear, InstanceRaw};
use mesh::{Primitive, Vertex};

const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const INSTANCE_ATTRS: [wgpu::VertexAttribute; 9] = wgpu::vertex_attr_array![
    2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4,
    6 => Float32x4, 7 => Float32x4, 8 => Float32x4,
    9 => Float32x4, 10 => Float32x4
];

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    ambient: [f32; 4],
    key_dir: [f32; 4],
    key_color: [f32; 4],
    point_pos: [[f32; 4]; MAX_POINT_LIGHTS],
    point_color: [[f32; 4]; MAX_POINT_LIGHTS],
    counts: [u32; 4],
}

fn pack_lights(lights: &[Light], u: &mut SceneUniforms) {
    let mut ambient = Vec3::ZERO;
    let mut key = None;
    let mut points = 0usize;
    for light in lights {
        match *light {
            Light::Ambient { color, intensity } => ambient += srgb_to_linear(color) * intensity,
            Light::Directional {
                color,
                intensity,
                position,
            } if key.is_none() => {
                key = Some((position.normalize_or_zero(), srgb_to_linear(color) * intensity))
            }
            Light::Point {
                color,
                intensity,
                position,
            } if points < MAX_POINT_LIGHTS => {
                u.point_pos[points] = position.extend(1.0).to_array();
                u.point_color[points] = (srgb_to_linear(color) * intensity).extend(0.0).to_array();
                points += 1;
            }
            _ => log::debug!("[gpu] light ignored: {:?}", light),
        }
    }
    u.ambient = ambient.extend(0.0).to_array();
    if let Some((dir, color)) = key {
        u.key_dir = dir.extend(0.0).to_array();
        u.key_color = color.extend(0.0).to_array();
    }
    u.counts = [points as u32, 0, 0, 0];
}

#[derive(Default)]
struct Batches {
    instances: Vec<InstanceRaw>,
    // (primitive, instance range, blended)
    draws: Vec<(Primitive, std::ops::Range<u32>, bool)>,
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    opaque_pipeline: wgpu::RenderPipeline,
    blended_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    cube: Primitive,
    plane: Primitive,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    batches: Batches,
}

impl GpuState {
    async fn new(canvas: web::HtmlCanvasElement) -> Result<Self, ResourceError> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
            .map_err(|e| ResourceError::Surface(e.to_string()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ResourceError::NoAdapter)?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Default limits; older WebGPU impls reject unknown fields
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| ResourceError::Device(format!("{:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| ResourceError::Surface("no supported surface format".into()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = helpers::create_depth_view(&device, width, height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::constants::SCENE_WGSL.into()),
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let buffers = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &VERTEX_ATTRS,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<InstanceRaw>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &INSTANCE_ATTRS,
            },
        ];
        let opaque_pipeline =
            helpers::make_mesh_pipeline(&device, &pl, &shader, &buffers, format, false);
        let blended_pipeline =
            helpers::make_mesh_pipeline(&device, &pl, &shader, &buffers, format, true);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let (vertices, indices, cube, plane) = mesh::primitive_buffers();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vb"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_ib"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = create_instance_buffer(&device, INITIAL_INSTANCE_CAPACITY);

        log::info!("[gpu] surface {:?} {}x{}", format, width, height);
        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            opaque_pipeline,
            blended_pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            index_buffer,
            cube,
            plane,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCE_CAPACITY,
            batches: Batches::default(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if self.config.width == width && self.config.height == height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = helpers::create_depth_view(&self.device, width, height);
    }

    // Opaque buckets first, then blended, each split by primitive.
    fn build_batches(&mut self, frame: &FrameView<'_>) {
        let drawables = frame.scene.drawables();
        let batches = &mut self.batches;
        batches.instances.clear();
        batches.draws.clear();
        for blended in [false, true] {
            for is_plane in [false, true] {
                let start = batches.instances.len() as u32;
                let in_bucket = |d: &&scene_core::Drawable<'_>| {
                    d.material.is_blended() == blended
                        && matches!(d.mesh, Mesh::Plane { .. }) == is_plane
                };
                for d in drawables.iter().filter(in_bucket) {
                    batches.instances.push(InstanceRaw::new(
                        d.world,
                        d.mesh.extent(),
                        d.material.color,
                        d.material.opacity,
                        d.material.shininess,
                        d.material.shading == Shading::Unlit,
                    ));
                }
                let end = batches.instances.len() as u32;
                if end > start {
                    let prim = if is_plane { self.plane } else { self.cube };
                    batches.draws.push((prim, start..end, blended));
                }
            }
        }
    }

    fn upload(&mut self, frame: &FrameView<'_>) {
        let needed = self.batches.instances.len();
        if needed > self.instance_capacity {
            self.instance_capacity = needed.next_power_of_two();
            self.instance_buffer = create_instance_buffer(&self.device, self.instance_capacity);
            log::debug!("[gpu] instance buffer grown to {}", self.instance_capacity);
        }
        if needed > 0 {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&self.batches.instances),
            );
        }

        let mut u = SceneUniforms {
            view_proj: frame.camera.view_projection().to_cols_array_2d(),
            eye: frame.camera.eye.extend(1.0).to_array(),
            ..bytemuck::Zeroable::zeroed()
        };
        pack_lights(frame.lights, &mut u);
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&u));
    }

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), RuntimeTickError> {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("[gpu] surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(RuntimeTickError::Render(format!("{:?}", e))),
        };
        self.build_batches(frame);
        self.upload(frame);

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let clear = srgb_to_linear(frame.clear_color);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("encoder") });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.x as f64,
                            g: clear.y as f64,
                            b: clear.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rpass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            for (prim, range, blended) in &self.batches.draws {
                rpass.set_pipeline(if *blended {
                    &self.blended_pipeline
                } else {
                    &self.opaque_pipeline
                });
                rpass.draw_indexed(
                    prim.first_index..prim.first_index + prim.index_count,
                    prim.base_vertex,
                    range.clone(),
                );
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("instances"),
        size: (std::mem::size_of::<InstanceRaw>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// WebGPU backend drawing into a canvas created per mount.
pub struct WgpuBackend;

impl GraphicsBackend for WgpuBackend {
    type Surface = web::HtmlCanvasElement;
    type Context = GpuContext;

    fn create_surface(
        &self,
        width: u32,
        height: u32,
    ) -> Result<web::HtmlCanvasElement, ResourceError> {
        dom::create_canvas(width, height)
    }

    async fn create_context(
        &self,
        surface: &web::HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<GpuContext, ResourceError> {
        let gpu = GpuState::new(surface.clone()).await?;
        Ok(GpuContext {
            canvas: surface.clone(),
            css_size: (width, height),
            gpu: Some(gpu),
        })
    }
}

pub struct GpuContext {
    canvas: web::HtmlCanvasElement,
    // Last size requested by the viewport, in CSS pixels.
    css_size: (u32, u32),
    gpu: Option<GpuState>,
}

impl GpuContext {
    // devicePixelRatio can change without the CSS size changing (e.g. the
    // window moves to another monitor), so this runs every frame too.
    fn sync_backing_size(&mut self) {
        let (w, h) = self.css_size;
        if !dom::set_canvas_backing_size(&self.canvas, w, h) {
            return;
        }
        if let Some(g) = &mut self.gpu {
            g.resize(self.canvas.width(), self.canvas.height());
        }
        log::debug!("[gpu] backing store {}x{}", self.canvas.width(), self.canvas.height());
    }
}

impl GraphicsContext for GpuContext {
    /// `width`/`height` are CSS pixels; the backing store follows devicePixelRatio.
    fn resize(&mut self, width: u32, height: u32) {
        self.css_size = (width, height);
        self.sync_backing_size();
    }

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), RuntimeTickError> {
        if self.gpu.is_none() {
            return Err(RuntimeTickError::Disposed);
        }
        self.sync_backing_size();
        self.gpu.as_mut().ok_or(RuntimeTickError::Disposed)?.render(frame)
    }

    fn dispose(&mut self) {
        if let Some(g) = self.gpu.take() {
            g.device.destroy();
            log::debug!("[gpu] device destroyed");
        }
    }

    fn is_disposed(&self) -> bool {
        self.gpu.is_none()
    }
}
