//! wgpu renderer for the desktop front-end.
//!
//! The vortex draws into a persistent canvas texture that is never cleared
//! between frames, so the translucent fade rect leaves trails the same way
//! the browser canvas does. Each frame the canvas is copied into a scene
//! texture, section frames are drawn on top, and a present pass applies the
//! glitch, invert and collapse effects on the way to the swapchain.

use glam::Vec2;
use tunnel_core::{Rgba, Surface};
use winit::window::Window;

const CANVAS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const PERSPECTIVE: f32 = 1_000.0; // px, matches the page's CSS perspective

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PaintUniforms {
    viewport: [f32; 2],
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct PresentUniforms {
    invert: f32,
    glitch: f32,
    collapse: f32,
    time: f32,
}

/// Body-level effects applied by the present pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct PresentFx {
    pub invert: bool,
    pub glitch: bool,
    pub collapse: f32,
    pub time: f32,
}

/// CPU-side triangle list in pixel coordinates (origin top-left).
pub struct PaintBatch {
    size: Vec2,
    vertices: Vec<Vertex>,
}

impl PaintBatch {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            vertices: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    fn quad(&mut self, corners: [Vec2; 4], color: Rgba) {
        let color = color.to_array();
        let v = |p: Vec2| Vertex {
            pos: p.to_array(),
            color,
        };
        let [a, b, c, d] = corners;
        self.vertices
            .extend_from_slice(&[v(a), v(b), v(c), v(a), v(c), v(d)]);
    }

    /// Outline of an axis-aligned rectangle centered at `center`.
    pub fn frame(&mut self, center: Vec2, half: Vec2, color: Rgba, width: f32) {
        let tl = center - half;
        let br = center + half;
        let tr = Vec2::new(br.x, tl.y);
        let bl = Vec2::new(tl.x, br.y);
        for (a, b) in [(tl, tr), (tr, br), (br, bl), (bl, tl)] {
            self.line(a, b, color, width);
        }
    }
}

impl Surface for PaintBatch {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) {
        let end = origin + size;
        self.quad(
            [origin, Vec2::new(end.x, origin.y), end, Vec2::new(origin.x, end.y)],
            color,
        );
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        let dir = to - from;
        let len = dir.length();
        if len <= f32::EPSILON {
            return;
        }
        let n = dir.perp() / len * (width * 0.5);
        self.quad([from + n, to + n, to - n, from - n], color);
    }
}

/// Screen-space center and half extent of a section frame at `view_z`,
/// projected with the page perspective. `None` once it is behind the eye.
pub fn project_section(viewport: Vec2, view_z: f32, offset: Vec2) -> Option<(Vec2, Vec2)> {
    if view_z >= PERSPECTIVE - 1.0 {
        return None;
    }
    let scale = PERSPECTIVE / (PERSPECTIVE - view_z);
    let center = viewport * 0.5 + offset * scale;
    let half = viewport * 0.3 * scale;
    Some((center, half))
}

struct Target {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Target {
    fn new(device: &wgpu::Device, label: &str, width: u32, height: u32, usage: wgpu::TextureUsages) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CANVAS_FORMAT,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

struct VertexRing {
    buffer: wgpu::Buffer,
    capacity: usize,
    label: &'static str,
}

impl VertexRing {
    fn new(device: &wgpu::Device, label: &'static str, capacity: usize) -> Self {
        Self {
            buffer: Self::alloc(device, label, capacity),
            capacity,
            label,
        }
    }

    fn alloc(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (std::mem::size_of::<Vertex>() * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, vertices: &[Vertex]) {
        if vertices.len() > self.capacity {
            self.capacity = vertices.len().next_power_of_two();
            self.buffer = Self::alloc(device, self.label, self.capacity);
        }
        if !vertices.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(vertices));
        }
    }
}

pub struct Renderer<'w> {
    window: &'w Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    canvas: Target,
    scene: Target,
    canvas_needs_clear: bool,
    paint_pipeline: wgpu::RenderPipeline,
    paint_uniforms: wgpu::Buffer,
    paint_bind_group: wgpu::BindGroup,
    trails: VertexRing,
    overlay: VertexRing,
    present_pipeline: wgpu::RenderPipeline,
    present_layout: wgpu::BindGroupLayout,
    present_uniforms: wgpu::Buffer,
    present_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    /// Vortex drawing for this frame; persisted into the canvas.
    pub batch: PaintBatch,
    /// Section frames for this frame; drawn over the canvas copy only.
    pub sections: PaintBatch,
}

impl<'w> Renderer<'w> {
    pub async fn new(window: &'w Window) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        // The canvas is linear Rgba8Unorm; an sRGB swapchain would re-encode it.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        log::info!("[render] {}x{} {:?}", width, height, format);

        let (canvas, scene) = Self::targets(&device, width, height);

        // Paint pass: pixel-space triangles with alpha blending.
        let paint_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("paint"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/paint.wgsl").into()),
        });
        let paint_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("paint_uniforms"),
            size: std::mem::size_of::<PaintUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let paint_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("paint_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let paint_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("paint_bg"),
            layout: &paint_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: paint_uniforms.as_entire_binding(),
            }],
        });
        let paint_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("paint_pl"),
            bind_group_layouts: &[&paint_layout],
            push_constant_ranges: &[],
        });
        let paint_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("paint_pipeline"),
            layout: Some(&paint_pl),
            vertex: wgpu::VertexState {
                module: &paint_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x4,
                            offset: 8,
                            shader_location: 1,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &paint_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: CANVAS_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        // Present pass: full-screen triangle sampling the scene.
        let present_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("present"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/present.wgsl").into()),
        });
        let present_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("present_uniforms"),
            size: std::mem::size_of::<PresentUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("scene_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let present_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("present_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let present_bind_group =
            Self::present_bind_group(&device, &present_layout, &scene, &sampler, &present_uniforms);
        let present_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("present_pl"),
            bind_group_layouts: &[&present_layout],
            push_constant_ranges: &[],
        });
        let present_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("present_pipeline"),
            layout: Some(&present_pl),
            vertex: wgpu::VertexState {
                module: &present_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &present_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let trails = VertexRing::new(&device, "trail_vb", 4096);
        let overlay = VertexRing::new(&device, "section_vb", 256);
        let viewport = Vec2::new(width as f32, height as f32);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            canvas,
            scene,
            canvas_needs_clear: true,
            paint_pipeline,
            paint_uniforms,
            paint_bind_group,
            trails,
            overlay,
            present_pipeline,
            present_layout,
            present_uniforms,
            present_bind_group,
            sampler,
            batch: PaintBatch::new(viewport),
            sections: PaintBatch::new(viewport),
        })
    }

    fn targets(device: &wgpu::Device, width: u32, height: u32) -> (Target, Target) {
        let canvas = Target::new(
            device,
            "vortex_canvas",
            width,
            height,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        );
        let scene = Target::new(
            device,
            "scene",
            width,
            height,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        (canvas, scene)
    }

    fn present_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        scene: &Target,
        sampler: &wgpu::Sampler,
        uniforms: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("present_bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&scene.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
            ],
        })
    }

    pub fn window(&self) -> &'w Window {
        self.window
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.config.width as f32, self.config.height as f32)
    }

    /// Reconfigure the swapchain and reallocate the canvas (its trails are lost).
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        let (canvas, scene) = Self::targets(&self.device, new_size.width, new_size.height);
        self.canvas = canvas;
        self.scene = scene;
        self.canvas_needs_clear = true;
        self.present_bind_group = Self::present_bind_group(
            &self.device,
            &self.present_layout,
            &self.scene,
            &self.sampler,
            &self.present_uniforms,
        );
        let viewport = self.viewport();
        self.batch.resize(viewport);
        self.sections.resize(viewport);
    }

    /// Flush both batches and present one frame.
    pub fn render(&mut self, fx: PresentFx) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let viewport = self.viewport();
        self.queue.write_buffer(
            &self.paint_uniforms,
            0,
            bytemuck::bytes_of(&PaintUniforms {
                viewport: viewport.to_array(),
                _pad: [0.0; 2],
            }),
        );
        self.queue.write_buffer(
            &self.present_uniforms,
            0,
            bytemuck::bytes_of(&PresentUniforms {
                invert: if fx.invert { 1.0 } else { 0.0 },
                glitch: if fx.glitch { 1.0 } else { 0.0 },
                collapse: fx.collapse,
                time: fx.time,
            }),
        );
        self.trails
            .upload(&self.device, &self.queue, self.batch.vertices());
        self.overlay
            .upload(&self.device, &self.queue, self.sections.vertices());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        let canvas_load = if self.canvas_needs_clear {
            wgpu::LoadOp::Clear(wgpu::Color::BLACK)
        } else {
            wgpu::LoadOp::Load
        };
        Self::paint_pass(
            &mut encoder,
            "trails",
            &self.canvas.view,
            canvas_load,
            &self.paint_pipeline,
            &self.paint_bind_group,
            &self.trails.buffer,
            self.batch.vertices().len() as u32,
        );
        self.canvas_needs_clear = false;

        encoder.copy_texture_to_texture(
            self.canvas.texture.as_image_copy(),
            self.scene.texture.as_image_copy(),
            wgpu::Extent3d {
                width: self.config.width,
                height: self.config.height,
                depth_or_array_layers: 1,
            },
        );
        Self::paint_pass(
            &mut encoder,
            "sections",
            &self.scene.view,
            wgpu::LoadOp::Load,
            &self.paint_pipeline,
            &self.paint_bind_group,
            &self.overlay.buffer,
            self.sections.vertices().len() as u32,
        );

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.present_pipeline);
            rpass.set_bind_group(0, &self.present_bind_group, &[]);
            rpass.draw(0..3, 0..1);
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        self.batch.clear();
        self.sections.clear();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_pass(
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        target: &wgpu::TextureView,
        load: wgpu::LoadOp<wgpu::Color>,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
        vertices: &wgpu::Buffer,
        count: u32,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        if count == 0 {
            return;
        }
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vertices.slice(..));
        rpass.draw(0..count, 0..1);
    }
}
