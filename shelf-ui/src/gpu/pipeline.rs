//! Instanced quad pipeline.
//!
//! Every draw is a screen-space quad sampling one texture, tinted by a
//! per-instance color. Solid rectangles sample a 1x1 white texture, so fills
//! and images share one pipeline. Consecutive quads with the same texture
//! are drawn with a single instanced draw call.

use std::num::NonZeroU64;
use std::ops::Range;
use std::sync::Arc;

use shelf::{Color, LoadError, Pixmap, Rect, Size};
use wgpu::util::StagingBelt;

/// Quad instance for GPU rendering (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct QuadInstance {
    /// Top-left corner in logical pixels.
    pub position: [f32; 2],
    /// Width and height in logical pixels.
    pub size: [f32; 2],
    /// Linear RGBA tint.
    pub color: [f32; 4],
}

/// Uniform data for the shader.
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct Globals {
    /// Orthographic projection, logical pixels to clip space.
    transform: [[f32; 4]; 4],
}

/// A texture owned by the list engine's caches.
pub struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: Arc<wgpu::BindGroup>,
    size: Size,
}

impl shelf::Texture for GpuTexture {
    fn size(&self) -> Size {
        self.size
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        self.texture.destroy();
    }
}

/// Run of instances drawn with one bind group.
struct Batch {
    bind_group: Arc<wgpu::BindGroup>,
    instances: Range<u32>,
}

/// Append `instance` to the frame, extending the last batch when it uses the
/// same texture.
fn push_instance(
    instances: &mut Vec<QuadInstance>,
    batches: &mut Vec<Batch>,
    bind_group: &Arc<wgpu::BindGroup>,
    instance: QuadInstance,
) {
    let index = instances.len() as u32;
    instances.push(instance);
    match batches.last_mut() {
        Some(batch) if Arc::ptr_eq(&batch.bind_group, bind_group) => batch.instances.end = index + 1,
        _ => batches.push(Batch {
            bind_group: Arc::clone(bind_group),
            instances: index..index + 1,
        }),
    }
}

pub struct QuadPipeline {
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    /// Instances to render this frame (CPU-side collection).
    instances: Vec<QuadInstance>,
    batches: Vec<Batch>,
    background: Color,
    staging_belt: StagingBelt,
}

impl QuadPipeline {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shelf Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/quad.wgsl").into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shelf Globals Layout"),
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

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shelf Texture Layout"),
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
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shelf Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shelf Quad Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[
                        // position
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 0,
                            shader_location: 0,
                        },
                        // size
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 8,
                            shader_location: 1,
                        },
                        // color
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x4,
                            offset: 16,
                            shader_location: 2,
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shelf Globals Buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shelf Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shelf Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = upload_texture(
            device,
            queue,
            &texture_layout,
            &sampler,
            &Pixmap::from_pixel(1, 1, image::Rgba([255, 255, 255, 255])),
        );

        let initial_capacity = 1024;
        let instance_buffer = create_instance_buffer(device, initial_capacity);

        // Covers and text runs of a full list fit comfortably in 1MB.
        let staging_belt = StagingBelt::new(1024 * 1024);

        Self {
            pipeline,
            globals_buffer,
            globals_bind_group,
            texture_layout,
            sampler,
            white,
            instance_buffer,
            instance_capacity: initial_capacity,
            instances: Vec::new(),
            batches: Vec::new(),
            background: Color::BLACK,
            staging_belt,
        }
    }

    /// Upload `pixels` as a sampled texture.
    pub fn create_texture(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &Pixmap,
    ) -> Result<GpuTexture, LoadError> {
        let (width, height) = pixels.dimensions();
        let max = device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(LoadError::Upload(format!(
                "{width}x{height} is outside the supported texture size (max {max})"
            )));
        }
        Ok(upload_texture(device, queue, &self.texture_layout, &self.sampler, pixels))
    }

    /// Start a new frame cleared to `color`.
    pub fn begin_frame(&mut self, color: Color) {
        self.background = color;
        self.instances.clear();
        self.batches.clear();
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let bind_group = Arc::clone(&self.white.bind_group);
        push_instance(&mut self.instances, &mut self.batches, &bind_group, quad(rect, color));
    }

    pub fn draw_texture(&mut self, texture: &GpuTexture, dest: Rect) {
        push_instance(
            &mut self.instances,
            &mut self.batches,
            &texture.bind_group,
            quad(dest, Color::WHITE),
        );
    }

    /// Upload this frame's instances.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        viewport: Size,
    ) {
        let globals = Globals {
            transform: create_orthographic_matrix(viewport.width, viewport.height),
        };
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        if self.instances.len() > self.instance_capacity {
            self.instance_capacity = self.instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
        }

        let instance_bytes = self.instances.len() * std::mem::size_of::<QuadInstance>();
        if let Some(size) = NonZeroU64::new(instance_bytes as u64) {
            let mut staging_buffer =
                self.staging_belt
                    .write_buffer(encoder, &self.instance_buffer, 0, size, device);
            staging_buffer.copy_from_slice(bytemuck::cast_slice(&self.instances));
        }

        self.staging_belt.finish();
    }

    /// Call after the frame has been submitted.
    pub fn after_frame(&mut self) {
        self.staging_belt.recall();
    }

    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let [r, g, b, a] = linear_rgba(self.background);
        let clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shelf Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if self.batches.is_empty() {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        for batch in &self.batches {
            render_pass.set_bind_group(1, batch.bind_group.as_ref(), &[]);
            // 6 vertices per quad (2 triangles)
            render_pass.draw(0..6, batch.instances.clone());
        }
    }
}

fn quad(rect: Rect, color: Color) -> QuadInstance {
    QuadInstance {
        position: [rect.x, rect.y],
        size: [rect.width, rect.height],
        color: linear_rgba(color),
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Shelf Instance Buffer"),
        size: (capacity * std::mem::size_of::<QuadInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    pixels: &Pixmap,
) -> GpuTexture {
    let (width, height) = pixels.dimensions();
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Shelf Texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        extent,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Shelf Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuTexture {
        texture,
        bind_group: Arc::new(bind_group),
        size: Size::new(width as f32, height as f32),
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB color to the linear values an sRGB render target expects.
fn linear_rgba(color: Color) -> [f32; 4] {
    [
        srgb_to_linear(color.r),
        srgb_to_linear(color.g),
        srgb_to_linear(color.b),
        color.a,
    ]
}

/// Create an orthographic projection matrix with the origin at the top left.
fn create_orthographic_matrix(width: f32, height: f32) -> [[f32; 4]; 4] {
    let left = 0.0;
    let right = width;
    let top = 0.0;
    let bottom = height;
    let near = -1.0;
    let far = 1.0;

    let sx = 2.0 / (right - left);
    let sy = 2.0 / (top - bottom);
    let sz = 2.0 / (far - near);
    let tx = -(right + left) / (right - left);
    let ty = -(top + bottom) / (top - bottom);
    let tz = -(far + near) / (far - near);

    [
        [sx, 0.0, 0.0, 0.0],
        [0.0, sy, 0.0, 0.0],
        [0.0, 0.0, sz, 0.0],
        [tx, ty, tz, 1.0],
    ]
}
