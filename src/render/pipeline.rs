use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use super::instance::PartInstance;
use crate::catalog::Rgb;

/// Unit sphere vertex. On a unit sphere the position doubles as the normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position / normal
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const SPHERE_STACKS: u16 = 16;
const SPHERE_SLICES: u16 = 24;

/// Maximum number of part instances the instance buffer can hold.
pub const MAX_INSTANCES: usize = 8192;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// UV sphere of radius 1: (stacks + 1) * (slices + 1) vertices, CCW outward.
pub fn sphere_mesh(stacks: u16, slices: u16) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
    for i in 0..=stacks {
        let phi = std::f32::consts::PI * i as f32 / stacks as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for j in 0..=slices {
            let theta = std::f32::consts::TAU * j as f32 / slices as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            vertices.push(Vertex {
                position: [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta],
            });
        }
    }

    let row = slices + 1;
    let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    (vertices, indices)
}

// ---------------------------------------------------------------------------
// Scene uniform
// ---------------------------------------------------------------------------

const AMBIENT: (u32, f32) = (0xaaaaaa, 0.8);
const HEMI_SKY: u32 = 0xffffff;
const HEMI_GROUND: u32 = 0x444444;
const HEMI_INTENSITY: f32 = 0.9;
const KEY_LIGHT: (Vec3, f32) = (Vec3::new(3.0, 4.0, 4.0), 0.7);
const BACK_LIGHT: (Vec3, f32) = (Vec3::new(-3.0, -2.0, -4.0), 0.4);

/// Camera + fixed lighting. Colors are pre-multiplied by their intensity,
/// light directions point toward the light with intensity in `w`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub sky: [f32; 4],
    pub ground: [f32; 4],
    pub key_light: [f32; 4],
    pub back_light: [f32; 4],
}

impl SceneUniform {
    pub fn new(view_proj: Mat4) -> Self {
        let scaled = |hex: u32, k: f32| {
            let [r, g, b] = Rgb::from_hex(hex).0;
            [r * k, g * k, b * k, 1.0]
        };
        let toward = |(dir, k): (Vec3, f32)| dir.normalize().extend(k).to_array();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            ambient: scaled(AMBIENT.0, AMBIENT.1),
            sky: scaled(HEMI_SKY, HEMI_INTENSITY),
            ground: scaled(HEMI_GROUND, HEMI_INTENSITY),
            key_light: toward(KEY_LIGHT),
            back_light: toward(BACK_LIGHT),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// All GPU resources for drawing cat parts.
pub struct CatPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub instance_buffer: wgpu::Buffer,
    pub scene_uniform_buffer: wgpu::Buffer,
    pub scene_bind_group: wgpu::BindGroup,
    pub num_instances: u32,
}

impl CatPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cat_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/cat.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cat_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Instance buffer layout (128 bytes per instance)
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PartInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![
                1 => Float32x4,  // model col 0
                2 => Float32x4,  // model col 1
                3 => Float32x4,  // model col 2
                4 => Float32x4,  // model col 3
                5 => Float32x4,  // normal col 0
                6 => Float32x4,  // normal col 1
                7 => Float32x4,  // normal col 2
                8 => Float32x4,  // color
            ],
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cat_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout(), instance_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let (vertices, indices) = sphere_mesh(SPHERE_STACKS, SPHERE_SLICES);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_index_buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("part_instance_buffer"),
            size: (MAX_INSTANCES * std::mem::size_of::<PartInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Identity camera until the first frame uploads the real one
        let scene_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_uniform_buffer"),
            contents: bytemuck::bytes_of(&SceneUniform::new(Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
            instance_buffer,
            scene_uniform_buffer,
            scene_bind_group,
            num_instances: 0,
        }
    }

    /// Upload new instance data to the GPU.
    pub fn update_instances(&mut self, queue: &wgpu::Queue, instances: &[PartInstance]) {
        let count = instances.len().min(MAX_INSTANCES);
        if count < instances.len() {
            log::warn!("dropping {} parts over the instance cap", instances.len() - count);
        }
        self.num_instances = count as u32;
        if count > 0 {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances[..count]),
            );
        }
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, view_proj: Mat4) {
        queue.write_buffer(
            &self.scene_uniform_buffer,
            0,
            bytemuck::bytes_of(&SceneUniform::new(view_proj)),
        );
    }
}

/// Depth attachment matching the surface size.
pub fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let (vertices, indices) = sphere_mesh(8, 12);
        assert_eq!(vertices.len(), 9 * 13);
        assert_eq!(indices.len(), 8 * 12 * 6);
        for v in &vertices {
            assert!((Vec3::from(v.position).length() - 1.0).abs() < 1e-5);
        }
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn sphere_triangles_face_outward() {
        let (vertices, indices) = sphere_mesh(SPHERE_STACKS, SPHERE_SLICES);
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(vertices[i as usize].position));
            let normal = (b - a).cross(c - a);
            // Pole rows have a zero-area triangle per quad
            if normal.length_squared() < 1e-10 {
                continue;
            }
            assert!(normal.dot(a + b + c) > 0.0);
        }
    }

    #[test]
    fn uniform_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
        let u = SceneUniform::new(Mat4::IDENTITY);
        assert!((Vec3::from_slice(&u.key_light[..3]).length() - 1.0).abs() < 1e-6);
        assert_eq!(u.key_light[3], 0.7);
    }
}
