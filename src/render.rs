use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::config::ViewerAssets;
use crate::obj::ObjMesh;
use crate::scene::SceneState;
use crate::stage::{BackgroundStage, CharcoalStage, Globals};
use crate::texture::TextureSet;

/// GPU renderer drawing the charcoal effect into a window surface.
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth: DepthBuffer,
    mesh: MeshModel,
    background: BackgroundStage,
    charcoal: CharcoalStage,
    _textures: TextureSet,
}

impl Renderer {
    /// Initializes the GPU renderer for the provided window and assets.
    ///
    /// Everything created here is startup configuration: a failure at any
    /// point is fatal and nothing partial is kept alive.
    pub async fn new(window: Arc<Window>, assets: &ViewerAssets) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = unsafe { instance.create_surface(window.as_ref()) }
            .context("failed to create rendering surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("viewer-device"),
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|mode| {
                    matches!(
                        mode,
                        wgpu::PresentMode::Mailbox | wgpu::PresentMode::Immediate
                    )
                })
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let textures = TextureSet::upload(
            &device,
            &queue,
            &assets.paper,
            &assets.noise,
            &assets.contrast,
        );
        let mesh = MeshModel::from_mesh(&device, &assets.mesh);
        let background = BackgroundStage::new(&device, surface_format, &textures);
        let charcoal = CharcoalStage::new(&device, surface_format, DepthBuffer::FORMAT, &textures);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth,
            mesh,
            background,
            charcoal,
            _textures: textures,
        })
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Exposes the inner window for event handling.
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Renders one frame: the paper background pass, then the shaded 3D pass
    /// with the orbit angles applied as a model rotation, then present.
    ///
    /// Every piece of pipeline state is rewritten each frame, so two calls
    /// with unchanged scene state produce the same image.
    pub fn render_frame(
        &mut self,
        scene: &SceneState,
        pitch: f32,
        yaw: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        // Background pass: clear to the paper-white base color and draw the
        // paper quad.  Depth is not attached, so the quad never occludes.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("background-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });
            self.background.draw(&mut pass);
        }

        let globals = Globals::new(
            scene.projection_matrix(),
            scene.view_matrix(),
            MeshModel::rotation(pitch, yaw),
            scene.light_position(),
            scene.camera_position(),
            (self.size.width, self.size.height),
        );
        self.charcoal.write_globals(&self.queue, &globals);

        // 3D pass: keep the background color, clear only depth.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("charcoal-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });
            self.charcoal.bind(&mut pass);
            self.mesh.draw(&mut pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// GPU buffers of the viewed mesh.
pub struct MeshModel {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshModel {
    fn from_mesh(device: &wgpu::Device, mesh: &ObjMesh) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("model-vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("model-indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        }
    }

    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Model rotation applied at draw time: pitch about the X axis, then
    /// negative yaw about the Y axis, both in degrees.
    pub fn rotation(pitch: f32, yaw: f32) -> Mat4 {
        Mat4::from_rotation_x(pitch.to_radians()) * Mat4::from_rotation_y((-yaw).to_radians())
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn no_orbit_means_identity_rotation() {
        assert_eq!(MeshModel::rotation(0.0, 0.0), Mat4::IDENTITY);
    }

    #[test]
    fn rotation_applies_pitch_then_negated_yaw() {
        let rotation = MeshModel::rotation(30.0, 45.0);
        let expected =
            Mat4::from_rotation_x(30f32.to_radians()) * Mat4::from_rotation_y(-45f32.to_radians());
        assert_eq!(rotation, expected);
    }

    #[test]
    fn yaw_spins_about_the_vertical_axis() {
        let rotation = MeshModel::rotation(0.0, 90.0);
        let rotated = rotation * Vec4::new(1.0, 0.0, 0.0, 0.0);
        let rotated = Vec3::new(rotated.x, rotated.y, rotated.z);
        assert!((rotated - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }
}
