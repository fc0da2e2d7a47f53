use anyhow::{anyhow, Result};
use log::info;
use winit::dpi::PhysicalSize;
use winit::window::WindowId;

use crate::camera::CameraController;
use crate::input::PointerEvent;
use crate::render::Renderer;
use crate::scene::SceneState;
use crate::timer::FrameTimer;

/// Frame rate the render loop is locked to.
pub const TARGET_FRAME_RATE: f32 = 60.0;

/// Narrow interface the platform loop drives the viewer through.
pub trait Application {
    /// The window was resized to the given physical dimensions.
    fn resize(&mut self, width: u32, height: u32);
    /// A pointer event arrived from the window system.
    fn pointer_event(&mut self, event: PointerEvent);
    /// Advance one frame: pace the timer, then render.
    fn frame_tick(&mut self) -> Result<()>;
    /// The loop has ended.
    fn shutdown(&mut self);
}

/// Concrete viewer application owning the renderer and all interaction state.
pub struct ViewerApp {
    renderer: Renderer,
    scene: SceneState,
    camera: CameraController,
    timer: FrameTimer,
}

impl ViewerApp {
    pub fn new(renderer: Renderer) -> Self {
        let size = renderer.size();
        Self {
            scene: SceneState::new(size.width, size.height),
            camera: CameraController::new(),
            timer: FrameTimer::new(),
            renderer,
        }
    }

    pub fn window_id(&self) -> WindowId {
        self.renderer.window_id()
    }

    pub fn request_redraw(&self) {
        self.renderer.window().request_redraw();
    }
}

impl Application for ViewerApp {
    fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(PhysicalSize::new(width, height));
        self.scene.set_viewport(width, height);
    }

    fn pointer_event(&mut self, event: PointerEvent) {
        self.camera.handle_event(event, &mut self.scene);
    }

    fn frame_tick(&mut self) -> Result<()> {
        self.timer.tick(TARGET_FRAME_RATE);
        let result = self
            .renderer
            .render_frame(&self.scene, self.camera.pitch(), self.camera.yaw());
        if let Err(err) = result {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    info!("Surface timeout; retrying next frame");
                }
            }
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        info!("viewer shutting down");
    }
}
