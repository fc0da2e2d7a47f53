use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use glam::Vec2;
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton as WinitMouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use charcoal_viewer::{
    Application, PointerButton, PointerEvent, Renderer, ViewerApp, ViewerAssets, ViewerConfig,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let config = match options.config_path.as_deref() {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    let assets = ViewerAssets::load(&config)?;

    print_asset_summary(&config, &assets);

    if options.summary_only {
        return Ok(());
    }

    match run_interactive(&config, &assets) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn run_interactive(config: &ViewerConfig, assets: &ViewerAssets) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.window_title)
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(Arc::clone(&window), assets))?;
    let mut state = EventState {
        app: ViewerApp::new(renderer),
        cursor: Vec2::ZERO,
        last_error: None,
    };

    let mut event_loop = event_loop;
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = state.process_event(&event, control_flow) {
            state.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    state.app.shutdown();

    if let Some(err) = state.last_error {
        return Err(err);
    }

    Ok(())
}

struct EventState {
    app: ViewerApp,
    cursor: Vec2,
    last_error: Option<anyhow::Error>,
}

impl EventState {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.app.window_id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.app.resize(size.width, size.height);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.app.resize(new_inner_size.width, new_inner_size.height);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.handle_mouse_button(*state, *button);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        self.cursor = Vec2::new(position.x as f32, position.y as f32);
                        self.app.pointer_event(PointerEvent::Moved {
                            position: self.cursor,
                        });
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.app.window_id() => {
                self.app.frame_tick()?;
            }
            Event::MainEventsCleared => {
                self.app.request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: WinitMouseButton) {
        let Some(button) = map_pointer_button(button) else {
            return;
        };
        let event = match state {
            ElementState::Pressed => PointerEvent::ButtonDown {
                button,
                position: self.cursor,
            },
            ElementState::Released => PointerEvent::ButtonUp { button },
        };
        self.app.pointer_event(event);
    }
}

fn map_pointer_button(button: WinitMouseButton) -> Option<PointerButton> {
    match button {
        WinitMouseButton::Left => Some(PointerButton::Left),
        WinitMouseButton::Right => Some(PointerButton::Right),
        _ => None,
    }
}

fn print_asset_summary(config: &ViewerConfig, assets: &ViewerAssets) {
    println!(
        "Loaded mesh {} ({} vertices, {} triangles)",
        config.mesh,
        assets.mesh.vertex_count(),
        assets.mesh.triangle_count()
    );
    let textures = [
        ("paper", &config.paper_texture, &assets.paper),
        ("noise", &config.noise_texture, &assets.noise),
        ("contrast", &config.contrast_texture, &assets.contrast),
    ];
    for (name, path, image) in textures {
        println!(
            " - {name} texture {path} ({}x{})",
            image.width(),
            image.height()
        );
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

struct CliOptions {
    config_path: Option<String>,
    summary_only: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut config_path = None;
        let mut summary_only = false;
        for arg in env::args().skip(1) {
            match arg.as_str() {
                "--summary-only" => summary_only = true,
                other if other.starts_with("--") => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: charcoal-viewer [config.json] [--summary-only]"
                    ));
                }
                other => {
                    if config_path.replace(other.to_string()).is_some() {
                        return Err(anyhow!(
                            "Usage: charcoal-viewer [config.json] [--summary-only]"
                        ));
                    }
                }
            }
        }
        Ok(Self {
            config_path,
            summary_only,
        })
    }
}
