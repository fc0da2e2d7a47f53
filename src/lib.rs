//! Core modules for the charcoal viewer.
//!
//! The crate exposes the scene, camera and rendering building blocks of a
//! real-time charcoal-drawing renderer.  Window creation and the event
//! pump live in the binary so that the camera and scene logic stays
//! testable without a GPU or a display.

pub mod app;
pub mod camera;
pub mod config;
pub mod input;
pub mod obj;
pub mod render;
pub mod scene;
pub mod stage;
pub mod texture;
pub mod timer;

pub use app::{Application, ViewerApp};
pub use camera::CameraController;
pub use config::{ViewerAssets, ViewerConfig};
pub use input::{PointerButton, PointerEvent};
pub use obj::{load_obj_from_str, ObjMesh};
pub use render::Renderer;
pub use scene::SceneState;
pub use texture::{TextureImage, TextureSet, TextureSlot};
pub use timer::FrameTimer;
