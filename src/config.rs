use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::obj::{load_obj_from_str, ObjMesh};
use crate::texture::TextureImage;

/// Viewer configuration loaded from a JSON file.
///
/// Every field is optional; the defaults give a 512x512 window and assets
/// under `textures/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_window_size")]
    pub window_width: u32,
    #[serde(default = "default_window_size")]
    pub window_height: u32,
    #[serde(default = "default_mesh_path")]
    pub mesh: String,
    #[serde(default = "default_paper_path")]
    pub paper_texture: String,
    #[serde(default = "default_noise_path")]
    pub noise_texture: String,
    #[serde(default = "default_contrast_path")]
    pub contrast_texture: String,
}

impl ViewerConfig {
    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            window_width: default_window_size(),
            window_height: default_window_size(),
            mesh: default_mesh_path(),
            paper_texture: default_paper_path(),
            noise_texture: default_noise_path(),
            contrast_texture: default_contrast_path(),
        }
    }
}

/// CPU-side assets named by the configuration, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerAssets {
    pub mesh: ObjMesh,
    pub paper: TextureImage,
    pub noise: TextureImage,
    pub contrast: TextureImage,
}

impl ViewerAssets {
    /// Loads and decodes the mesh and the three textures.
    pub fn load(config: &ViewerConfig) -> Result<Self> {
        let obj_text = fs::read_to_string(&config.mesh)
            .with_context(|| format!("failed to read mesh {}", config.mesh))?;
        let mesh = load_obj_from_str(&obj_text)
            .with_context(|| format!("failed to parse mesh {}", config.mesh))?;
        let paper = TextureImage::load(&config.paper_texture)?;
        let noise = TextureImage::load(&config.noise_texture)?;
        let contrast = TextureImage::load(&config.contrast_texture)?;
        Ok(Self {
            mesh,
            paper,
            noise,
            contrast,
        })
    }
}

fn default_window_title() -> String {
    "Charcoal Rendering Demo".to_string()
}

fn default_window_size() -> u32 {
    512
}

fn default_mesh_path() -> String {
    "textures/model.obj".to_string()
}

fn default_paper_path() -> String {
    "textures/paper.tga".to_string()
}

fn default_noise_path() -> String {
    "textures/noise.tga".to_string()
}

fn default_contrast_path() -> String {
    "textures/contrast.tga".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_object_yields_defaults() {
        let config: ViewerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.window_title, "Charcoal Rendering Demo");
        assert_eq!((config.window_width, config.window_height), (512, 512));
    }

    #[test]
    fn fields_override_individually() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{"mesh": "assets/bunny.obj", "window_width": 1024}"#).unwrap();
        assert_eq!(config.mesh, "assets/bunny.obj");
        assert_eq!(config.window_width, 1024);
        assert_eq!(config.window_height, 512);
        assert_eq!(config.paper_texture, "textures/paper.tga");
    }

    #[test]
    fn load_reads_a_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"window_title": "Test"}}"#).unwrap();
        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.window_title, "Test");
    }

    #[test]
    fn load_reports_missing_files() {
        assert!(ViewerConfig::load("does/not/exist.json").is_err());
    }
}
