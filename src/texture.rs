use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

/// Validation failures for decoded texture images.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("texture has zero area ({width}x{height})")]
    ZeroArea { width: u32, height: u32 },
}

/// Fixed binding slot of each texture in the charcoal pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    /// Screen-space paper background.
    Paper,
    /// Tiling grain noise.
    Noise,
    /// Contrast enhancement lookup.
    Contrast,
}

impl TextureSlot {
    pub const ALL: [Self; 3] = [Self::Paper, Self::Noise, Self::Contrast];

    pub fn index(self) -> usize {
        match self {
            Self::Paper => 0,
            Self::Noise => 1,
            Self::Contrast => 2,
        }
    }
}

/// A decoded image ready for GPU upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl TextureImage {
    /// Decodes an image file into tightly packed RGBA8 pixels.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .with_context(|| format!("failed to load texture {}", path.display()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self::from_rgba8(rgba.into_raw(), width, height)?)
    }

    /// Wraps an already decoded RGBA8 pixel buffer.
    pub fn from_rgba8(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroArea { width, height });
        }
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// The three GPU resident textures of the charcoal effect, created once at
/// startup and immutable afterwards.
pub struct TextureSet {
    views: [wgpu::TextureView; 3],
    sampler: wgpu::Sampler,
    _textures: [wgpu::Texture; 3],
}

impl TextureSet {
    /// Uploads the paper, noise and contrast images into their fixed slots.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        paper: &TextureImage,
        noise: &TextureImage,
        contrast: &TextureImage,
    ) -> Self {
        let paper = upload_image(device, queue, paper, "paper-texture");
        let noise = upload_image(device, queue, noise, "noise-texture");
        let contrast = upload_image(device, queue, contrast, "contrast-texture");

        // One shared sampler: linear filtering, repeat wrap.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("charcoal-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let views = [
            paper.create_view(&wgpu::TextureViewDescriptor::default()),
            noise.create_view(&wgpu::TextureViewDescriptor::default()),
            contrast.create_view(&wgpu::TextureViewDescriptor::default()),
        ];

        Self {
            views,
            sampler,
            _textures: [paper, noise, contrast],
        }
    }

    pub fn view(&self, slot: TextureSlot) -> &wgpu::TextureView {
        &self.views[slot.index()]
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

fn upload_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &TextureImage,
    label: &str,
) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width: image.width(),
        height: image.height(),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        image.pixels(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width()),
            rows_per_image: Some(image.height()),
        },
        size,
    );
    texture
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_fixed() {
        assert_eq!(TextureSlot::Paper.index(), 0);
        assert_eq!(TextureSlot::Noise.index(), 1);
        assert_eq!(TextureSlot::Contrast.index(), 2);
    }

    #[test]
    fn zero_area_images_are_rejected() {
        let err = TextureImage::from_rgba8(Vec::new(), 0, 256).unwrap_err();
        assert!(matches!(err, TextureError::ZeroArea { width: 0, .. }));
    }

    #[test]
    fn valid_image_reports_dimensions() {
        let image = TextureImage::from_rgba8(vec![0; 4 * 4 * 4], 4, 4).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 4);
        assert_eq!(image.pixels().len(), 64);
    }
}
