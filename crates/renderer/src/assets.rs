use std::path::{Path, PathBuf};

use image::GenericImageView;
use tracing::{info, warn};

use crate::types::{MissingTexturePolicy, TextureRole, TextureSources};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load {role} texture at {path}: {source}")]
    Decode {
        role: TextureRole,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{role} texture is {width}x{height} but the GPU allows at most {max}x{max}")]
    TooLarge {
        role: TextureRole,
        width: u32,
        height: u32,
        max: u32,
    },
}

/// RGBA8 pixels decoded on the CPU, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub role: TextureRole,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub placeholder: bool,
}

impl DecodedImage {
    /// Single-pixel stand-in: opaque white for colors, mid grey for the mask
    /// so the wipe still progresses.
    pub fn placeholder(role: TextureRole) -> Self {
        let rgba = match role {
            TextureRole::Primary | TextureRole::Secondary => vec![255, 255, 255, 255],
            TextureRole::Mask => vec![128, 128, 128, 255],
        };
        Self {
            role,
            width: 1,
            height: 1,
            rgba,
            placeholder: true,
        }
    }

    pub fn ensure_fits(&self, max_dimension: u32) -> Result<(), AssetError> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(AssetError::TooLarge {
                role: self.role,
                width: self.width,
                height: self.height,
                max: max_dimension,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DecodedTextureSet {
    pub primary: DecodedImage,
    pub secondary: DecodedImage,
    pub mask: DecodedImage,
}

impl DecodedTextureSet {
    pub fn images(&self) -> [&DecodedImage; 3] {
        [&self.primary, &self.secondary, &self.mask]
    }
}

pub fn decode_image(role: TextureRole, path: &Path) -> Result<DecodedImage, AssetError> {
    let image = image::open(path).map_err(|source| AssetError::Decode {
        role,
        path: path.to_path_buf(),
        source,
    })?;
    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        role,
        width,
        height,
        rgba: image.to_rgba8().into_raw(),
        placeholder: false,
    })
}

/// Decodes all three images before any window or GPU work begins.
pub fn load_texture_set(sources: &TextureSources) -> Result<DecodedTextureSet, AssetError> {
    let load = |role: TextureRole| -> Result<DecodedImage, AssetError> {
        let path = sources.path(role);
        match decode_image(role, path) {
            Ok(image) => {
                info!(
                    role = %role,
                    path = %path.display(),
                    width = image.width,
                    height = image.height,
                    "loaded texture"
                );
                Ok(image)
            }
            Err(error) => match sources.missing {
                MissingTexturePolicy::Fail => Err(error),
                MissingTexturePolicy::Placeholder => {
                    warn!(
                        role = %role,
                        path = %path.display(),
                        error = %error,
                        "failed to load texture; using placeholder"
                    );
                    Ok(DecodedImage::placeholder(role))
                }
            },
        }
    };

    Ok(DecodedTextureSet {
        primary: load(TextureRole::Primary)?,
        secondary: load(TextureRole::Secondary)?,
        mask: load(TextureRole::Mask)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let image = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        image.save(&path).unwrap();
        path
    }

    fn sources(dir: &Path, missing: MissingTexturePolicy) -> TextureSources {
        TextureSources {
            primary: write_png(dir, "fire.png", 4, 2),
            secondary: write_png(dir, "wall.png", 3, 3),
            mask: dir.join("absent.png"),
            missing,
        }
    }

    #[test]
    fn decodes_rgba_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "tile.png", 4, 2);
        let image = decode_image(TextureRole::Primary, &path).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.rgba.len(), 4 * 2 * 4);
        assert_eq!(&image.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn missing_texture_fails_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_texture_set(&sources(dir.path(), MissingTexturePolicy::Fail)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("mask"));
        assert!(message.contains("absent.png"));
    }

    #[test]
    fn placeholder_policy_substitutes_missing_images() {
        let dir = tempfile::tempdir().unwrap();
        let set = load_texture_set(&sources(dir.path(), MissingTexturePolicy::Placeholder)).unwrap();
        assert!(!set.primary.placeholder);
        assert!(set.mask.placeholder);
        assert_eq!(set.mask.rgba, vec![128, 128, 128, 255]);
    }

    #[test]
    fn oversized_images_are_rejected() {
        let image = DecodedImage {
            role: TextureRole::Secondary,
            width: 9000,
            height: 16,
            rgba: Vec::new(),
            placeholder: false,
        };
        assert!(matches!(
            image.ensure_fits(8192),
            Err(AssetError::TooLarge { width: 9000, .. })
        ));
        assert!(image.ensure_fits(16384).is_ok());
    }
}
