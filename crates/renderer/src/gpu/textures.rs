use anyhow::Result;
use crossfade::TextureSlot;
use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::assets::{DecodedImage, DecodedTextureSet};
use crate::types::TextureRole;

use super::context::SurfaceColorSpace;

pub(crate) struct TextureResource {
    pub _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// The two color textures and the mask, plus the repeat sampler they share.
pub(crate) struct TextureSet {
    pub primary: TextureResource,
    pub secondary: TextureResource,
    pub mask: TextureResource,
    pub sampler: wgpu::Sampler,
}

impl TextureSet {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        images: &DecodedTextureSet,
        color_space: SurfaceColorSpace,
        max_dimension: u32,
    ) -> Result<Self> {
        for image in images.images() {
            image.ensure_fits(max_dimension)?;
        }

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("plane repeat sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            primary: upload_image(device, queue, &images.primary, color_space),
            secondary: upload_image(device, queue, &images.secondary, color_space),
            mask: upload_image(device, queue, &images.mask, color_space),
            sampler,
        })
    }

    pub fn slot(&self, slot: TextureSlot) -> &TextureResource {
        match slot {
            TextureSlot::Primary => &self.primary,
            TextureSlot::Secondary => &self.secondary,
        }
    }
}

/// Mask values are thresholds, so they are never sRGB-decoded.
pub(crate) fn texture_format(role: TextureRole, color_space: SurfaceColorSpace) -> wgpu::TextureFormat {
    match role {
        TextureRole::Mask => wgpu::TextureFormat::Rgba8Unorm,
        TextureRole::Primary | TextureRole::Secondary => color_space.color_texture_format(),
    }
}

fn upload_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &DecodedImage,
    color_space: SurfaceColorSpace,
) -> TextureResource {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(&format!("{} texture", image.role)),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(image.role, color_space),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        &image.rgba,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    tracing::debug!(
        role = %image.role,
        width = image.width,
        height = image.height,
        placeholder = image.placeholder,
        "uploaded texture"
    );
    TextureResource {
        _texture: texture,
        view,
    }
}
