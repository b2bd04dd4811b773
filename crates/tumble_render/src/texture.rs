//! Procedural textures
//!
//! All textures are generated at startup: the block atlas, ground checker,
//! sky gradient, the two UI buttons and the about panel. Keeping them
//! procedural avoids shipping image assets and an image decoder for what
//! amounts to a handful of flat-shaded patterns.

/// CPU-side RGBA8 image
#[derive(Clone, Debug)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Image {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = ((y * self.width + x) * 4) as usize;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Texture plus view and sampler, ready to bind
pub struct BoundTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Upload an image and create its view and sampler
pub fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &Image,
    repeat: bool,
    label: &str,
) -> BoundTexture {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
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
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.width * 4),
            rows_per_image: Some(image.height),
        },
        size,
    );

    let address_mode = if repeat {
        wgpu::AddressMode::Repeat
    } else {
        wgpu::AddressMode::ClampToEdge
    };
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    BoundTexture {
        texture,
        view,
        sampler,
    }
}

/// Block texture atlas: two 64x64 cells side by side, one per mesh variant
pub fn block_atlas() -> Image {
    let mut img = Image::new(128, 64);
    for y in 0..64 {
        for x in 0..128 {
            let cell_x = x % 64;
            let alt = x >= 64;
            let border = cell_x < 4 || cell_x >= 60 || y < 4 || y >= 60;
            let color = if border {
                if alt {
                    [96, 60, 32, 255]
                } else {
                    [140, 50, 40, 255]
                }
            } else if alt {
                // Diagonal grain
                if (cell_x + y) % 16 < 8 {
                    [205, 160, 96, 255]
                } else {
                    [190, 145, 84, 255]
                }
            } else {
                // Inset square
                let inner = (12..52).contains(&cell_x) && (12..52).contains(&y);
                if inner {
                    [226, 120, 96, 255]
                } else {
                    [204, 96, 76, 255]
                }
            };
            img.put(x, y, color);
        }
    }
    img
}

/// Checkerboard ground tile
pub fn ground_tile() -> Image {
    let mut img = Image::new(64, 64);
    for y in 0..64 {
        for x in 0..64 {
            let check = (x / 32 + y / 32) % 2 == 0;
            let color = if check {
                [86, 120, 86, 255]
            } else {
                [72, 104, 72, 255]
            };
            img.put(x, y, color);
        }
    }
    img
}

/// Vertical sky gradient, horizon at the bottom
pub fn sky_gradient() -> Image {
    let mut img = Image::new(4, 64);
    for y in 0..64 {
        let t = y as f32 / 63.0;
        let lerp = |a: f32, b: f32| (a + (b - a) * t) as u8;
        // Top of texture (v = 0) is zenith blue, bottom is pale horizon
        let color = [lerp(70.0, 196.0), lerp(110.0, 216.0), lerp(200.0, 236.0), 255];
        for x in 0..4 {
            img.put(x, y, color);
        }
    }
    img
}

/// "Next setup" button: right-pointing triangle on a dark plate
pub fn button_next() -> Image {
    let mut img = Image::new(64, 64);
    for y in 0..64i32 {
        for x in 0..64i32 {
            let border = !(2..62).contains(&x) || !(2..62).contains(&y);
            let inside_arrow = (20..=46).contains(&x) && (y - 32).abs() <= (46 - x) / 2 + 1;
            let color = if border {
                [240, 240, 240, 255]
            } else if inside_arrow {
                [240, 240, 240, 230]
            } else {
                [30, 30, 40, 170]
            };
            img.put(x as u32, y as u32, color);
        }
    }
    img
}

/// "About" button: ring glyph on a dark plate
pub fn button_about() -> Image {
    let mut img = Image::new(64, 64);
    for y in 0..64i32 {
        for x in 0..64i32 {
            let border = !(2..62).contains(&x) || !(2..62).contains(&y);
            let dx = x - 32;
            let dy = y - 32;
            let r2 = dx * dx + dy * dy;
            let ring = (120..280).contains(&r2);
            let color = if border {
                [240, 240, 240, 255]
            } else if ring {
                [240, 240, 240, 230]
            } else {
                [30, 30, 40, 170]
            };
            img.put(x as u32, y as u32, color);
        }
    }
    img
}

/// About panel: bordered plate with text-like stripes
pub fn about_panel() -> Image {
    let mut img = Image::new(256, 256);
    for y in 0..256 {
        for x in 0..256 {
            let border = !(6..250).contains(&x) || !(6..250).contains(&y);
            let stripe = y % 24 >= 8 && y % 24 < 14 && (24..232).contains(&x) && y > 40 && y < 220;
            let title = (40..200).contains(&x) && (16..32).contains(&y);
            let color = if border {
                [240, 240, 240, 255]
            } else if stripe || title {
                [220, 220, 230, 255]
            } else {
                [24, 28, 44, 235]
            };
            img.put(x, y, color);
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_halves_differ() {
        let atlas = block_atlas();
        // Sample cell centers; the variants must be distinguishable
        assert_ne!(atlas.get(32, 32), atlas.get(96, 32));
    }

    #[test]
    fn test_image_dimensions() {
        let atlas = block_atlas();
        assert_eq!((atlas.width, atlas.height), (128, 64));
        assert_eq!(atlas.pixels.len(), 128 * 64 * 4);
    }

    #[test]
    fn test_buttons_differ() {
        let next = button_next();
        let about = button_about();
        assert_ne!(next.pixels, about.pixels);
    }

    #[test]
    fn test_sky_is_vertical_gradient() {
        let sky = sky_gradient();
        assert_ne!(sky.get(0, 0), sky.get(0, 63));
        assert_eq!(sky.get(0, 10), sky.get(3, 10));
    }
}
