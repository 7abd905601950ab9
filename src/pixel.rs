// filepath: src/pixel.rs
//! Pixel encodings understood by the compositor
//!
//! Each format is a row in a small codec table: how many bytes a pixel
//! takes and how to expand it to / compress it from 8-bit RGB.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend `self` over `dst`: `(src * alpha + dst * (255 - alpha)) / 255` per channel
    pub fn blend_over(self, dst: Rgb, alpha: u8) -> Rgb {
        if alpha == u8::MAX {
            return self;
        }
        let a = alpha as u32;
        let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8;
        Rgb {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
        }
    }
}

/// RGBA config color: the alpha byte is the blend factor.
pub fn split_rgba(color: [u8; 4]) -> (Rgb, u8) {
    (Rgb::new(color[0], color[1], color[2]), color[3])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 32 bpp, native-endian `0xAARRGGBB`
    Argb8888,
    /// 16 bpp, 5/6/5 packed
    Rgb565,
}

pub struct Codec {
    pub bytes_per_pixel: usize,
    pub decode: fn(&[u8]) -> Rgb,
    pub encode: fn(Rgb, &mut [u8]),
}

static ARGB8888: Codec = Codec {
    bytes_per_pixel: 4,
    decode: decode_argb8888,
    encode: encode_argb8888,
};

static RGB565: Codec = Codec {
    bytes_per_pixel: 2,
    decode: decode_rgb565,
    encode: encode_rgb565,
};

impl PixelFormat {
    pub fn from_bits_per_pixel(bpp: u32) -> Option<Self> {
        match bpp {
            32 => Some(Self::Argb8888),
            16 => Some(Self::Rgb565),
            _ => None,
        }
    }

    pub fn codec(self) -> &'static Codec {
        match self {
            Self::Argb8888 => &ARGB8888,
            Self::Rgb565 => &RGB565,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        self.codec().bytes_per_pixel
    }

    pub fn read_pixel(self, pixel: &[u8]) -> Rgb {
        (self.codec().decode)(pixel)
    }

    pub fn write_pixel(self, pixel: &mut [u8], color: Rgb) {
        (self.codec().encode)(color, pixel)
    }
}

fn decode_argb8888(pixel: &[u8]) -> Rgb {
    let v = u32::from_ne_bytes([pixel[0], pixel[1], pixel[2], pixel[3]]);
    Rgb::new((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

fn encode_argb8888(color: Rgb, pixel: &mut [u8]) {
    let v = 0xFF00_0000 | ((color.r as u32) << 16) | ((color.g as u32) << 8) | (color.b as u32);
    pixel[..4].copy_from_slice(&v.to_ne_bytes());
}

fn decode_rgb565(pixel: &[u8]) -> Rgb {
    let v = u16::from_ne_bytes([pixel[0], pixel[1]]);
    Rgb::new(
        (((v >> 11) & 0x1F) << 3) as u8,
        (((v >> 5) & 0x3F) << 2) as u8,
        ((v & 0x1F) << 3) as u8,
    )
}

fn encode_rgb565(color: Rgb, pixel: &mut [u8]) {
    let v = (((color.r as u16) >> 3) << 11) | (((color.g as u16) >> 2) << 5) | ((color.b as u16) >> 3);
    pixel[..2].copy_from_slice(&v.to_ne_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_blend_overwrites() {
        let src = Rgb::new(10, 20, 30);
        assert_eq!(src.blend_over(Rgb::new(200, 200, 200), 255), src);
    }

    #[test]
    fn blend_uses_integer_division() {
        let out = Rgb::new(255, 0, 100).blend_over(Rgb::new(0, 255, 50), 128);
        assert_eq!(out, Rgb::new(128, 127, 75));
        let clear = Rgb::new(255, 255, 255).blend_over(Rgb::new(7, 8, 9), 0);
        assert_eq!(clear, Rgb::new(7, 8, 9));
    }

    #[test]
    fn argb8888_keeps_full_precision() {
        let mut px = [0u8; 4];
        let c = Rgb::new(0x12, 0x34, 0x56);
        PixelFormat::Argb8888.write_pixel(&mut px, c);
        assert_eq!(u32::from_ne_bytes(px), 0xFF12_3456);
        assert_eq!(PixelFormat::Argb8888.read_pixel(&px), c);
    }

    #[test]
    fn rgb565_truncates_low_bits() {
        let mut px = [0u8; 2];
        PixelFormat::Rgb565.write_pixel(&mut px, Rgb::new(0xFF, 0xFF, 0xFF));
        assert_eq!(u16::from_ne_bytes(px), 0xFFFF);
        assert_eq!(
            PixelFormat::Rgb565.read_pixel(&px),
            Rgb::new(0xF8, 0xFC, 0xF8)
        );

        PixelFormat::Rgb565.write_pixel(&mut px, Rgb::new(0x2E, 0xCC, 0x71));
        assert_eq!(
            PixelFormat::Rgb565.read_pixel(&px),
            Rgb::new(0x28, 0xCC, 0x70)
        );
    }

    #[test]
    fn only_16_and_32_bpp_are_supported() {
        assert_eq!(PixelFormat::from_bits_per_pixel(32), Some(PixelFormat::Argb8888));
        assert_eq!(PixelFormat::from_bits_per_pixel(16), Some(PixelFormat::Rgb565));
        assert_eq!(PixelFormat::from_bits_per_pixel(24), None);
        assert_eq!(PixelFormat::Rgb565.bytes_per_pixel(), 2);
    }
}
