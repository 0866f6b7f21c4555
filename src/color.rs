//! Pixel color type and blending helpers
//!
//! All color mixing in the crate goes through [`blend_colors`] so the
//! envelope and ambient renderers share one blend semantic.

use smart_leds::RGB8;

use crate::math8::blend8;

pub type Rgb = RGB8;

pub const WHITE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

/// Blend two RGB colors
///
/// # Arguments
/// * `a` - First color
/// * `b` - Second color
/// * `amount_of_b` - Blend factor (0 = all a, 255 = all b)
#[inline]
pub fn blend_colors(a: Rgb, b: Rgb, amount_of_b: u8) -> Rgb {
    Rgb {
        r: blend8(a.r, b.r, amount_of_b),
        g: blend8(a.g, b.g, amount_of_b),
        b: blend8(a.b, b.b, amount_of_b),
    }
}

/// Create an RGB color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Scale all channels, keeping lit channels lit (video-style)
#[inline]
pub const fn scale_color_video(color: Rgb, scale: u8) -> Rgb {
    Rgb {
        r: crate::math8::scale8_video(color.r, scale),
        g: crate::math8::scale8_video(color.g, scale),
        b: crate::math8::scale8_video(color.b, scale),
    }
}
