#![forbid(unsafe_code)]

//! Packed colors for text, bars, and background fills.

use serde::{Deserialize, Serialize};

/// A color packed as `0xAARRGGBB`, the layout most host draw queues accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self(0);

    /// Bars for roster members without a live handle.
    pub const UNREACHABLE: Self = Self::rgb(0x80, 0x80, 0x80);
    /// Placeholder slots in padded groups.
    pub const EMPTY_SLOT: Self = Self::rgb(0x60, 0x60, 0x60);
    /// Group headings.
    pub const LABEL: Self = Self::WHITE;

    /// Opaque color from components.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(0xff, r, g, b)
    }

    #[inline]
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Replace the alpha channel.
    #[inline]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & 0x00ff_ffff) | ((alpha as u32) << 24))
    }

    /// Black with alpha scaled from a 0..=100 opacity percentage.
    #[must_use]
    pub const fn black_with_opacity(percent: u8) -> Self {
        let percent = if percent > 100 { 100 } else { percent };
        let alpha = (percent as u32 * 255 / 100) as u8;
        Self::BLACK.with_alpha(alpha)
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}
