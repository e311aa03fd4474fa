// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed color values.

use core::fmt;

/// A non-premultiplied color packed as `0xAARRGGBB`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0);

    /// Opaque black.
    pub const BLACK: Self = Self(0xFF00_0000);

    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    /// Packs the given channels.
    #[inline]
    #[must_use]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Returns the alpha channel.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the shifted value is at most 0xFF"
    )]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Returns `true` if the alpha channel is fully opaque.
    #[inline]
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:08x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_channels() {
        let c = Color::from_argb(0x80, 0x10, 0x20, 0x30);
        assert_eq!(c.0, 0x8010_2030);
        assert_eq!(c.alpha(), 0x80);
        assert!(!c.is_opaque());
        assert!(Color::WHITE.is_opaque());
    }
}
