//! Procedural stand-in balloons.
//!
//! Shown immediately so the sky is never empty, then swapped for loaded
//! models, or kept when loading fails.

/// Common colours (packed `0xRRGGBB`).
pub mod colors {
    /// Default envelope red.
    pub const ENVELOPE_RED: u32 = 0xff6f61;
    /// Left drifter envelope.
    pub const ENVELOPE_CORAL: u32 = 0xff7a6b;
    /// Right drifter envelope.
    pub const ENVELOPE_BLUE: u32 = 0x6bb7ff;
    /// Follower envelope.
    pub const ENVELOPE_YELLOW: u32 = 0xffe16b;
    /// Wicker basket.
    pub const BASKET_BROWN: u32 = 0x8b5a2b;
}

/// Unpacks `0xRRGGBB` into `[0, 1]` channels.
#[inline]
#[must_use]
pub fn unpack_rgb(packed: u32) -> [f32; 3] {
    [
        ((packed >> 16) & 0xFF) as f32 / 255.0,
        ((packed >> 8) & 0xFF) as f32 / 255.0,
        (packed & 0xFF) as f32 / 255.0,
    ]
}

/// The balloon envelope: a UV sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopePart {
    /// Sphere radius.
    pub radius: f32,
    /// Height of the sphere centre above the basket.
    pub center_y: f32,
    /// Width and height segments.
    pub segments: u32,
    /// Packed colour.
    pub color: u32,
}

/// The basket: a tapered cylinder at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasketPart {
    /// Top radius.
    pub radius_top: f32,
    /// Bottom radius.
    pub radius_bottom: f32,
    /// Height.
    pub height: f32,
    /// Radial segments.
    pub segments: u32,
    /// Packed colour.
    pub color: u32,
}

/// A sphere-and-cylinder balloon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderBalloon {
    /// Envelope.
    pub envelope: EnvelopePart,
    /// Basket.
    pub basket: BasketPart,
    /// Uniform group scale.
    pub scale: f32,
}

impl PlaceholderBalloon {
    /// The rising-field placeholder.
    ///
    /// Structure:
    /// - Envelope: radius 1.6 sphere centred 1.6 above the basket
    /// - Basket: 0.25/0.3 x 0.35 cylinder, 8 sides
    #[must_use]
    pub const fn intro() -> Self {
        Self {
            envelope: EnvelopePart {
                radius: 1.6,
                center_y: 1.6,
                segments: 16,
                color: colors::ENVELOPE_RED,
            },
            basket: BasketPart {
                radius_top: 0.25,
                radius_bottom: 0.3,
                height: 0.35,
                segments: 8,
                color: colors::BASKET_BROWN,
            },
            scale: 1.0,
        }
    }

    /// The drift-scene placeholder: smaller, smoother envelope in any colour.
    #[must_use]
    pub const fn drifter(color: u32, scale: f32) -> Self {
        Self {
            envelope: EnvelopePart {
                radius: 1.0,
                center_y: 1.2,
                segments: 20,
                color,
            },
            basket: BasketPart {
                radius_top: 0.25,
                radius_bottom: 0.3,
                height: 0.35,
                segments: 12,
                color: colors::BASKET_BROWN,
            },
            scale,
        }
    }

    /// Top of the envelope in model units, scale applied.
    #[must_use]
    pub fn height(&self) -> f32 {
        (self.envelope.center_y + self.envelope.radius) * self.scale
    }

    /// Vertices of the generated meshes (sphere grid plus capped cylinder).
    #[must_use]
    pub const fn vertex_count(&self) -> u32 {
        let s = self.envelope.segments;
        let sphere = (s + 1) * (s + 1);
        let r = self.basket.segments;
        let side = (r + 1) * 2;
        let caps = 2 * (r * 2 + 1);
        sphere + side + caps
    }

    /// Envelope colour as `[r, g, b]`.
    #[must_use]
    pub fn envelope_rgb(&self) -> [f32; 3] {
        unpack_rgb(self.envelope.color)
    }
}

impl Default for PlaceholderBalloon {
    fn default() -> Self {
        Self::intro()
    }
}
