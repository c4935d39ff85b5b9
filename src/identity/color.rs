//! Deterministic author name coloring.
//!
//! Regular viewers get a color derived from a hash of their display name.
//! Hues close to the fixed member and moderator colors are reserved so a
//! hashed name never reads as a role; such hues are rotated to the opposite
//! side of the wheel.

use crate::core::{HslColor, RoleClass};
use std::ops::RangeInclusive;

/// Fixed author color for members.
pub const ROLE_MEMBER_COLOR: &str = "#2ba640";

/// Fixed author color for moderators.
pub const ROLE_MODERATOR_COLOR: &str = "#5e84f1";

/// Hues reserved for the member color.
pub const MEMBER_HUE_BAND: RangeInclusive<u16> = 105..=150;

/// Hues reserved for the moderator color.
pub const MODERATOR_HUE_BAND: RangeInclusive<u16> = 205..=245;

const SATURATION_MIN: u32 = 70;
const SATURATION_SPAN: u32 = 21;
const LIGHTNESS_MIN: u32 = 60;
const LIGHTNESS_SPAN: u32 = 16;

/// Assigns a display color to an author name.
///
/// The same name always yields the same color, within a run and across
/// runs. Different names may collide.
///
/// # Examples
///
/// ```
/// use chat_overlay::identity::{MEMBER_HUE_BAND, MODERATOR_HUE_BAND, assign_color};
///
/// let color = assign_color("Alice");
/// assert_eq!(color, assign_color("Alice"));
/// assert!(!MEMBER_HUE_BAND.contains(&color.hue));
/// assert!(!MODERATOR_HUE_BAND.contains(&color.hue));
/// assert!((70..=90).contains(&color.saturation));
/// assert!((60..=75).contains(&color.lightness));
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn assign_color(name: &str) -> HslColor {
    let hash = name_hash(name);

    let mut hue = (hash % 360) as u16;
    if is_reserved(hue) {
        hue = (hue + 180) % 360;
    }

    // Higher hash bits pick saturation and lightness so they vary
    // independently of the hue.
    let saturation = SATURATION_MIN + (hash / 360) % SATURATION_SPAN;
    let lightness = LIGHTNESS_MIN + (hash / (360 * SATURATION_SPAN)) % LIGHTNESS_SPAN;

    HslColor {
        hue,
        saturation: saturation as u8,
        lightness: lightness as u8,
    }
}

/// Fixed author color for a role, `None` for regular viewers.
#[must_use]
pub const fn role_color(class: RoleClass) -> Option<&'static str> {
    match class {
        RoleClass::None => None,
        RoleClass::Member => Some(ROLE_MEMBER_COLOR),
        RoleClass::Moderator => Some(ROLE_MODERATOR_COLOR),
    }
}

/// Whether a hue falls inside one of the role bands.
#[must_use]
pub fn is_reserved(hue: u16) -> bool {
    MEMBER_HUE_BAND.contains(&hue) || MODERATOR_HUE_BAND.contains(&hue)
}

/// 32-bit string hash (`h * 31 + c`, wrapping).
///
/// Spelled out rather than using `DefaultHasher` so colors stay stable
/// across processes and toolchains.
fn name_hash(name: &str) -> u32 {
    name.chars().fold(0u32, |hash, c| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(u32::from(c))
    })
}
