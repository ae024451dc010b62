//! Color model for console output.
//!
//! This module describes *what* color change a caller asks for, independent of
//! how the destination renders it:
//! - 16 indexed colors (8 base colors plus a bright flag)
//! - 256 indexed colors (the xterm palette)
//! - 24-bit true colors
//! - reset requests (everything, foreground, background, bright)
//!
//! Base indices always use the ANSI order (0 black, 1 red, 2 green, 3 yellow,
//! 4 blue, 5 magenta, 6 cyan, 7 white). The legacy console stores red and blue
//! the other way around; only [`crate::render::win32`] knows about that.
//!
//! # Examples
//!
//! ```
//! use cmdcolor::color::{Color, Target, colors};
//!
//! // Named constants and the `+` operator
//! let bright_blue = colors::BLUE + colors::BRIGHT;
//! assert_eq!(bright_blue, Color::indexed16(4, true, Target::Foreground).unwrap());
//!
//! // Factories for the larger palettes
//! let orange = Color::true_color(255, 128, 0, Target::Foreground).unwrap();
//! let grey = Color::indexed256(244, Target::Background).unwrap();
//! assert!(Color::indexed256(256, Target::Foreground).is_err());
//! # let _ = (orange, grey);
//! ```
//!
//! ## Degradation
//!
//! ```
//! use cmdcolor::color::{Capability, Color, ColorValue, Target};
//!
//! let red = Color::true_color(255, 0, 0, Target::Foreground).unwrap();
//! assert_eq!(
//!     red.degrade(Capability::Extended256).value(),
//!     Some(ColorValue::Indexed256(196))
//! );
//! ```

use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Add;
use std::sync::{LazyLock, Mutex};

use crate::sync::lock_recover;

/// RGB color triplet with values 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorTriplet {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ColorTriplet {
    /// Create a new color triplet from RGB components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Returns CSS-style hex format `#rrggbb`.
    #[must_use]
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Squared Euclidean distance in RGB space.
    #[must_use]
    pub const fn distance(&self, other: &Self) -> u32 {
        let dr = self.red.abs_diff(other.red) as u32;
        let dg = self.green.abs_diff(other.green) as u32;
        let db = self.blue.abs_diff(other.blue) as u32;
        dr * dr + dg * dg + db * db
    }
}

impl From<(u8, u8, u8)> for ColorTriplet {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

impl From<[u8; 3]> for ColorTriplet {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::new(red, green, blue)
    }
}

impl fmt::Display for ColorTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// Which half of the character cell a color applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Target {
    #[default]
    Foreground,
    Background,
}

/// Precision of a color request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Tier {
    /// 8 base colors plus bright.
    Indexed16 = 1,
    /// xterm 256-color palette.
    Indexed256 = 2,
    /// 24-bit RGB.
    TrueColor = 3,
}

/// Maximum color tier a destination is believed to support.
///
/// Ordered from least to most capable, so `capability >= Capability::Basic16`
/// reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Capability {
    /// Colors are suppressed entirely.
    #[default]
    None = 0,
    /// 8 colors; bright is only reachable through the bold attribute.
    Basic8 = 1,
    /// 16 colors.
    Basic16 = 2,
    /// 256 colors.
    Extended256 = 3,
    /// 24-bit colors.
    TrueColor = 4,
}

impl Capability {
    /// Get the name of this capability.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic8 => "8",
            Self::Basic16 => "16",
            Self::Extended256 => "256",
            Self::TrueColor => "truecolor",
        }
    }

    /// Number of distinct colors the destination can show.
    ///
    /// A destination without color support reports a single color.
    #[must_use]
    pub const fn num_colors(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Basic8 => 8,
            Self::Basic16 => 16,
            Self::Extended256 => 256,
            Self::TrueColor => 0x0100_0000,
        }
    }

    /// Highest request tier this capability renders without degradation.
    #[must_use]
    pub const fn max_tier(&self) -> Option<Tier> {
        match self {
            Self::None => None,
            Self::Basic8 | Self::Basic16 => Some(Tier::Indexed16),
            Self::Extended256 => Some(Tier::Indexed256),
            Self::TrueColor => Some(Tier::TrueColor),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The color part of a paint request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorValue {
    /// Base color 0-7 (ANSI order) plus the bright flag.
    Indexed16 { base: u8, bright: bool },
    /// Entry of the 256-color palette.
    Indexed256(u8),
    /// 24-bit RGB.
    TrueColor(ColorTriplet),
}

impl ColorValue {
    /// Precision tier of this value.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        match self {
            Self::Indexed16 { .. } => Tier::Indexed16,
            Self::Indexed256(_) => Tier::Indexed256,
            Self::TrueColor(_) => Tier::TrueColor,
        }
    }

    /// Approximate RGB value of this color.
    #[must_use]
    pub fn triplet(&self) -> ColorTriplet {
        match *self {
            Self::Indexed16 { base, bright } => STANDARD_PALETTE[usize::from(standard_number(base, bright))],
            Self::Indexed256(number) => EIGHT_BIT_PALETTE[usize::from(number)],
            Self::TrueColor(triplet) => triplet,
        }
    }

    /// Map this value onto what `capability` can show.
    ///
    /// Values already within the capability are returned unchanged. On a
    /// [`Capability::None`] destination the value is returned unchanged too;
    /// suppressing it is the dispatcher's job.
    #[must_use]
    pub fn degrade(self, capability: Capability) -> Self {
        let Some(max) = capability.max_tier() else {
            return self;
        };
        if self.tier() <= max {
            return self;
        }

        match (self, max) {
            (Self::TrueColor(triplet), Tier::Indexed256) => {
                Self::Indexed256(rgb_to_eight_bit(triplet))
            }
            (Self::Indexed256(number), Tier::Indexed16) if number < 16 => Self::Indexed16 {
                base: number & 7,
                bright: number >= 8,
            },
            (_, Tier::Indexed16) => {
                let number = rgb_to_standard(self.triplet());
                Self::Indexed16 {
                    base: number & 7,
                    bright: number >= 8,
                }
            }
            _ => self,
        }
    }
}

/// Granularity of a reset request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetKind {
    /// Reset every attribute.
    All,
    /// Default foreground color.
    Foreground,
    /// Default background color.
    Background,
    /// Switch bright/bold off.
    Bright,
}

/// A requested change in output color.
///
/// `Color` values are immutable; every operation returns a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Set the foreground or background color.
    Paint { target: Target, value: ColorValue },
    /// Switch on the bright (bold) attribute.
    Bright,
    /// Reset part or all of the current attributes.
    Reset(ResetKind),
}

impl Color {
    /// Create one of the 16 basic colors.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidColorIndex`] when `base` is not in `0..=7`.
    pub fn indexed16(base: u8, bright: bool, target: Target) -> Result<Self, ColorError> {
        check_range(u32::from(base), 7)?;
        Ok(Self::Paint {
            target,
            value: ColorValue::Indexed16 { base, bright },
        })
    }

    /// Create a color from the 256-color palette.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidColorIndex`] when `index` is above 255.
    pub fn indexed256(index: u32, target: Target) -> Result<Self, ColorError> {
        Ok(Self::Paint {
            target,
            value: ColorValue::Indexed256(channel(index)?),
        })
    }

    /// Create a 24-bit color.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidColorIndex`] when a component is above 255.
    pub fn true_color(red: u32, green: u32, blue: u32, target: Target) -> Result<Self, ColorError> {
        let triplet = ColorTriplet::new(channel(red)?, channel(green)?, channel(blue)?);
        Ok(Self::from_triplet(triplet, target))
    }

    /// Create a color from the 6x6x6 cube of the 256-color palette.
    ///
    /// Each component is a level from 0 to 5.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidColorIndex`] when a level is above 5.
    pub fn cube(red: u8, green: u8, blue: u8, target: Target) -> Result<Self, ColorError> {
        for level in [red, green, blue] {
            check_range(u32::from(level), 5)?;
        }
        let index = 16 + 36 * red + 6 * green + blue;
        Ok(Self::Paint {
            target,
            value: ColorValue::Indexed256(index),
        })
    }

    /// Create a 24-bit color from a triplet.
    #[must_use]
    pub const fn from_triplet(triplet: ColorTriplet, target: Target) -> Self {
        Self::Paint {
            target,
            value: ColorValue::TrueColor(triplet),
        }
    }

    /// OR the bright flag into a 16-color value.
    ///
    /// Composing bright onto a color that is already bright is a no-op, as is
    /// composing onto anything that is not a 16-color value.
    #[must_use]
    pub const fn compose(self, bright: bool) -> Self {
        match self {
            Self::Paint {
                target,
                value: ColorValue::Indexed16 { base, bright: was },
            } => Self::Paint {
                target,
                value: ColorValue::Indexed16 {
                    base,
                    bright: was || bright,
                },
            },
            other => other,
        }
    }

    /// Clear the bright flag of a 16-color value.
    #[must_use]
    pub const fn dark(self) -> Self {
        match self {
            Self::Paint {
                target,
                value: ColorValue::Indexed16 { base, .. },
            } => Self::Paint {
                target,
                value: ColorValue::Indexed16 { base, bright: false },
            },
            other => other,
        }
    }

    /// Precision tier, or `None` for modifiers and resets.
    #[must_use]
    pub const fn tier(&self) -> Option<Tier> {
        match self {
            Self::Paint { value, .. } => Some(value.tier()),
            Self::Bright | Self::Reset(_) => None,
        }
    }

    /// Target of a paint request.
    #[must_use]
    pub const fn target(&self) -> Option<Target> {
        match self {
            Self::Paint { target, .. } => Some(*target),
            Self::Bright | Self::Reset(_) => None,
        }
    }

    /// Color value of a paint request.
    #[must_use]
    pub const fn value(&self) -> Option<ColorValue> {
        match self {
            Self::Paint { value, .. } => Some(*value),
            Self::Bright | Self::Reset(_) => None,
        }
    }

    /// Returns true for reset requests.
    #[must_use]
    pub const fn is_reset(&self) -> bool {
        matches!(self, Self::Reset(_))
    }

    /// Degrade a paint request to what `capability` can show.
    ///
    /// Modifiers and resets pass through unchanged.
    #[must_use]
    pub fn degrade(self, capability: Capability) -> Self {
        match self {
            Self::Paint { target, value } => Self::Paint {
                target,
                value: value.degrade(capability),
            },
            other => other,
        }
    }
}

/// `a + b` means "apply `a`, then `b`".
///
/// - a full reset on the right wins outright
/// - [`colors::BRIGHT`] on the right brightens a 16-color value
/// - [`colors::RESET_BRIGHT`] on the right darkens a 16-color value
/// - otherwise the right-hand change replaces the left-hand one
///
/// A `Color` targets a single layer, so combining a foreground with a
/// background keeps only the right-hand one: `RED + BG_BLUE == BG_BLUE`.
/// Pass the two as separate items to get red on blue:
///
/// ```rust
/// use cmdcolor::prelude::*;
///
/// assert_eq!(RED + BG_BLUE, BG_BLUE);
/// printc!(RED, BG_BLUE, "red on blue", RESET);
/// ```
impl Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (
                Self::Paint {
                    value: ColorValue::Indexed16 { .. },
                    ..
                },
                Self::Bright,
            ) => self.compose(true),
            (
                Self::Paint {
                    value: ColorValue::Indexed16 { .. },
                    ..
                },
                Self::Reset(ResetKind::Bright),
            ) => self.dark(),
            _ => rhs,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bright => f.write_str("[bold]"),
            Self::Reset(ResetKind::All) => f.write_str("[reset]"),
            Self::Reset(ResetKind::Bright) => f.write_str("[non-bold]"),
            Self::Reset(ResetKind::Foreground) => f.write_str("[default foreground]"),
            Self::Reset(ResetKind::Background) => f.write_str("[default background]"),
            Self::Paint { target, value } => {
                f.write_str("[")?;
                match *value {
                    ColorValue::Indexed16 { base, bright } => {
                        if bright {
                            f.write_str("bright ")?;
                        }
                        f.write_str(color_name(base).unwrap_or("?"))?;
                    }
                    ColorValue::Indexed256(number) => write!(f, "color({number})")?,
                    ColorValue::TrueColor(triplet) => write!(f, "{triplet}")?,
                }
                if *target == Target::Background {
                    f.write_str(" background")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Error type for color construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// A numeric input was outside its valid range. Values are never clamped.
    InvalidColorIndex { value: u32, max: u32 },
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColorIndex { value, max } => {
                write!(f, "Invalid color index: {value} (expected 0..={max})")
            }
        }
    }
}

impl std::error::Error for ColorError {}

fn check_range(value: u32, max: u32) -> Result<(), ColorError> {
    if value > max {
        return Err(ColorError::InvalidColorIndex { value, max });
    }
    Ok(())
}

fn channel(value: u32) -> Result<u8, ColorError> {
    u8::try_from(value).map_err(|_| ColorError::InvalidColorIndex { value, max: 255 })
}

const fn standard_number(base: u8, bright: bool) -> u8 {
    if bright { (base & 7) | 8 } else { base & 7 }
}

/// Name of a base color, for indices 0 to 7.
#[must_use]
pub const fn color_name(base: u8) -> Option<&'static str> {
    match base {
        0 => Some("black"),
        1 => Some("red"),
        2 => Some("green"),
        3 => Some("yellow"),
        4 => Some("blue"),
        5 => Some("magenta"),
        6 => Some("cyan"),
        7 => Some("white"),
        _ => None,
    }
}

/// Named colors and control tokens.
pub mod colors {
    use super::{Color, ColorValue, ResetKind, Target};

    const fn fg(base: u8) -> Color {
        Color::Paint {
            target: Target::Foreground,
            value: ColorValue::Indexed16 { base, bright: false },
        }
    }

    const fn bg(base: u8) -> Color {
        Color::Paint {
            target: Target::Background,
            value: ColorValue::Indexed16 { base, bright: false },
        }
    }

    pub const BLACK: Color = fg(0);
    pub const RED: Color = fg(1);
    pub const GREEN: Color = fg(2);
    pub const YELLOW: Color = fg(3);
    pub const BLUE: Color = fg(4);
    pub const MAGENTA: Color = fg(5);
    pub const CYAN: Color = fg(6);
    pub const WHITE: Color = fg(7);

    pub const BG_BLACK: Color = bg(0);
    pub const BG_RED: Color = bg(1);
    pub const BG_GREEN: Color = bg(2);
    pub const BG_YELLOW: Color = bg(3);
    pub const BG_BLUE: Color = bg(4);
    pub const BG_MAGENTA: Color = bg(5);
    pub const BG_CYAN: Color = bg(6);
    pub const BG_WHITE: Color = bg(7);

    /// Bright/bold on. `BLUE + BRIGHT` is bright blue.
    pub const BRIGHT: Color = Color::Bright;
    /// Reset all attributes.
    pub const RESET: Color = Color::Reset(ResetKind::All);
    /// Default foreground color.
    pub const RESET_FG: Color = Color::Reset(ResetKind::Foreground);
    /// Default background color.
    pub const RESET_BG: Color = Color::Reset(ResetKind::Background);
    /// Bright/bold off.
    pub const RESET_BRIGHT: Color = Color::Reset(ResetKind::Bright);
}

// ============================================================================
// Color Palettes
// ============================================================================

/// Standard 16-color palette, in canonical ANSI order.
pub static STANDARD_PALETTE: [ColorTriplet; 16] = [
    ColorTriplet::new(0, 0, 0),       // 0: Black
    ColorTriplet::new(170, 0, 0),     // 1: Red
    ColorTriplet::new(0, 170, 0),     // 2: Green
    ColorTriplet::new(170, 85, 0),    // 3: Yellow
    ColorTriplet::new(0, 0, 170),     // 4: Blue
    ColorTriplet::new(170, 0, 170),   // 5: Magenta
    ColorTriplet::new(0, 170, 170),   // 6: Cyan
    ColorTriplet::new(170, 170, 170), // 7: White
    ColorTriplet::new(85, 85, 85),    // 8: Bright Black
    ColorTriplet::new(255, 85, 85),   // 9: Bright Red
    ColorTriplet::new(85, 255, 85),   // 10: Bright Green
    ColorTriplet::new(255, 255, 85),  // 11: Bright Yellow
    ColorTriplet::new(85, 85, 255),   // 12: Bright Blue
    ColorTriplet::new(255, 85, 255),  // 13: Bright Magenta
    ColorTriplet::new(85, 255, 255),  // 14: Bright Cyan
    ColorTriplet::new(255, 255, 255), // 15: Bright White
];

/// Generate the 256-color palette.
fn generate_eight_bit_palette() -> [ColorTriplet; 256] {
    let mut palette = [ColorTriplet::default(); 256];

    // 0-15: Standard colors
    palette[..16].copy_from_slice(&STANDARD_PALETTE);

    // 16-231: 6x6x6 color cube
    let levels = [0u8, 95, 135, 175, 215, 255];
    for r in 0..6 {
        for g in 0..6 {
            for b in 0..6 {
                let index = 16 + r * 36 + g * 6 + b;
                palette[index] = ColorTriplet::new(levels[r], levels[g], levels[b]);
            }
        }
    }

    // 232-255: Grayscale ramp
    for i in 0..24 {
        #[expect(clippy::cast_possible_truncation, reason = "max value is 8+23*10=238 which fits in u8")]
        let gray = (8 + i * 10) as u8;
        palette[232 + i] = ColorTriplet::new(gray, gray, gray);
    }

    palette
}

/// 256-color palette (lazy initialized).
pub static EIGHT_BIT_PALETTE: LazyLock<[ColorTriplet; 256]> =
    LazyLock::new(generate_eight_bit_palette);

// ============================================================================
// Color Conversion Algorithms
// ============================================================================

/// Convert RGB to the nearest entry of the 6x6x6 cube or grayscale ramp (cached).
///
/// Ties go to the lowest palette index.
#[must_use]
pub fn rgb_to_eight_bit(triplet: ColorTriplet) -> u8 {
    static CACHE: LazyLock<Mutex<LruCache<ColorTriplet, u8>>> =
        LazyLock::new(|| Mutex::new(LruCache::new(NonZeroUsize::new(1024).expect("non-zero"))));

    if let Some(&cached) = lock_recover(&CACHE).get(&triplet) {
        return cached;
    }

    let number = nearest(triplet, &EIGHT_BIT_PALETTE[16..], 16);
    lock_recover(&CACHE).put(triplet, number);
    number
}

/// Convert RGB to the nearest standard 16-color number.
///
/// Ties go to the lowest palette index.
#[must_use]
pub fn rgb_to_standard(triplet: ColorTriplet) -> u8 {
    nearest(triplet, &STANDARD_PALETTE, 0)
}

fn nearest(triplet: ColorTriplet, palette: &[ColorTriplet], offset: u8) -> u8 {
    let mut best_index = 0u8;
    let mut best_distance = u32::MAX;

    for (i, palette_color) in palette.iter().enumerate() {
        let distance = triplet.distance(palette_color);
        if distance < best_distance {
            best_distance = distance;
            #[expect(clippy::cast_possible_truncation, reason = "palettes have at most 256 entries")]
            {
                best_index = i as u8;
            }
        }
    }

    offset + best_index
}
