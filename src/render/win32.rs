//! Legacy console attribute rendering.
//!
//! The legacy console has no escape sequences. Color lives in a 16-bit
//! attribute word: the low nibble is the foreground, the next nibble the
//! background, and each nibble is `intensity | red | green | blue` with blue
//! in bit 0. Colors in this crate use the ANSI order (red in bit 0), so every
//! index passes through [`to_legacy_index`] on its way into the word.

use std::fmt;
use std::io;
use std::sync::Mutex;

use bitflags::bitflags;

use crate::color::{Capability, Color, ColorValue, ResetKind, Target};
use crate::platform::LegacyConsole;
use crate::sync::lock_recover;

bitflags! {
    /// Bits of a legacy console attribute word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConsoleAttributes: u16 {
        const FOREGROUND_BLUE      = 0x0001;
        const FOREGROUND_GREEN     = 0x0002;
        const FOREGROUND_RED       = 0x0004;
        const FOREGROUND_INTENSITY = 0x0008;
        const BACKGROUND_BLUE      = 0x0010;
        const BACKGROUND_GREEN     = 0x0020;
        const BACKGROUND_RED       = 0x0040;
        const BACKGROUND_INTENSITY = 0x0080;

        const _ = !0;
    }
}

impl ConsoleAttributes {
    /// Foreground nibble.
    pub const FOREGROUND: Self = Self::from_bits_retain(0x000F);
    /// Background nibble.
    pub const BACKGROUND: Self = Self::from_bits_retain(0x00F0);
}

/// Attribute word used when the console cannot report its own.
pub const DEFAULT_ATTRIBUTES: u16 = 0x0007;

/// Translate an ANSI-order index (0-7) to the legacy console order.
///
/// Swaps the red and blue bits. Applying it twice gives the input back.
#[must_use]
pub const fn to_legacy_index(index: u8) -> u8 {
    ((index & 1) << 2) | (index & 2) | ((index & 4) >> 2)
}

/// Compute the attribute word after applying `color` to `word`.
///
/// Only the nibble a color targets changes; bits above the low byte (grid
/// and underline flags) always survive. `baseline` is the word captured when
/// the console was opened and is what resets restore.
#[must_use]
pub fn apply_to_word(word: u16, color: Color, baseline: u16) -> u16 {
    let mut attributes = ConsoleAttributes::from_bits_retain(word);
    let baseline = ConsoleAttributes::from_bits_retain(baseline);

    match color.degrade(Capability::Basic16) {
        Color::Reset(ResetKind::All) => {
            attributes.remove(ConsoleAttributes::FOREGROUND | ConsoleAttributes::BACKGROUND);
            attributes |= baseline & (ConsoleAttributes::FOREGROUND | ConsoleAttributes::BACKGROUND);
        }
        Color::Reset(ResetKind::Foreground) => {
            attributes.remove(ConsoleAttributes::FOREGROUND);
            attributes |= baseline & ConsoleAttributes::FOREGROUND;
        }
        Color::Reset(ResetKind::Background) => {
            attributes.remove(ConsoleAttributes::BACKGROUND);
            attributes |= baseline & ConsoleAttributes::BACKGROUND;
        }
        Color::Reset(ResetKind::Bright) => {
            attributes.remove(ConsoleAttributes::FOREGROUND_INTENSITY);
        }
        Color::Bright => {
            attributes.insert(ConsoleAttributes::FOREGROUND_INTENSITY);
        }
        Color::Paint {
            target,
            value: ColorValue::Indexed16 { base, bright },
        } => {
            let mut nibble = u16::from(to_legacy_index(base));
            if bright {
                nibble |= ConsoleAttributes::FOREGROUND_INTENSITY.bits();
            }
            match target {
                Target::Foreground => {
                    attributes.remove(ConsoleAttributes::FOREGROUND);
                    attributes |= ConsoleAttributes::from_bits_retain(nibble);
                }
                Target::Background => {
                    attributes.remove(ConsoleAttributes::BACKGROUND);
                    attributes |= ConsoleAttributes::from_bits_retain(nibble << 4);
                }
            }
        }
        // Degraded to Basic16 above.
        Color::Paint { .. } => {}
    }

    attributes.bits()
}

/// A console attribute call failed.
#[derive(Debug)]
pub struct AttributeCallFailed {
    /// Word that could not be applied.
    pub attributes: u16,
    pub source: io::Error,
}

impl fmt::Display for AttributeCallFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to set console attributes to {:#06x}: {}",
            self.attributes, self.source
        )
    }
}

impl std::error::Error for AttributeCallFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Renders colors through the legacy console attribute call.
pub struct Win32Renderer {
    console: Box<dyn LegacyConsole>,
    baseline: u16,
    current: Mutex<u16>,
}

impl Win32Renderer {
    /// Wrap an opened console, recording `baseline` as the word resets return to.
    #[must_use]
    pub fn new(console: Box<dyn LegacyConsole>, baseline: u16) -> Self {
        Self {
            console,
            baseline,
            current: Mutex::new(baseline),
        }
    }

    /// Attribute word captured when the console was opened.
    #[must_use]
    pub const fn baseline(&self) -> u16 {
        self.baseline
    }

    /// Attribute word most recently applied.
    #[must_use]
    pub fn current(&self) -> u16 {
        *lock_recover(&self.current)
    }

    /// Apply `color` to the console.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeCallFailed`] when the console rejects the new word.
    /// The remembered word is left as it was.
    pub fn apply(&self, color: Color) -> Result<(), AttributeCallFailed> {
        let mut current = lock_recover(&self.current);
        let next = apply_to_word(*current, color, self.baseline);
        self.console
            .set_attributes(next)
            .map_err(|source| AttributeCallFailed {
                attributes: next,
                source,
            })?;
        *current = next;
        Ok(())
    }

    /// Write text through the wide-character console call.
    pub fn write_text(&self, text: &str) -> io::Result<()> {
        self.console.write_wide(text)
    }
}

impl fmt::Debug for Win32Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Win32Renderer")
            .field("baseline", &format_args!("{:#06x}", self.baseline))
            .field("current", &format_args!("{:#06x}", self.current()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::colors;

    struct RecordingConsole {
        fail: bool,
        calls: std::sync::Arc<Mutex<Vec<u16>>>,
    }

    impl LegacyConsole for RecordingConsole {
        fn attributes(&self) -> io::Result<u16> {
            Ok(DEFAULT_ATTRIBUTES)
        }

        fn set_attributes(&self, attributes: u16) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::other("SetConsoleTextAttribute failed"));
            }
            self.calls.lock().unwrap().push(attributes);
            Ok(())
        }

        fn write_wide(&self, _text: &str) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_legacy_index_swaps_red_and_blue() {
        assert_eq!(to_legacy_index(0), 0);
        assert_eq!(to_legacy_index(1), 4); // red
        assert_eq!(to_legacy_index(2), 2); // green
        assert_eq!(to_legacy_index(3), 6); // yellow
        assert_eq!(to_legacy_index(4), 1); // blue
        assert_eq!(to_legacy_index(6), 3); // cyan
        assert_eq!(to_legacy_index(7), 7);
    }

    #[test]
    fn test_legacy_index_is_involution() {
        for i in 0..8 {
            assert_eq!(to_legacy_index(to_legacy_index(i)), i);
        }
    }

    #[test]
    fn test_bright_green_keeps_background() {
        let word = apply_to_word(0x0047, colors::GREEN + colors::BRIGHT, 0x0007);
        assert_eq!(word, 0x0040 | 0x2 | 0x8);
    }

    #[test]
    fn test_background_keeps_foreground() {
        let word = apply_to_word(0x000A, colors::BG_RED, 0x0007);
        assert_eq!(word, 0x004A);
    }

    #[test]
    fn test_high_bits_preserved() {
        let word = apply_to_word(0x8007, colors::BLUE, 0x0007);
        assert_eq!(word, 0x8001);
        assert_eq!(apply_to_word(0x8017, colors::RESET, 0x0007), 0x8007);
    }

    #[test]
    fn test_resets_restore_from_baseline() {
        let baseline = 0x0017;
        assert_eq!(apply_to_word(0x00CE, colors::RESET, baseline), 0x0017);
        assert_eq!(apply_to_word(0x00CE, colors::RESET_FG, baseline), 0x00C7);
        assert_eq!(apply_to_word(0x00CE, colors::RESET_BG, baseline), 0x001E);
        assert_eq!(apply_to_word(0x00CE, colors::RESET_BRIGHT, baseline), 0x00C6);
    }

    #[test]
    fn test_bright_token_sets_intensity() {
        assert_eq!(apply_to_word(0x0007, colors::BRIGHT, 0x0007), 0x000F);
    }

    #[test]
    fn test_extended_colors_degrade_first() {
        let red = Color::true_color(255, 0, 0, Target::Foreground).unwrap();
        // Nearest standard color is red; legacy red is 0x4.
        assert_eq!(apply_to_word(0x0007, red, 0x0007), 0x0004);
    }

    #[test]
    fn test_renderer_tracks_current_word() {
        let calls = std::sync::Arc::new(Mutex::new(Vec::new()));
        let renderer = Win32Renderer::new(
            Box::new(RecordingConsole {
                fail: false,
                calls: std::sync::Arc::clone(&calls),
            }),
            0x0007,
        );

        renderer.apply(colors::BG_BLUE).unwrap();
        renderer.apply(colors::YELLOW).unwrap();
        assert_eq!(renderer.current(), 0x0016);
        assert_eq!(*calls.lock().unwrap(), vec![0x0017, 0x0016]);
    }

    #[test]
    fn test_failed_call_leaves_word_unchanged() {
        let renderer = Win32Renderer::new(
            Box::new(RecordingConsole {
                fail: true,
                calls: std::sync::Arc::default(),
            }),
            0x0007,
        );

        let err = renderer.apply(colors::RED).unwrap_err();
        assert_eq!(err.attributes, 0x0004);
        assert!(err.to_string().contains("0x0004"));
        assert_eq!(renderer.current(), 0x0007);
    }
}
