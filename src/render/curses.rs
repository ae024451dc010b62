//! Rendering through terminfo capability strings.

use std::io::{self, Write};

use crate::color::{Capability, Color, ColorValue, Target};
use crate::terminfo::{self, LookupError, TermCaps};

use super::ansi;

/// Renders colors with the `setaf`, `setab` and `bold` strings of a terminfo entry.
///
/// Resets and direct color have no portable terminfo capability and are
/// written as plain ANSI sequences. So are bright colors on entries that
/// report 8 colors but were detected as 16-color terminals.
#[derive(Debug, Clone)]
pub struct CursesRenderer {
    term: String,
    setaf: String,
    setab: String,
    bold: Option<String>,
    colors: i32,
    capability: Capability,
}

impl CursesRenderer {
    /// Build a renderer from a looked-up entry.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::MissingCapability`] when the entry has no
    /// `setaf` or no `setab` string.
    pub fn from_caps(caps: &TermCaps, capability: Capability) -> Result<Self, LookupError> {
        let missing = |name| LookupError::MissingCapability {
            term: caps.name.clone(),
            capability: name,
        };
        Ok(Self {
            term: caps.name.clone(),
            setaf: caps.setaf.clone().ok_or_else(|| missing("setaf"))?,
            setab: caps.setab.clone().ok_or_else(|| missing("setab"))?,
            bold: caps.bold.clone(),
            colors: caps.colors,
            capability,
        })
    }

    /// Terminal type the strings came from.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Capability this renderer degrades to.
    #[must_use]
    pub const fn capability(&self) -> Capability {
        self.capability
    }

    /// Byte sequence for `color`.
    #[must_use]
    pub fn sequence(&self, color: Color) -> String {
        let degraded = color.degrade(self.capability);
        match degraded {
            Color::Reset(_) => ansi::escape(color),
            Color::Bright => self.bold_sequence(),
            Color::Paint { target, value } => match value {
                ColorValue::Indexed16 { base, bright } => {
                    if bright && self.capability >= Capability::Basic16 && self.colors < 16 {
                        // Entry strings only cover 0..7 on terminals lifted to 16 colors.
                        ansi::escape(degraded)
                    } else if self.capability >= Capability::Basic16 {
                        let number = i32::from(base) + if bright { 8 } else { 0 };
                        self.set_color(target, number, degraded)
                    } else {
                        let plain = degraded.dark();
                        let mut sequence = String::new();
                        // Eight-color terminals show a bright foreground as bold.
                        if bright && target == Target::Foreground {
                            sequence.push_str(&self.bold_sequence());
                        }
                        sequence.push_str(&self.set_color(target, i32::from(base), plain));
                        sequence
                    }
                }
                ColorValue::Indexed256(number) => {
                    self.set_color(target, i32::from(number), degraded)
                }
                ColorValue::TrueColor(_) => ansi::escape(degraded),
            },
        }
    }

    /// Write the sequence for `color`.
    pub fn render(&self, color: Color, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.sequence(color).as_bytes())
    }

    fn bold_sequence(&self) -> String {
        match &self.bold {
            Some(bold) => self.expand_or(bold, &[], Color::Bright),
            None => ansi::escape(Color::Bright),
        }
    }

    fn set_color(&self, target: Target, number: i32, fallback: Color) -> String {
        let template = match target {
            Target::Foreground => &self.setaf,
            Target::Background => &self.setab,
        };
        self.expand_or(template, &[number], fallback)
    }

    fn expand_or(&self, template: &str, params: &[i32], fallback: Color) -> String {
        terminfo::expand(template, params).unwrap_or_else(|err| {
            log::debug!(
                "terminfo string for {} failed to expand ({err}), using ANSI",
                self.term
            );
            ansi::escape(fallback)
        })
    }
}
