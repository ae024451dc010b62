//! ANSI/VT escape sequence rendering.
//!
//! Every color token becomes a single `ESC[<params>m` sequence. Partial resets
//! use their dedicated SGR codes so a foreground reset never clobbers a
//! background or bold attribute set earlier.
//!
//! ```
//! use cmdcolor::color::colors;
//! use cmdcolor::render::ansi::escape;
//!
//! assert_eq!(escape(colors::RED), "\x1b[31m");
//! assert_eq!(escape(colors::BLUE + colors::BRIGHT), "\x1b[94m");
//! assert_eq!(escape(colors::RESET_FG), "\x1b[39m");
//! ```

use std::fmt::Write as _;
use std::io::{self, Write};

use smallvec::{SmallVec, smallvec};

use crate::color::{Capability, Color, ColorValue, ResetKind, Target};

/// SGR parameters for a color token.
#[must_use]
pub fn sgr_params(color: Color) -> SmallVec<[u16; 5]> {
    match color {
        Color::Reset(ResetKind::All) => smallvec![0],
        Color::Reset(ResetKind::Bright) => smallvec![22],
        Color::Reset(ResetKind::Foreground) => smallvec![39],
        Color::Reset(ResetKind::Background) => smallvec![49],
        Color::Bright => smallvec![1],
        Color::Paint { target, value } => {
            let foreground = target == Target::Foreground;
            match value {
                ColorValue::Indexed16 { base, bright } => {
                    let code = match (foreground, bright) {
                        (true, false) => 30,
                        (true, true) => 90,
                        (false, false) => 40,
                        (false, true) => 100,
                    };
                    smallvec![code + u16::from(base)]
                }
                ColorValue::Indexed256(number) => {
                    smallvec![if foreground { 38 } else { 48 }, 5, u16::from(number)]
                }
                ColorValue::TrueColor(triplet) => smallvec![
                    if foreground { 38 } else { 48 },
                    2,
                    u16::from(triplet.red),
                    u16::from(triplet.green),
                    u16::from(triplet.blue),
                ],
            }
        }
    }
}

/// The escape sequence for a color token, without degradation.
#[must_use]
pub fn escape(color: Color) -> String {
    let mut sequence = String::from("\x1b[");
    for (i, param) in sgr_params(color).iter().enumerate() {
        if i > 0 {
            sequence.push(';');
        }
        let _ = write!(sequence, "{param}");
    }
    sequence.push('m');
    sequence
}

/// Renders color tokens as ANSI escape sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiRenderer;

impl AnsiRenderer {
    /// Write the sequence for `color`, degraded to `capability`.
    pub fn render(&self, color: Color, capability: Capability, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(escape(color.degrade(capability)).as_bytes())
    }
}
