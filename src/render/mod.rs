//! Output-mode renderers.
//!
//! A [`Renderer`] is the per-destination state chosen by the capability
//! detector. It turns color tokens into bytes (ANSI, terminfo) or console
//! attribute calls (Win32), or drops them (None).

pub mod ansi;
pub mod curses;
pub mod win32;

use std::io::{self, Write};

use crate::color::{Capability, Color};

pub use ansi::AnsiRenderer;
pub use curses::CursesRenderer;
pub use win32::{AttributeCallFailed, Win32Renderer};

/// Renderer state of a resolved destination.
#[derive(Debug)]
pub enum Renderer {
    /// Escape sequences written to the byte stream.
    Ansi(AnsiRenderer),
    /// Legacy console attribute calls.
    Win32(Win32Renderer),
    /// Terminfo capability strings.
    Curses(CursesRenderer),
    /// Colors are discarded.
    None,
}

impl Renderer {
    /// Does this renderer talk to the console directly instead of the byte stream?
    #[must_use]
    pub const fn writes_to_console(&self) -> bool {
        matches!(self, Self::Win32(_))
    }

    /// Apply one color token.
    ///
    /// A failing console attribute call is logged and skipped; only errors
    /// from `out` are returned.
    pub fn apply(&self, color: Color, capability: Capability, out: &mut dyn Write) -> io::Result<()> {
        match self {
            Self::Ansi(renderer) => renderer.render(color, capability, out),
            Self::Curses(renderer) => renderer.render(color, out),
            Self::Win32(renderer) => {
                // Buffered text must land before the attribute changes.
                out.flush()?;
                if let Err(err) = renderer.apply(color) {
                    log::warn!("{err}");
                }
                Ok(())
            }
            Self::None => Ok(()),
        }
    }

    /// Write a run of text.
    pub fn write_text(&self, text: &str, out: &mut dyn Write) -> io::Result<()> {
        match self {
            Self::Win32(renderer) => {
                out.flush()?;
                renderer.write_text(text)
            }
            _ => out.write_all(text.as_bytes()),
        }
    }
}
