//! Operating-system collaborators.
//!
//! Everything the engine asks of the host lives behind [`Platform`]: the
//! is-a-terminal predicate, switching on virtual terminal processing, the
//! legacy console attribute and wide-character write calls, and terminfo
//! lookups. [`SystemPlatform`] talks to the real system; tests substitute a
//! recording fake.

use std::fmt;
use std::io::{self, IsTerminal};

use crate::terminfo::{self, LookupError, TermCaps};

/// Output destination a [`crate::Console`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
    /// A caller-supplied writer (file, buffer, pipe).
    Writer,
}

/// Host services the capability detector and renderers depend on.
pub trait Platform: Send + Sync + fmt::Debug {
    /// Is `stream` attached to an interactive terminal?
    fn is_terminal(&self, stream: Stream) -> bool;

    /// Does this host use the legacy attribute-based console?
    fn is_legacy_console(&self) -> bool;

    /// Switch on escape sequence processing for `stream`.
    fn enable_virtual_terminal(&self, stream: Stream) -> io::Result<()>;

    /// Open the legacy console behind `stream`.
    fn legacy_console(&self, stream: Stream) -> io::Result<Box<dyn LegacyConsole>>;

    /// Look up a terminal type in the capability database.
    fn lookup_terminfo(&self, term: &str) -> Result<TermCaps, LookupError>;
}

/// The legacy console calls used by the Win32 renderer.
pub trait LegacyConsole: Send + Sync {
    /// Current text attribute word.
    fn attributes(&self) -> io::Result<u16>;

    /// Replace the text attribute word.
    fn set_attributes(&self, attributes: u16) -> io::Result<()>;

    /// Write text through the wide-character console call.
    fn write_wide(&self, text: &str) -> io::Result<()>;
}

/// The host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPlatform;

impl Platform for SystemPlatform {
    fn is_terminal(&self, stream: Stream) -> bool {
        match stream {
            Stream::Stdout => io::stdout().is_terminal(),
            Stream::Stderr => io::stderr().is_terminal(),
            Stream::Writer => false,
        }
    }

    fn is_legacy_console(&self) -> bool {
        cfg!(windows)
    }

    fn enable_virtual_terminal(&self, stream: Stream) -> io::Result<()> {
        if stream == Stream::Writer {
            return Err(unsupported());
        }
        sys::enable_virtual_terminal()
    }

    fn legacy_console(&self, stream: Stream) -> io::Result<Box<dyn LegacyConsole>> {
        if stream == Stream::Writer {
            return Err(unsupported());
        }
        sys::open_console()
    }

    fn lookup_terminfo(&self, term: &str) -> Result<TermCaps, LookupError> {
        terminfo::lookup(term)
    }
}

fn unsupported() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "no legacy console for this stream")
}

/// Console access through `crossterm_winapi`.
///
/// Both standard streams share the active screen buffer, so the mode and
/// attribute calls go to the current output handle.
#[cfg(windows)]
mod sys {
    use std::io;

    use crossterm_winapi::{Console, ConsoleMode, Handle, HandleType, ScreenBuffer};

    use super::LegacyConsole;

    const ENABLE_PROCESSED_OUTPUT: u32 = 0x0001;
    const ENABLE_VIRTUAL_TERMINAL_PROCESSING: u32 = 0x0004;

    pub(super) fn enable_virtual_terminal() -> io::Result<()> {
        let mode = ConsoleMode::from(Handle::new(HandleType::CurrentOutputHandle)?);
        let current = mode.mode()?;
        mode.set_mode(current | ENABLE_PROCESSED_OUTPUT | ENABLE_VIRTUAL_TERMINAL_PROCESSING)
    }

    pub(super) fn open_console() -> io::Result<Box<dyn LegacyConsole>> {
        Ok(Box::new(WinConsole {
            handle: Handle::new(HandleType::CurrentOutputHandle)?,
        }))
    }

    struct WinConsole {
        handle: Handle,
    }

    impl LegacyConsole for WinConsole {
        fn attributes(&self) -> io::Result<u16> {
            let info = ScreenBuffer::from(self.handle.clone()).info()?;
            Ok(info.attributes())
        }

        fn set_attributes(&self, attributes: u16) -> io::Result<()> {
            Console::from(self.handle.clone()).set_text_attribute(attributes)
        }

        fn write_wide(&self, text: &str) -> io::Result<()> {
            Console::from(self.handle.clone())
                .write_char_buffer(text.as_bytes())
                .map(|_| ())
        }
    }
}

#[cfg(not(windows))]
mod sys {
    use std::io;

    use super::{LegacyConsole, unsupported};

    pub(super) fn enable_virtual_terminal() -> io::Result<()> {
        Err(unsupported())
    }

    pub(super) fn open_console() -> io::Result<Box<dyn LegacyConsole>> {
        Err(unsupported())
    }
}
