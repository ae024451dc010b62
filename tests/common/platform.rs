//! Scriptable host for integration tests.
//!
//! [`ScriptedPlatform`] answers every [`Platform`] query from its fields and
//! counts how often it was asked. Legacy console calls are recorded in order
//! so tests can assert on the exact attribute words applied.
//!
//! ```rust,ignore
//! use common::platform::ScriptedPlatform;
//!
//! let platform = ScriptedPlatform::terminal();
//! let console = Console::builder().platform(platform.shared()).build();
//! ```

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cmdcolor::platform::{LegacyConsole, Platform, Stream};
use cmdcolor::terminfo::{LookupError, TermCaps};

/// One recorded legacy console call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCall {
    SetAttributes(u16),
    Write(String),
}

#[derive(Debug, Default)]
pub struct ScriptedPlatform {
    pub terminal: bool,
    pub legacy: bool,
    pub vt_ok: bool,
    pub console_ok: bool,
    /// Attribute word the console reports when opened.
    pub baseline: Option<u16>,
    /// Fail every attribute call.
    pub attribute_calls_fail: bool,
    pub caps: Option<TermCaps>,
    pub probes: AtomicUsize,
    pub calls: Arc<Mutex<Vec<ConsoleCall>>>,
}

impl ScriptedPlatform {
    /// An interactive non-legacy terminal.
    pub fn terminal() -> Self {
        Self {
            terminal: true,
            ..Self::default()
        }
    }

    /// A legacy console where escape sequences cannot be switched on.
    pub fn legacy_console(baseline: u16) -> Self {
        Self {
            terminal: true,
            legacy: true,
            console_ok: true,
            baseline: Some(baseline),
            ..Self::default()
        }
    }

    /// A terminal with a terminfo entry reporting `colors`.
    ///
    /// Entries with 8 colors or fewer carry the plain `linux`/`screen`
    /// strings, larger ones the xterm strings.
    pub fn with_terminfo(name: &str, colors: i32) -> Self {
        let caps = if colors <= 8 {
            eight_color_caps(name)
        } else {
            xterm_caps(name, colors)
        };
        Self {
            terminal: true,
            caps: Some(caps),
            ..Self::default()
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of queries answered so far.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Legacy console calls so far.
    pub fn console_calls(&self) -> Vec<ConsoleCall> {
        self.calls.lock().unwrap().clone()
    }

    fn probe(&self) {
        self.probes.fetch_add(1, Ordering::SeqCst);
    }
}

impl Platform for ScriptedPlatform {
    fn is_terminal(&self, _stream: Stream) -> bool {
        self.probe();
        self.terminal
    }

    fn is_legacy_console(&self) -> bool {
        self.probe();
        self.legacy
    }

    fn enable_virtual_terminal(&self, _stream: Stream) -> io::Result<()> {
        self.probe();
        if self.vt_ok {
            Ok(())
        } else {
            Err(io::Error::other("SetConsoleMode refused"))
        }
    }

    fn legacy_console(&self, _stream: Stream) -> io::Result<Box<dyn LegacyConsole>> {
        self.probe();
        if !self.console_ok {
            return Err(io::Error::other("no console attached"));
        }
        Ok(Box::new(RecordingConsole {
            baseline: self.baseline,
            fail: self.attribute_calls_fail,
            calls: Arc::clone(&self.calls),
        }))
    }

    fn lookup_terminfo(&self, term: &str) -> Result<TermCaps, LookupError> {
        self.probe();
        self.caps.clone().ok_or_else(|| LookupError::Database {
            term: term.to_string(),
            message: "no entry".to_string(),
        })
    }
}

struct RecordingConsole {
    baseline: Option<u16>,
    fail: bool,
    calls: Arc<Mutex<Vec<ConsoleCall>>>,
}

impl LegacyConsole for RecordingConsole {
    fn attributes(&self) -> io::Result<u16> {
        self.baseline
            .ok_or_else(|| io::Error::other("GetConsoleScreenBufferInfo failed"))
    }

    fn set_attributes(&self, attributes: u16) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::other("SetConsoleTextAttribute failed"));
        }
        self.calls
            .lock()
            .unwrap()
            .push(ConsoleCall::SetAttributes(attributes));
        Ok(())
    }

    fn write_wide(&self, text: &str) -> io::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(ConsoleCall::Write(text.to_string()));
        Ok(())
    }
}

/// Terminfo entry with the xterm color strings.
pub fn xterm_caps(name: &str, colors: i32) -> TermCaps {
    TermCaps {
        name: name.to_string(),
        colors,
        setaf: Some(
            "\x1b[%?%p1%{8}%<%t3%p1%d%e%p1%{16}%<%t9%p1%{8}%-%d%e38;5;%p1%d%;m".to_string(),
        ),
        setab: Some(
            "\x1b[%?%p1%{8}%<%t4%p1%d%e%p1%{16}%<%t10%p1%{8}%-%d%e48;5;%p1%d%;m".to_string(),
        ),
        bold: Some("\x1b[1m".to_string()),
    }
}

/// Terminfo entry with the `screen`/`tmux` color strings, which only
/// express indices 0..7.
pub fn eight_color_caps(name: &str) -> TermCaps {
    TermCaps {
        name: name.to_string(),
        colors: 8,
        setaf: Some("\x1b[3%p1%dm".to_string()),
        setab: Some("\x1b[4%p1%dm".to_string()),
        bold: Some("\x1b[1m".to_string()),
    }
}

// =============================================================================
// Environment
// =============================================================================

/// Run `f` with the given variables set and the others listed in `clear`
/// removed, restoring everything afterwards.
///
/// Only call from `#[serial]` tests. Environment variable manipulation
/// requires unsafe in Rust 2024 edition.
pub fn with_env<F, R>(set: &[(&str, &str)], clear: &[&str], f: F) -> R
where
    F: FnOnce() -> R,
{
    let keys: Vec<&str> = set.iter().map(|(k, _)| *k).chain(clear.iter().copied()).collect();
    let saved: Vec<(&str, Option<String>)> = keys
        .iter()
        .map(|k| (*k, std::env::var(k).ok()))
        .collect();

    // SAFETY: Test-only code, serialized with #[serial]
    unsafe {
        for key in clear {
            std::env::remove_var(key);
        }
        for (key, value) in set {
            std::env::set_var(key, value);
        }
    }

    let result = f();

    // SAFETY: Test-only code, serialized with #[serial]
    unsafe {
        for (key, value) in saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    result
}

/// Every variable the configuration reads.
pub const CONFIG_VARS: &[&str] = &[
    "CMDCOLOR",
    "CMDCOLOR_ANSI",
    "CMDCOLOR_CURSES",
    "NO_COLOR",
    "FORCE_COLOR",
    "TERM",
    "COLORTERM",
];
