//! Terminal capability detection.
//!
//! [`resolve`] decides once per destination how colors reach it: which
//! [`OutputMode`] to use, the [`Capability`] to degrade requests to, and the
//! renderer state that goes with the mode. Everything it needs from the host
//! comes through [`Platform`]; everything it needs from the user comes
//! through [`Config`].
//!
//! Detection order:
//!
//! 1. A destination that is not an interactive terminal gets no color
//!    (unless [`ColorChoice::On`] forces it).
//! 2. On a legacy console, escape sequences are switched on when allowed.
//!    If that is disabled or fails, the console attribute calls are used.
//! 3. When requested, the terminfo database decides the capability.
//! 4. Otherwise ANSI with true color.

use std::fmt;
use std::str::FromStr;

use crate::color::Capability;
use crate::platform::{Platform, Stream};
use crate::render::win32::{DEFAULT_ATTRIBUTES, Win32Renderer};
use crate::render::{AnsiRenderer, CursesRenderer, Renderer};
use crate::terminfo::LookupError;

/// Terminal types whose terminfo entries report 8 colors but that display 16.
const UNDER_REPORTING_TERMINALS: &[&str] = &["screen", "screen-bce", "screen-s", "screen-w", "tmux"];

// ============================================================================
// Configuration
// ============================================================================

/// When to emit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorChoice {
    /// Never.
    Off,
    /// Even when the destination is not a terminal.
    On,
    /// Only on interactive terminals.
    #[default]
    Auto,
    /// Always, as ANSI escape sequences with true color. Skips detection.
    Ansi,
}

impl ColorChoice {
    /// Every choice, in the order they are documented.
    pub const ALL: [Self; 4] = [Self::Off, Self::On, Self::Auto, Self::Ansi];

    /// Name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Auto => "auto",
            Self::Ansi => "ansi",
        }
    }
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown color choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorChoiceParseError(pub String);

impl fmt::Display for ColorChoiceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid color choice: {:?} (expected off, on, auto or ansi)",
            self.0
        )
    }
}

impl std::error::Error for ColorChoiceParseError {}

impl FromStr for ColorChoice {
    type Err = ColorChoiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "never" | "0" | "false" => Ok(Self::Off),
            "on" | "always" | "1" | "true" => Ok(Self::On),
            "auto" | "" => Ok(Self::Auto),
            "ansi" => Ok(Self::Ansi),
            _ => Err(ColorChoiceParseError(s.to_string())),
        }
    }
}

/// User settings that steer detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// When to emit color.
    pub choice: ColorChoice,
    /// Allow escape sequences on the legacy console.
    pub ansi_enabled: bool,
    /// Consult the terminfo database.
    pub use_terminfo: bool,
    /// Declared terminal type (`TERM`).
    pub term: Option<String>,
    /// True color signal (`COLORTERM`).
    pub colorterm: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            choice: ColorChoice::Auto,
            ansi_enabled: true,
            use_terminfo: false,
            term: None,
            colorterm: None,
        }
    }
}

impl Config {
    /// Read the settings from the process environment.
    ///
    /// | Variable | Effect |
    /// |----------|--------|
    /// | `CMDCOLOR` | `off`, `on`, `auto` (default) or `ansi` |
    /// | `CMDCOLOR_ANSI` | `0` keeps the legacy console in attribute mode |
    /// | `CMDCOLOR_CURSES` | `1` consults the terminfo database |
    /// | `NO_COLOR` | non-empty: `off` when `CMDCOLOR` is unset |
    /// | `FORCE_COLOR` | non-empty, not `0`: `on` when `CMDCOLOR` is unset |
    /// | `TERM` | terminal type |
    /// | `COLORTERM` | `truecolor` or `24bit` signals direct color |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the settings through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let choice = match lookup("CMDCOLOR") {
            Some(value) => value.parse().unwrap_or_else(|err| {
                log::warn!("{err}, using auto");
                ColorChoice::Auto
            }),
            None if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) => ColorChoice::Off,
            None if lookup("FORCE_COLOR").is_some_and(|v| !v.is_empty() && v != "0") => {
                ColorChoice::On
            }
            None => ColorChoice::Auto,
        };

        Self {
            choice,
            ansi_enabled: lookup("CMDCOLOR_ANSI").is_none_or(|v| v.trim() != "0"),
            use_terminfo: lookup("CMDCOLOR_CURSES").is_some_and(|v| v.trim() == "1"),
            term: lookup("TERM").filter(|t| !t.is_empty()),
            colorterm: lookup("COLORTERM").filter(|t| !t.is_empty()),
        }
    }

    /// Set the color choice.
    #[must_use]
    pub fn with_choice(mut self, choice: ColorChoice) -> Self {
        self.choice = choice;
        self
    }

    /// Does `COLORTERM` announce direct color?
    #[must_use]
    pub fn signals_true_color(&self) -> bool {
        self.colorterm
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("truecolor") || v.eq_ignore_ascii_case("24bit"))
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Mechanism used to show color on a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputMode {
    /// Legacy console attribute calls.
    Win32,
    /// ANSI escape sequences.
    Ansi,
    /// Terminfo capability strings.
    Curses,
    /// No color.
    None,
}

impl OutputMode {
    /// Lowercase name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Win32 => "win32",
            Self::Ansi => "ansi",
            Self::Curses => "curses",
            Self::None => "none",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of detection for one destination.
#[derive(Debug)]
pub struct Resolution {
    mode: OutputMode,
    capability: Capability,
    renderer: Renderer,
}

impl Resolution {
    /// Destination gets no color.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            mode: OutputMode::None,
            capability: Capability::None,
            renderer: Renderer::None,
        }
    }

    /// Escape sequences with direct color.
    #[must_use]
    pub const fn ansi() -> Self {
        Self {
            mode: OutputMode::Ansi,
            capability: Capability::TrueColor,
            renderer: Renderer::Ansi(AnsiRenderer),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    #[must_use]
    pub const fn capability(&self) -> Capability {
        self.capability
    }

    #[must_use]
    pub const fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}

/// Decide how colors reach `stream`.
///
/// Never fails: every problem along the way degrades toward fewer colors and
/// is logged at debug level.
pub fn resolve(platform: &dyn Platform, stream: Stream, config: &Config) -> Resolution {
    let resolution = detect(platform, stream, config);
    log::debug!(
        "{stream:?}: mode {}, capability {}",
        resolution.mode,
        resolution.capability
    );
    resolution
}

fn detect(platform: &dyn Platform, stream: Stream, config: &Config) -> Resolution {
    match config.choice {
        ColorChoice::Off => return Resolution::none(),
        ColorChoice::Ansi => return Resolution::ansi(),
        ColorChoice::Auto if !platform.is_terminal(stream) => return Resolution::none(),
        ColorChoice::Auto | ColorChoice::On => {}
    }

    if platform.is_legacy_console() {
        if !config.ansi_enabled {
            return legacy(platform, stream);
        }
        if let Err(err) = platform.enable_virtual_terminal(stream) {
            log::debug!("virtual terminal processing unavailable: {err}");
            return legacy(platform, stream);
        }
    }

    if config.use_terminfo {
        return match from_terminfo(platform, config) {
            Ok(resolution) => resolution,
            Err(err) => {
                log::debug!("{err}, using ANSI");
                Resolution::ansi()
            }
        };
    }

    Resolution::ansi()
}

fn legacy(platform: &dyn Platform, stream: Stream) -> Resolution {
    let console = match platform.legacy_console(stream) {
        Ok(console) => console,
        Err(err) => {
            log::debug!("legacy console unavailable: {err}");
            return Resolution::none();
        }
    };
    let baseline = console.attributes().unwrap_or_else(|err| {
        log::debug!("console attributes unreadable ({err}), assuming {DEFAULT_ATTRIBUTES:#06x}");
        DEFAULT_ATTRIBUTES
    });
    Resolution {
        mode: OutputMode::Win32,
        capability: Capability::Basic16,
        renderer: Renderer::Win32(Win32Renderer::new(console, baseline)),
    }
}

fn from_terminfo(platform: &dyn Platform, config: &Config) -> Result<Resolution, LookupError> {
    let term = config.term.as_deref().ok_or(LookupError::NoTerminalType)?;
    let caps = platform.lookup_terminfo(term)?;

    let capability = match caps.colors {
        n if n < 8 => return Ok(Resolution::none()),
        8 if UNDER_REPORTING_TERMINALS.contains(&term) => Capability::Basic16,
        8..16 => Capability::Basic8,
        16..256 => Capability::Basic16,
        _ if config.signals_true_color() => Capability::TrueColor,
        _ => Capability::Extended256,
    };

    let renderer = CursesRenderer::from_caps(&caps, capability)?;
    Ok(Resolution {
        mode: OutputMode::Curses,
        capability,
        renderer: Renderer::Curses(renderer),
    })
}
