//! Console - the destination colored output is printed to.
//!
//! A [`Console`] owns one output stream, the configuration and platform used
//! to detect what that stream can show, and the [`Resolution`] produced by
//! detection. Detection runs lazily on the first call that needs it and is
//! never repeated.
//!
//! # Examples
//!
//! ```
//! use cmdcolor::prelude::*;
//!
//! let console = Console::builder()
//!     .writer(Vec::new())
//!     .color_choice(ColorChoice::Ansi)
//!     .build();
//! console.printc(&["status: ".into(), GREEN.into(), "ok".into(), RESET.into()]);
//! assert_eq!(console.color_mode(), OutputMode::Ansi);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

use crate::color::{Capability, Color, colors};
use crate::platform::{Platform, Stream, SystemPlatform};
use crate::render::Renderer;
use crate::sync::lock_recover;
use crate::terminal::{self, ColorChoice, Config, OutputMode, Resolution};

// ============================================================================
// Items
// ============================================================================

/// One argument of a colored print: text to write or a color change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item<'a> {
    Text(Cow<'a, str>),
    Color(Color),
}

impl Item<'_> {
    /// Text item from anything displayable.
    pub fn display(value: impl fmt::Display) -> Item<'static> {
        Item::Text(Cow::Owned(value.to_string()))
    }
}

impl<'a> From<&'a str> for Item<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for Item<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl From<String> for Item<'_> {
    fn from(text: String) -> Self {
        Self::Text(Cow::Owned(text))
    }
}

impl From<char> for Item<'_> {
    fn from(c: char) -> Self {
        Self::Text(Cow::Owned(c.to_string()))
    }
}

impl From<Color> for Item<'_> {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

/// Formatting around the items of one print call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Written between consecutive text items. Colors never trigger it.
    pub sep: Cow<'static, str>,
    /// Written after everything else, without color.
    pub end: Cow<'static, str>,
    /// Reset all attributes after the items.
    pub reset_after: bool,
}

impl PrintOptions {
    /// Nothing added around the items.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sep: Cow::Borrowed(""),
            end: Cow::Borrowed(""),
            reset_after: false,
        }
    }

    /// Space-separated items, a trailing newline and a reset before it.
    #[must_use]
    pub const fn line() -> Self {
        Self {
            sep: Cow::Borrowed(" "),
            end: Cow::Borrowed("\n"),
            reset_after: true,
        }
    }

    #[must_use]
    pub fn with_sep(mut self, sep: impl Into<Cow<'static, str>>) -> Self {
        self.sep = sep.into();
        self
    }

    #[must_use]
    pub fn with_end(mut self, end: impl Into<Cow<'static, str>>) -> Self {
        self.end = end.into();
        self
    }

    #[must_use]
    pub const fn with_reset_after(mut self, reset: bool) -> Self {
        self.reset_after = reset;
        self
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Console
// ============================================================================

/// An output destination with lazily detected color support.
pub struct Console {
    stream: Stream,
    writer: Mutex<Box<dyn Write + Send>>,
    config: Config,
    platform: Arc<dyn Platform>,
    resolution: OnceCell<Resolution>,
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("stream", &self.stream)
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("resolution", &self.resolution.get())
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Console for standard output, configured from the environment.
    #[must_use]
    pub fn stdout() -> Self {
        Self::builder().stream(Stream::Stdout).build()
    }

    /// Console for standard error, configured from the environment.
    #[must_use]
    pub fn stderr() -> Self {
        Self::builder().stream(Stream::Stderr).build()
    }

    /// Create a console builder for custom configuration.
    #[must_use]
    pub fn builder() -> ConsoleBuilder {
        ConsoleBuilder::default()
    }

    /// The stream this console writes to.
    #[must_use]
    pub const fn stream(&self) -> Stream {
        self.stream
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Detection result, running detection on first use.
    pub fn resolution(&self) -> &Resolution {
        self.resolution
            .get_or_init(|| terminal::resolve(self.platform.as_ref(), self.stream, &self.config))
    }

    /// Mechanism used to show color.
    pub fn color_mode(&self) -> OutputMode {
        self.resolution().mode()
    }

    /// Richest color precision shown faithfully.
    pub fn capability(&self) -> Capability {
        self.resolution().capability()
    }

    /// Number of distinct colors: 1, 8, 16, 256 or 16777216.
    pub fn num_colors(&self) -> u32 {
        self.capability().num_colors()
    }

    /// Will color items change anything on this console?
    pub fn will_print_color(&self) -> bool {
        self.color_mode() != OutputMode::None
    }

    /// Print `items` in order with no separator, end or trailing reset.
    ///
    /// Write errors are logged and dropped. Use [`Console::try_printc`] to
    /// receive them.
    pub fn printc(&self, items: &[Item<'_>]) {
        if let Err(err) = self.try_printc(items) {
            log::debug!("printc on {:?} failed: {err}", self.stream);
        }
    }

    /// Print `items` with `options`, dropping write errors.
    pub fn printc_with(&self, items: &[Item<'_>], options: &PrintOptions) {
        if let Err(err) = self.try_printc_with(items, options) {
            log::debug!("printc on {:?} failed: {err}", self.stream);
        }
    }

    /// Print `items` in order, returning write errors.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the underlying writer.
    pub fn try_printc(&self, items: &[Item<'_>]) -> io::Result<()> {
        self.try_printc_with(items, &PrintOptions::new())
    }

    /// Print `items` with `options`, returning write errors.
    ///
    /// Each color takes effect before any later text is written. On a
    /// console without color the colors are skipped and only text remains.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the underlying writer.
    pub fn try_printc_with(&self, items: &[Item<'_>], options: &PrintOptions) -> io::Result<()> {
        let resolution = self.resolution();
        let renderer = resolution.renderer();
        let capability = resolution.capability();

        let mut writer = lock_recover(&self.writer);
        let out: &mut dyn Write = &mut **writer;

        let mut wrote_text = false;
        for item in items {
            match item {
                Item::Text(text) => {
                    if wrote_text && !options.sep.is_empty() {
                        renderer.write_text(&options.sep, out)?;
                    }
                    renderer.write_text(text, out)?;
                    wrote_text = true;
                }
                Item::Color(color) => {
                    if !matches!(renderer, Renderer::None) {
                        renderer.apply(*color, capability, out)?;
                    }
                }
            }
        }

        if options.reset_after {
            renderer.apply(colors::RESET, capability, out)?;
        }
        if !options.end.is_empty() {
            renderer.write_text(&options.end, out)?;
        }
        out.flush()
    }
}

/// Builder for [`Console`].
#[derive(Default)]
pub struct ConsoleBuilder {
    stream: Option<Stream>,
    writer: Option<Box<dyn Write + Send>>,
    config: Option<Config>,
    choice: Option<ColorChoice>,
    platform: Option<Arc<dyn Platform>>,
}

impl ConsoleBuilder {
    /// Set which stream is probed. Defaults to standard output, or
    /// [`Stream::Writer`] when a custom writer is given.
    #[must_use]
    pub fn stream(mut self, stream: Stream) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Write bytes to `writer` instead of the stream itself.
    #[must_use]
    pub fn writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Use `config` instead of reading the environment.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the color choice of the configuration.
    #[must_use]
    pub fn color_choice(mut self, choice: ColorChoice) -> Self {
        self.choice = Some(choice);
        self
    }

    /// Use `platform` for terminal and console queries.
    #[must_use]
    pub fn platform(mut self, platform: Arc<dyn Platform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Build the console. Detection is deferred until first use.
    #[must_use]
    pub fn build(self) -> Console {
        let stream = self.stream.unwrap_or(if self.writer.is_some() {
            Stream::Writer
        } else {
            Stream::Stdout
        });
        let writer = self.writer.unwrap_or_else(|| match stream {
            Stream::Stderr => Box::new(io::stderr()),
            Stream::Stdout | Stream::Writer => Box::new(io::stdout()),
        });
        let mut config = self.config.unwrap_or_else(Config::from_env);
        if let Some(choice) = self.choice {
            config.choice = choice;
        }

        Console {
            stream,
            writer: Mutex::new(writer),
            config,
            platform: self.platform.unwrap_or_else(|| Arc::new(SystemPlatform)),
            resolution: OnceCell::new(),
        }
    }
}

// ============================================================================
// Process-wide consoles
// ============================================================================

static STDOUT: OnceCell<Console> = OnceCell::new();
static STDERR: OnceCell<Console> = OnceCell::new();
static CHOICE_OVERRIDE: Mutex<Option<ColorChoice>> = Mutex::new(None);

fn global(stream: Stream) -> Console {
    let mut builder = Console::builder().stream(stream);
    if let Some(choice) = *lock_recover(&CHOICE_OVERRIDE) {
        builder = builder.color_choice(choice);
    }
    builder.build()
}

/// The shared standard output console.
pub fn stdout() -> &'static Console {
    STDOUT.get_or_init(|| global(Stream::Stdout))
}

/// The shared standard error console.
pub fn stderr() -> &'static Console {
    STDERR.get_or_init(|| global(Stream::Stderr))
}

/// Override the color choice of the shared consoles.
///
/// Only consoles not yet created pick up the change. Returns `false` when
/// both shared consoles already exist.
pub fn set_color_choice(choice: ColorChoice) -> bool {
    *lock_recover(&CHOICE_OVERRIDE) = Some(choice);
    STDOUT.get().is_none() || STDERR.get().is_none()
}
