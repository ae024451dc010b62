//! # cmdcolor
//!
//! Colored console output that works the same everywhere: on terminals that
//! speak ANSI escape sequences, on terminals described by the terminfo
//! database, and on the legacy Windows console that only understands text
//! attribute calls.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cmdcolor::prelude::*;
//!
//! printc!("status: ", GREEN + BRIGHT, "ok", RESET, "\n");
//! printcln!(RED, "failed:", RESET, "3 tests");
//! ```
//!
//! ## Core Concepts
//!
//! - **Color**: a paint request (16-color, 256-color or true color), the
//!   bright modifier, or a reset. Combine with `+`.
//! - **Capability**: how many colors a destination shows. Requests above it
//!   are degraded to the nearest color it can show.
//! - **Console**: one destination. Detects its [`OutputMode`] and
//!   [`Capability`] once, on first use.
//! - **Platform**: the host calls detection and rendering rely on.
//!
//! ## Configuration
//!
//! Shared consoles read `CMDCOLOR`, `CMDCOLOR_ANSI`, `CMDCOLOR_CURSES`,
//! `NO_COLOR`, `FORCE_COLOR`, `TERM` and `COLORTERM`. See
//! [`terminal::Config::from_env`].
//!
//! ## Logging
//!
//! Detection results and recovered failures are reported through the `log`
//! facade. Nothing is printed by the library itself.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod console;
pub mod platform;
pub mod render;
pub mod sync;
pub mod terminal;
pub mod terminfo;

/// Re-exports for convenient usage
pub mod prelude {
    pub use crate::color::colors::*;
    pub use crate::color::{Capability, Color, ColorError, ColorTriplet, Target};
    pub use crate::console::{Console, Item, PrintOptions};
    pub use crate::platform::Stream;
    pub use crate::terminal::{ColorChoice, Config, OutputMode};
    pub use crate::{eprintc, printc, printcln};
}

// Re-export key types at crate root
pub use color::{Capability, Color, ColorError, ColorTriplet, Target, colors};
pub use console::{Console, ConsoleBuilder, Item, PrintOptions, set_color_choice};
pub use platform::{Platform, Stream};
pub use terminal::{ColorChoice, Config, OutputMode};

/// Print `items` to standard output.
///
/// Colors are applied in order; text is written as is. Nothing is added
/// around the items.
pub fn printc(items: &[Item<'_>]) {
    console::stdout().printc(items);
}

/// Print `items` to standard error.
pub fn eprintc(items: &[Item<'_>]) {
    console::stderr().printc(items);
}

/// Print text and colors to standard output.
///
/// Every argument is converted with [`Item::from`].
#[macro_export]
macro_rules! printc {
    ($($item:expr),* $(,)?) => {
        $crate::printc(&[$($crate::Item::from($item)),*])
    };
}

/// Print text and colors to standard error.
#[macro_export]
macro_rules! eprintc {
    ($($item:expr),* $(,)?) => {
        $crate::eprintc(&[$($crate::Item::from($item)),*])
    };
}

/// Print text and colors to standard output as a line.
///
/// Text items are separated by a space, colors are reset at the end and a
/// newline follows.
#[macro_export]
macro_rules! printcln {
    ($($item:expr),* $(,)?) => {
        $crate::console::stdout()
            .printc_with(&[$($crate::Item::from($item)),*], &$crate::PrintOptions::line())
    };
}
