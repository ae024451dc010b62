//! `cmdcolor` demo: banner, detection report and color charts.
//!
//! Uses a small hand-rolled argument parser; there are only flags.

use cmdcolor::color::color_name;
use cmdcolor::console::{self, Console, Item, PrintOptions};
use cmdcolor::prelude::*;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Options {
    force: bool,
    ansi: bool,
    info: bool,
    chart: bool,
    chart256: bool,
    chart256bg: bool,
    test: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut iter = args.into_iter();
    // Drop binary name if present.
    let _ = iter.next();

    let mut opts = Options::default();
    for arg in iter {
        match arg.as_str() {
            "-h" | "--help" | "--info" => opts.info = true,
            "--force" => opts.force = true,
            "--ansi" => opts.ansi = true,
            "--chart" => opts.chart = true,
            "--chart256" => opts.chart256 = true,
            "--chart256bg" => opts.chart256bg = true,
            "--test" => opts.test = true,
            other => return Err(format!("Unknown option `{other}`.\n\n{HELP_TEXT}")),
        }
    }
    Ok(opts)
}

fn main() {
    let opts = match parse_args(std::env::args()) {
        Ok(opts) => opts,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };

    if opts.ansi {
        console::set_color_choice(ColorChoice::Ansi);
    } else if opts.force {
        console::set_color_choice(ColorChoice::On);
    }

    let out = console::stdout();
    banner(out, &opts);

    if !out.will_print_color() {
        println!("Current stdout will not print colors");
    }

    if opts.info {
        println!();
        line(out, &["You can display a color chart by using the".into(), BRIGHT.into(), "--chart".into(), RESET.into(), "option.".into()]);
        line(out, &[
            "In 256 color mode use".into(),
            BRIGHT.into(),
            "--chart256".into(),
            RESET.into(),
            "or".into(),
            BRIGHT.into(),
            "--chart256bg".into(),
            RESET.into(),
        ]);
        line(out, &["Use".into(), BRIGHT.into(), "--force".into(), RESET.into(), "to always try to print color.".into()]);
        line(out, &[BRIGHT.into(), "--info".into(), RESET.into(), "and".into(), BRIGHT.into(), "--test".into(), RESET.into(), "print extra information.".into()]);
    }

    if opts.test {
        test_patterns(out);
    }
    if opts.chart {
        chart16(out);
    }
    if opts.chart256 || opts.chart256bg {
        chart256(out, if opts.chart256bg { Target::Background } else { Target::Foreground });
    }
}

const HELP_TEXT: &str = r"cmdcolor - portable console colors

USAGE:
    cmdcolor [OPTIONS]

OPTIONS:
    --force         Print color even when stdout is not a terminal
    --ansi          Always print ANSI escape sequences
    --info          Show how stdout and stderr are colored
    --chart         16-color chart
    --chart256      256-color chart (foreground)
    --chart256bg    256-color chart (background)
    --test          Gray ramps, color cube and true-color ramps
    -h, --help      Same as --info
";

// ============================================================================
// Output helpers
// ============================================================================

fn line(out: &Console, items: &[Item<'_>]) {
    out.printc_with(items, &PrintOptions::line());
}

fn inline(out: &Console, items: &[Item<'_>]) {
    out.printc_with(items, &PrintOptions::new().with_reset_after(true));
}

fn palette(index: u8, target: Target) -> Color {
    Color::indexed256(u32::from(index), target).unwrap_or(RESET)
}

fn rgb(red: u32, green: u32, blue: u32, target: Target) -> Color {
    Color::true_color(red, green, blue, target).unwrap_or(RESET)
}

// ============================================================================
// Banner
// ============================================================================

/// Columns between the two vertical borders.
const INNER: usize = 74;
const BORDER: i32 = 74;

fn ramp(x: i32) -> u8 {
    let level = match x.rem_euclid(30) {
        x @ 5..10 => 10 - x,
        10..20 => 0,
        x @ 20..25 => x - 20,
        _ => 5,
    };
    u8::try_from(level).unwrap_or(5)
}

fn rainbow(out: &Console, i: i32) -> Color {
    if out.num_colors() < 256 {
        return RESET;
    }
    Color::cube(ramp(i / 2), ramp(i / 2 - 10), ramp(i / 2 - 20), Target::Foreground).unwrap_or(RESET)
}

fn framed(out: &Console, row: i32, content: &str) {
    inline(out, &[rainbow(out, row).into(), "║".into(), RESET.into(), format!("  {content:<width$}", width = INNER - 2).into()]);
    line(out, &[rainbow(out, 78 + row).into(), "║".into()]);
}

fn stream_status(console: &Console, name: &str) -> String {
    if console.will_print_color() {
        format!(" - {name}: {} colors ({})", console.num_colors(), console.color_mode())
    } else {
        format!(" - {name}: no colors")
    }
}

fn banner(out: &Console, opts: &Options) {
    let mut row = 0;
    inline(out, &[rainbow(out, 0).into(), "╔".into()]);
    for i in 1..=BORDER {
        inline(out, &[rainbow(out, i).into(), "═".into()]);
    }
    line(out, &[rainbow(out, 78).into(), "╗".into()]);

    row += 2;
    inline(out, &[rainbow(out, row).into(), "║".into(), RESET.into(), "  This is the ".into()]);
    let name_colors = [4u8, 12, 12, 14, 14, 10, 10, 11, 9, 1];
    for (ch, index) in "«cmdcolor»".chars().zip(name_colors) {
        inline(out, &[palette(index, Target::Foreground).into(), ch.into()]);
    }
    let rest = " crate. Add it to your favorite tool to";
    let used = "  This is the ".len() + "«cmdcolor»".chars().count() + rest.len();
    inline(out, &[rest.into(), " ".repeat(INNER.saturating_sub(used)).into()]);
    line(out, &[rainbow(out, 78 + row).into(), "║".into()]);
    row += 2;
    framed(out, row, "print colors.");

    if opts.info {
        row += 2;
        framed(out, row, "");
        row += 2;
        framed(out, row, "Status:");
        row += 2;
        framed(out, row, &stream_status(out, "stdout"));
        row += 2;
        framed(out, row, &stream_status(console::stderr(), "stderr"));
    }

    row += 2;
    inline(out, &[rainbow(out, row).into(), "╚".into()]);
    for i in 1..=BORDER {
        inline(out, &[rainbow(out, i + row).into(), "═".into()]);
    }
    line(out, &[rainbow(out, 78 + row).into(), "╝".into()]);
}

// ============================================================================
// Charts
// ============================================================================

fn chart16(out: &Console) {
    println!();
    out.printc(&["standard text, ".into(), BRIGHT.into(), "bold text".into(), RESET_BRIGHT.into(), ".\n".into()]);
    println!();
    println!(" {:<26}  {:<26}", "foreground colors", "background colors");
    for base in 0..8u8 {
        let name = color_name(base).unwrap_or("?");
        let fg = Color::indexed16(base, false, Target::Foreground).unwrap_or(RESET);
        let bg = Color::indexed16(base, false, Target::Background).unwrap_or(RESET);
        out.printc_with(
            &[
                format!("  {base:2}:").into(),
                fg.into(),
                format!("{name:<7}").into(),
                RESET_FG.into(),
                format!("  {:2}:", base + 8).into(),
                (fg + BRIGHT).into(),
                format!("{name:<7}").into(),
                RESET_FG.into(),
                format!("  {base:2}:").into(),
                bg.into(),
                format!("{name:<7}").into(),
                RESET_BG.into(),
                format!("  {:2}:", base + 8).into(),
                (bg + BRIGHT).into(),
                format!("{name:<7}").into(),
                RESET_BG.into(),
            ],
            &PrintOptions::line(),
        );
    }
}

fn chart256(out: &Console, target: Target) {
    let cell = |index: u8| inline(out, &[palette(index, target).into(), format!("{index:03}").into(), RESET.into(), " ".into()]);

    println!();
    for i in 0..16 {
        cell(i);
    }
    println!();
    println!();

    for a in 0..6u8 {
        for b in 0..6u8 {
            for c in 0..6u8 {
                cell(16 + c + 6 * (b + 6 * a));
            }
            println!();
        }
        println!();
    }

    for i in 232..244 {
        cell(i);
    }
    println!();
    for i in 244..=255 {
        cell(i);
    }
    println!();
}

fn test_patterns(out: &Console) {
    println!();
    inline(out, &["Gray fg ramp: ".into()]);
    for i in 232..=255 {
        inline(out, &[palette(i, Target::Foreground).into(), "██".into()]);
    }
    println!();
    inline(out, &["Gray bg ramp: ".into()]);
    for i in 232..=255 {
        inline(out, &[palette(i, Target::Background).into(), "  ".into()]);
    }
    println!();
    println!();

    for j in (0..6u8).step_by(2) {
        inline(out, &[(if j == 2 { "256-color cube: " } else { "                " }).into()]);
        for i in (16..232u8).step_by(6) {
            inline(out, &[palette(i + j, Target::Background).into(), palette(i + j + 1, Target::Foreground).into(), "▄".into()]);
        }
        println!();
    }
    println!();

    let ramps: [((u32, u32, u32), (u32, u32, u32)); 4] = [
        ((255, 0, 60), (255, 128, 0)),
        ((255, 220, 0), (0, 255, 100)),
        ((0, 150, 255), (80, 0, 255)),
        ((180, 0, 255), (128, 128, 128)),
    ];
    for (row, (bg, fg)) in ramps.into_iter().enumerate() {
        inline(out, &[(if row == 1 { "True-color ramps: " } else { "                  " }).into()]);
        for i in (0..256).step_by(9) {
            inline(out, &[
                rgb(i * fg.0 / 255, i * fg.1 / 255, i * fg.2 / 255, Target::Foreground).into(),
                rgb(i * bg.0 / 255, i * bg.1 / 255, i * bg.2 / 255, Target::Background).into(),
                "▄".into(),
            ]);
        }
        for i in (0..256).step_by(9) {
            let t = 255 - i;
            inline(out, &[
                rgb(i + t * fg.0 / 255, i + t * fg.1 / 255, i + t * fg.2 / 255, Target::Foreground).into(),
                rgb(i + t * bg.0 / 255, i + t * bg.1 / 255, i + t * bg.2 / 255, Target::Background).into(),
                "▄".into(),
            ]);
        }
        println!();
    }
    println!();

    let dark_green = Color::cube(0, 4, 1, Target::Foreground).unwrap_or(RESET);
    line(out, &["Color 0 to 15 behavior:".into()]);
    line(out, &["  - Black:".into(), BLACK.into(), BRIGHT.into(), "bold text".into()]);
    line(out, &["  - Green:".into(), GREEN.into(), "regular text".into()]);
    line(out, &["  - Green:".into(), GREEN.into(), BRIGHT.into(), "bold text".into()]);
    line(out, &["  - Green:".into(), (GREEN + BRIGHT).into(), "bright text".into()]);
    line(out, &["  - Green:".into(), (GREEN + BRIGHT + BRIGHT).into(), "bright bold text".into()]);
    line(out, &["  - Bright vs. bold:".into(), (YELLOW + BRIGHT).into(), "Bright yellow,".into(), RESET_FG.into(), "default color".into()]);
    println!();
    if out.num_colors() > 16 {
        line(out, &["Color 16 to 255 behavior:".into()]);
        line(out, &["  - Black:".into(), palette(16, Target::Foreground).into(), BRIGHT.into(), "bold text".into()]);
        line(out, &["  - Green:".into(), dark_green.into(), "regular text".into()]);
        line(out, &["  - Green:".into(), (dark_green + BRIGHT).into(), "bold text".into()]);
    }
}
