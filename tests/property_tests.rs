//! Property-based tests for cmdcolor.
//!
//! Uses proptest to check the color model and renderers over generated input.

mod common;

use std::sync::Arc;

use proptest::prelude::*;

use cmdcolor::color::{
    Capability, Color, ColorTriplet, ColorValue, EIGHT_BIT_PALETTE, STANDARD_PALETTE, Target, Tier,
    colors, rgb_to_eight_bit, rgb_to_standard,
};
use cmdcolor::console::Console;
use cmdcolor::render::win32::{apply_to_word, to_legacy_index};
use cmdcolor::terminal::{ColorChoice, Config};
use common::SharedBuffer;
use common::platform::ScriptedPlatform;

// ============================================================================
// Custom Strategies
// ============================================================================

fn target() -> impl Strategy<Value = Target> {
    prop_oneof![Just(Target::Foreground), Just(Target::Background)]
}

fn capability() -> impl Strategy<Value = Capability> {
    prop_oneof![
        Just(Capability::Basic8),
        Just(Capability::Basic16),
        Just(Capability::Extended256),
        Just(Capability::TrueColor),
    ]
}

/// Any paint request, modifier or reset.
fn color() -> impl Strategy<Value = Color> {
    prop_oneof![
        (0u8..8, any::<bool>(), target())
            .prop_map(|(base, bright, t)| Color::indexed16(base, bright, t).unwrap()),
        (any::<u8>(), target()).prop_map(|(n, t)| Color::indexed256(u32::from(n), t).unwrap()),
        (any::<u8>(), any::<u8>(), any::<u8>(), target())
            .prop_map(|(r, g, b, t)| Color::from_triplet(ColorTriplet::new(r, g, b), t)),
        Just(colors::BRIGHT),
        Just(colors::RESET),
        Just(colors::RESET_FG),
        Just(colors::RESET_BG),
        Just(colors::RESET_BRIGHT),
    ]
}

fn nearest_by_scan(triplet: ColorTriplet, candidates: impl Iterator<Item = (usize, ColorTriplet)>) -> usize {
    let mut best = (u32::MAX, 0);
    for (index, candidate) in candidates {
        let distance = triplet.distance(&candidate);
        if distance < best.0 {
            best = (distance, index);
        }
    }
    best.1
}

// ============================================================================
// Color model
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Brightening a plain color equals constructing it bright.
    #[test]
    fn prop_compose_bright(base in 0u8..8, t in target()) {
        let plain = Color::indexed16(base, false, t).unwrap();
        let bright = Color::indexed16(base, true, t).unwrap();
        prop_assert_eq!(plain.compose(true), bright);
        prop_assert_eq!(plain + colors::BRIGHT, bright);
        prop_assert_eq!(bright + colors::BRIGHT, bright);
        prop_assert_eq!(bright + colors::RESET_BRIGHT, plain);
    }

    /// Out-of-range inputs are rejected, never clamped.
    #[test]
    fn prop_out_of_range_rejected(n in 256u32..100_000, t in target()) {
        prop_assert!(Color::indexed256(n, t).is_err());
        prop_assert!(Color::true_color(n, 0, 0, t).is_err());
        prop_assert!(Color::true_color(0, n, 0, t).is_err());
        prop_assert!(Color::true_color(0, 0, n, t).is_err());
    }

    #[test]
    fn prop_base_out_of_range_rejected(base in 8u8..=255, bright in any::<bool>(), t in target()) {
        prop_assert!(Color::indexed16(base, bright, t).is_err());
    }

    /// A full reset on the right always wins.
    #[test]
    fn prop_reset_on_right_wins(c in color()) {
        prop_assert_eq!(c + colors::RESET, colors::RESET);
    }

    /// Degradation never raises precision and is a no-op within capability.
    #[test]
    fn prop_degrade_within_capability(c in color(), cap in capability()) {
        let degraded = c.degrade(cap);
        if let (Some(tier), Some(max)) = (degraded.tier(), cap.max_tier()) {
            prop_assert!(tier <= max);
        }
        prop_assert_eq!(degraded.degrade(cap), degraded);
        prop_assert_eq!(degraded.target(), c.target());
    }

    /// Sixteen-color requests survive a 16-color destination unchanged.
    #[test]
    fn prop_basic16_unchanged(base in 0u8..8, bright in any::<bool>(), t in target()) {
        let c = Color::indexed16(base, bright, t).unwrap();
        prop_assert_eq!(c.degrade(Capability::Basic16), c);
    }

    /// True color maps to the closest cube or grayscale entry, lowest index on ties.
    #[test]
    fn prop_eight_bit_is_nearest(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let triplet = ColorTriplet::new(r, g, b);
        let expected = nearest_by_scan(
            triplet,
            EIGHT_BIT_PALETTE.iter().copied().enumerate().skip(16),
        );
        prop_assert_eq!(usize::from(rgb_to_eight_bit(triplet)), expected);
    }

    /// Anything maps to the closest of the sixteen standard colors.
    #[test]
    fn prop_standard_is_nearest(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let triplet = ColorTriplet::new(r, g, b);
        let expected = nearest_by_scan(triplet, STANDARD_PALETTE.iter().copied().enumerate());
        prop_assert_eq!(usize::from(rgb_to_standard(triplet)), expected);
    }

    /// Palette indices below 16 map directly to the standard colors.
    #[test]
    fn prop_low_indices_map_directly(n in 0u8..16, t in target()) {
        let c = Color::indexed256(u32::from(n), t).unwrap();
        let degraded = c.degrade(Capability::Basic16);
        prop_assert_eq!(
            degraded.value(),
            Some(ColorValue::Indexed16 { base: n & 7, bright: n >= 8 })
        );
        prop_assert_eq!(degraded.tier(), Some(Tier::Indexed16));
    }
}

// ============================================================================
// Legacy console words
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_legacy_index_involution(i in 0u8..8) {
        prop_assert_eq!(to_legacy_index(to_legacy_index(i)), i);
    }

    /// Foreground changes never touch the background nibble or the high bits.
    #[test]
    fn prop_foreground_preserves_other_bits(word in any::<u16>(), c in color(), baseline in any::<u16>()) {
        if c.target() == Some(Target::Foreground) {
            let next = apply_to_word(word, c, baseline);
            prop_assert_eq!(next & 0xFFF0, word & 0xFFF0);
        }
    }

    #[test]
    fn prop_background_preserves_other_bits(word in any::<u16>(), c in color(), baseline in any::<u16>()) {
        if c.target() == Some(Target::Background) {
            let next = apply_to_word(word, c, baseline);
            prop_assert_eq!(next & 0xFF0F, word & 0xFF0F);
        }
    }

    /// A full reset restores the baseline colors and keeps the high bits.
    #[test]
    fn prop_reset_restores_baseline(word in any::<u16>(), baseline in any::<u16>()) {
        let next = apply_to_word(word, colors::RESET, baseline);
        prop_assert_eq!(next & 0x00FF, baseline & 0x00FF);
        prop_assert_eq!(next & 0xFF00, word & 0xFF00);
    }
}

// ============================================================================
// Printing
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Without color the output is exactly the text items in order.
    #[test]
    fn prop_no_color_output_is_text(
        parts in prop::collection::vec(("[a-z ]{0,8}", color()), 0..12)
    ) {
        let buffer = SharedBuffer::new();
        let console = Console::builder()
            .writer(buffer.clone())
            .config(Config::default().with_choice(ColorChoice::Off))
            .platform(Arc::new(ScriptedPlatform::terminal()))
            .build();

        let mut items = Vec::new();
        let mut expected = String::new();
        for (text, c) in &parts {
            items.push(cmdcolor::Item::from(*c));
            items.push(cmdcolor::Item::from(text.as_str()));
            expected.push_str(text);
        }
        console.printc(&items);
        prop_assert_eq!(buffer.contents(), expected);
    }
}
