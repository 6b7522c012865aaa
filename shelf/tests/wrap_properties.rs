//! Property-based tests for description wrapping.
//!
//! Tests validate wrap invariants:
//! 1. Never more lines than the budget
//! 2. Wrapped lines are an in-order prefix of the text (whitespace aside)
//! 3. Every line fits the width when single glyphs do
//! 4. Arbitrary Unicode input never panics or splits a char

use proptest::prelude::*;
use shelf::wrap::{wrap_text, WrapOptions, LINK_PADDING};

// ===== Helper Functions =====

/// Monospace measurement: every char is 10px wide.
fn mono(s: &str) -> f32 {
    s.chars().count() as f32 * 10.0
}

fn non_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn options(width: f32, max_lines: usize, link: bool) -> WrapOptions<'static> {
    WrapOptions {
        width,
        max_lines,
        link_label: link.then_some("Read More"),
    }
}

// ===== Property 1: Line Budget =====

proptest! {
    #[test]
    fn never_exceeds_max_lines(
        text in "[a-z ]{0,400}",
        width in 1.0f32..600.0,
        max_lines in 0usize..6,
        link in any::<bool>(),
    ) {
        let wrapped = wrap_text(&text, &options(width, max_lines, link), mono);
        prop_assert!(wrapped.len() <= max_lines);
    }
}

// ===== Property 2: Prefix =====

proptest! {
    #[test]
    fn lines_are_a_prefix_of_the_text(
        text in "[a-zA-Z \n]{0,400}",
        width in 10.0f32..600.0,
        max_lines in 1usize..6,
        link in any::<bool>(),
    ) {
        let wrapped = wrap_text(&text, &options(width, max_lines, link), mono);
        let shown: String = wrapped.lines().iter().map(|l| non_whitespace(&l.text)).collect();
        let source = non_whitespace(&text);
        prop_assert!(
            source.starts_with(&shown),
            "shown {:?} is not a prefix of {:?}", shown, source
        );
    }
}

proptest! {
    #[test]
    fn unlimited_budget_shows_everything(
        text in "[a-z ]{0,300}",
        width in 10.0f32..600.0,
    ) {
        let wrapped = wrap_text(&text, &options(width, usize::MAX, true), mono);
        let shown: String = wrapped.lines().iter().map(|l| non_whitespace(&l.text)).collect();
        prop_assert_eq!(shown, non_whitespace(&text));
        prop_assert!(wrapped.link_line().is_none());
    }
}

// ===== Property 3: Fit =====

proptest! {
    #[test]
    fn every_line_fits(
        text in "[a-z ]{1,400}",
        width in 10.0f32..600.0,
        max_lines in 1usize..6,
        link in any::<bool>(),
    ) {
        let wrapped = wrap_text(&text, &options(width, max_lines, link), mono);
        for line in wrapped.lines() {
            if line.is_link_suffix {
                prop_assert!(
                    line.text.is_empty() || mono(&line.text) + LINK_PADDING + mono("Read More") <= width,
                    "link line {:?} overflows {}", line.text, width
                );
            } else {
                prop_assert!(!line.text.is_empty());
                prop_assert!(mono(&line.text) <= width, "{:?} wider than {}", line.text, width);
            }
        }
    }
}

// ===== Property 4: Arbitrary Input =====

proptest! {
    #[test]
    fn arbitrary_unicode_is_safe(
        text in ".{0,200}",
        width in -10.0f32..400.0,
        max_lines in 0usize..4,
        link in any::<bool>(),
    ) {
        let wrapped = wrap_text(&text, &options(width, max_lines, link), mono);
        prop_assert!(wrapped.len() <= max_lines);
        if width <= 0.0 {
            prop_assert!(wrapped.is_empty());
        }
    }
}
