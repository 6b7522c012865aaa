//! Greedy line wrapping with an inline trailing link.
//!
//! The wrapper never measures character by character. For each line it
//! measures the whole remainder once, estimates how many characters fit from
//! the average advance, then walks back to the nearest word break. A short
//! correction pass fixes the few characters the estimate can overshoot on
//! proportional fonts.
//!
//! When the description does not fit in the line budget and a link label is
//! requested, the label is spliced onto the last line, dropping trailing
//! words until it fits. The text after the budget is not shown; the full
//! description lives behind the link.

/// Horizontal slack required between the last word and the link label.
pub const LINK_PADDING: f32 = 10.0;

/// Wrapping parameters.
#[derive(Debug, Clone, Copy)]
pub struct WrapOptions<'a> {
    /// Available width in pixels.
    pub width: f32,
    /// Maximum number of lines to produce.
    pub max_lines: usize,
    /// Label to append to the last line when text is cut off.
    pub link_label: Option<&'a str>,
}

/// One wrapped line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpan {
    /// The slice of the description shown on this line. Never includes the
    /// link label.
    pub text: String,
    /// The link label is drawn after `text` on this line.
    pub is_link_suffix: bool,
}

/// Ordered lines produced by [`wrap_text`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrappedText {
    lines: Vec<LineSpan>,
}

impl WrappedText {
    pub fn lines(&self) -> &[LineSpan] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index and span of the line carrying the link label, if any.
    pub fn link_line(&self) -> Option<(usize, &LineSpan)> {
        self.lines.iter().enumerate().find(|(_, l)| l.is_link_suffix)
    }
}

#[inline]
fn is_break(c: char) -> bool {
    c.is_whitespace()
}

/// Byte offset of the `n`th char of `s`, or `s.len()` past the end.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

/// Byte offset just past the char starting at `at`.
fn after_char(s: &str, at: usize) -> usize {
    at + s[at..].chars().next().map_or(0, char::len_utf8)
}

/// Last break char in `s` strictly after the first position.
///
/// A break at index 0 would produce an empty line, so it does not count.
fn last_break(s: &str) -> Option<usize> {
    s.rfind(is_break).filter(|&i| i > 0)
}

/// Wrap `text` into at most `options.max_lines` lines no wider than
/// `options.width` as reported by `measure`.
///
/// Empty text, a non-positive width, or a zero line budget return an empty
/// result without calling `measure`.
pub fn wrap_text<M>(text: &str, options: &WrapOptions<'_>, mut measure: M) -> WrappedText
where
    M: FnMut(&str) -> f32,
{
    let width = options.width;
    // `!(width > 0.0)` also rejects NaN.
    if text.is_empty() || !(width > 0.0) || options.max_lines == 0 {
        return WrappedText::default();
    }

    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() && lines.len() < options.max_lines {
        let measured = measure(rest);
        if !(measured > 0.0) {
            // Nothing measurable left: stop rather than spin.
            break;
        }

        let (line, next) = if measured <= width {
            (rest, "")
        } else {
            let chars = rest.chars().count();
            let estimate = ((width * chars as f32 / measured).floor() as usize).clamp(1, chars);
            split_at_estimate(rest, estimate, width, &mut measure)
        };

        lines.push(LineSpan {
            text: line.to_owned(),
            is_link_suffix: false,
        });
        rest = next;
    }

    if let Some(label) = options.link_label {
        if lines.len() == options.max_lines && !rest.is_empty() {
            if let Some(last) = lines.last_mut() {
                fit_link_label(last, label, width, &mut measure);
            }
        }
    }

    WrappedText { lines }
}

/// Cut one line out of `rest` around the estimated character count.
///
/// Returns `(line, remainder)`; the break char itself belongs to neither.
fn split_at_estimate<'t, M>(
    rest: &'t str,
    estimate: usize,
    width: f32,
    measure: &mut M,
) -> (&'t str, &'t str)
where
    M: FnMut(&str) -> f32,
{
    let cut = byte_offset(rest, estimate);
    // The char at the estimate is included in the search: a space right where
    // the line overflows is the natural break.
    let window = &rest[..after_char(rest, cut)];

    if let Some(mut brk) = last_break(window) {
        // Estimate overshoot correction: step back word by word.
        loop {
            if measure(&rest[..brk]) <= width {
                return (&rest[..brk], &rest[after_char(rest, brk)..]);
            }
            match last_break(&rest[..brk]) {
                Some(prev) => brk = prev,
                None => break,
            }
        }
        // The first word alone overflows.
        return hard_cut(rest, brk, width, measure);
    }

    hard_cut(rest, cut, width, measure)
}

/// Cut mid-word at the longest prefix of `rest[..end]` that fits, but never
/// produce an empty line.
fn hard_cut<'t, M>(rest: &'t str, mut end: usize, width: f32, measure: &mut M) -> (&'t str, &'t str)
where
    M: FnMut(&str) -> f32,
{
    while measure(&rest[..end]) > width {
        match rest[..end].char_indices().next_back() {
            Some((i, _)) if i > 0 => end = i,
            _ => break,
        }
    }
    (&rest[..end], &rest[end..])
}

/// Trim trailing words from `line` until `label` fits after it, then mark it.
fn fit_link_label<M>(line: &mut LineSpan, label: &str, width: f32, measure: &mut M)
where
    M: FnMut(&str) -> f32,
{
    let label_width = measure(label);
    let mut text = line.text.as_str();

    while !text.is_empty() && measure(text) + LINK_PADDING + label_width > width {
        text = match text.rfind(is_break) {
            Some(i) => &text[..i],
            None => "",
        };
    }

    line.text.truncate(text.len());
    line.is_link_suffix = true;
}
