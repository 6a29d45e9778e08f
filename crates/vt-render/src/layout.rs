//! Shared layout vocabulary for both back-ends.
//!
//! Both renderers keep the text they drew, tagged with the [`ViewField`] it
//! came from. [`TaggedLayout::fields`] collects it back into a field set so
//! the two artifacts can be compared with each other and with the view.

use vt_core::view::{collect_fields, FieldSet, ViewField};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const PAGE: Rgb = Rgb(250, 252, 255);
    pub const BRAND: Rgb = Rgb(30, 64, 175);
    pub const HEADING: Rgb = Rgb(44, 62, 80);
    pub const BODY: Rgb = Rgb(75, 85, 99);
    pub const MUTED: Rgb = Rgb(150, 150, 150);
    pub const FOOTER: Rgb = Rgb(156, 163, 175);
    pub const RULE: Rgb = Rgb(225, 228, 232);
    pub const ROW_RULE: Rgb = Rgb(240, 241, 243);
    pub const HEADER_FILL: Rgb = Rgb(240, 241, 243);
    pub const FREE: Rgb = Rgb(16, 185, 129);
    pub const DEPOSIT: Rgb = Rgb(91, 108, 255);
    pub const PAY_FILL: Rgb = Rgb(16, 185, 129);
    pub const PAY_TITLE: Rgb = Rgb(6, 95, 70);
    pub const PAY_ACCOUNT: Rgb = Rgb(4, 120, 87);
    pub const BILL_FILL: Rgb = Rgb(251, 191, 36);
    pub const BILL_TITLE: Rgb = Rgb(146, 64, 14);
}

/// Font face used for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// Horizontal anchor of a text run relative to its x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    /// Left edge of a run of `width` anchored at `x`.
    pub fn left_edge(self, x: f32, width: f32) -> f32 {
        match self {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        }
    }
}

/// A laid-out artifact that remembers which view field each text came from.
pub trait TaggedLayout {
    /// Every tagged text fragment, in drawing order.
    fn tagged_text(&self) -> Vec<(ViewField, &str)>;

    /// The field set this artifact actually shows.
    fn fields(&self) -> FieldSet {
        collect_fields(self.tagged_text())
    }
}

/// Greedy word wrap.
///
/// Explicit line breaks are kept. Words are never split, so a word wider
/// than `max_width` gets a line of its own.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if measure(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("uno dos tres cuatro", 8.0, chars);
        assert_eq!(lines, vec!["uno dos", "tres", "cuatro"]);
    }

    #[test]
    fn test_wrap_keeps_breaks_and_long_words() {
        let lines = wrap_text("a\n\nsupercalifragilistico b", 5.0, chars);
        assert_eq!(lines, vec!["a", "supercalifragilistico", "b"]);
    }

    #[test]
    fn test_align_left_edge() {
        assert_eq!(Align::Left.left_edge(10.0, 4.0), 10.0);
        assert_eq!(Align::Center.left_edge(10.0, 4.0), 8.0);
        assert_eq!(Align::Right.left_edge(10.0, 4.0), 6.0);
    }
}
