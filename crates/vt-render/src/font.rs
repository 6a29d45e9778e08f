//! 5x7 bitmap font for the flattened receipt.
//!
//! Covers printable ASCII plus the accented letters Spanish needs. Accents
//! are drawn as a two-row mark over the base letter: inside the cell for
//! short lowercase letters, above it otherwise. Any whitespace draws as a
//! blank cell. Other characters (emoji, other scripts) have no glyph, and
//! [`ensure_drawable`] reports the first one so the receipt refuses the
//! text instead of dropping it.
//!
//! ```text
//!  row  -2 ..#..   ◄── accent rows (above the cell)
//!       -1 .#...
//!        0 .###.
//!        1 #...#
//!        2 #...#
//!        3 #####       'Á'
//!        4 #...#
//!        5 #...#
//!        6 #...#
//! ```

use crate::error::{RenderError, RenderResult};

/// Glyph cell width in font pixels.
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph cell height in font pixels.
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character, including spacing.
pub const ADVANCE: u32 = 6;

/// A resolved character: the base bitmap and an optional accent mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    /// Rows top to bottom; bit 4 is the leftmost column.
    pub rows: [u8; 7],
    pub accent: Option<Accent>,
}

/// A two-row mark and the row it starts at (negative is above the cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accent {
    pub rows: [u8; 2],
    pub top: i32,
}

impl Glyph {
    /// Iterates lit pixels as `(column, row)`, accent included.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        let base = self
            .rows
            .iter()
            .enumerate()
            .flat_map(|(row, bits)| lit_columns(*bits).map(move |col| (col, row as i32)));

        let accent = self.accent.into_iter().flat_map(|accent| {
            accent
                .rows
                .into_iter()
                .enumerate()
                .flat_map(move |(row, bits)| {
                    lit_columns(bits).map(move |col| (col, accent.top + row as i32))
                })
        });

        base.chain(accent)
    }
}

fn lit_columns(bits: u8) -> impl Iterator<Item = u32> {
    (0..GLYPH_WIDTH).filter(move |col| bits & (0x10 >> col) != 0)
}

const ACUTE: [u8; 2] = [0x02, 0x04];
const GRAVE: [u8; 2] = [0x08, 0x04];
const TILDE: [u8; 2] = [0x0D, 0x16];
const DIAERESIS: [u8; 2] = [0x00, 0x0A];
const CIRCUMFLEX: [u8; 2] = [0x04, 0x0A];

const DOTLESS_I: [u8; 7] = [0x00, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E];

/// Resolves a character, or `None` when the font cannot draw it.
pub fn glyph(c: char) -> Option<Glyph> {
    if let Some(rows) = ascii(c) {
        return Some(Glyph { rows, accent: None });
    }

    match c {
        c if c.is_whitespace() => ascii(' ').map(|rows| Glyph { rows, accent: None }),
        '¿' => ascii('?').map(flipped),
        '¡' => ascii('!').map(flipped),
        _ => {
            let (base, mark) = decompose(c)?;
            accented(base, mark)
        }
    }
}

/// Fails on the first character of `text` the font has no glyph for.
pub fn ensure_drawable(text: &str) -> RenderResult<()> {
    match text.chars().find(|c| glyph(*c).is_none()) {
        Some(character) => Err(RenderError::UnsupportedText {
            target: "receipt font",
            character,
            text: text.to_string(),
        }),
        None => Ok(()),
    }
}

/// Width in font pixels of the drawable characters of `text`.
pub fn text_width(text: &str) -> u32 {
    text.chars().filter(|c| glyph(*c).is_some()).count() as u32 * ADVANCE
}

fn flipped(mut rows: [u8; 7]) -> Glyph {
    rows.reverse();
    Glyph { rows, accent: None }
}

fn accented(base: char, mark: [u8; 2]) -> Option<Glyph> {
    if base == 'i' {
        return Some(Glyph {
            rows: DOTLESS_I,
            accent: Some(Accent { rows: mark, top: 0 }),
        });
    }

    let rows = ascii(base)?;
    // Short lowercase letters leave the top two rows free
    let top = if rows[0] == 0 && rows[1] == 0 { 0 } else { -2 };
    Some(Glyph {
        rows,
        accent: Some(Accent { rows: mark, top }),
    })
}

fn decompose(c: char) -> Option<(char, [u8; 2])> {
    let pair = match c {
        'á' => ('a', ACUTE),
        'é' => ('e', ACUTE),
        'í' => ('i', ACUTE),
        'ó' => ('o', ACUTE),
        'ú' => ('u', ACUTE),
        'Á' => ('A', ACUTE),
        'É' => ('E', ACUTE),
        'Í' => ('I', ACUTE),
        'Ó' => ('O', ACUTE),
        'Ú' => ('U', ACUTE),
        'à' => ('a', GRAVE),
        'è' => ('e', GRAVE),
        'ì' => ('i', GRAVE),
        'ò' => ('o', GRAVE),
        'ù' => ('u', GRAVE),
        'À' => ('A', GRAVE),
        'È' => ('E', GRAVE),
        'Ì' => ('I', GRAVE),
        'Ò' => ('O', GRAVE),
        'Ù' => ('U', GRAVE),
        'â' => ('a', CIRCUMFLEX),
        'ê' => ('e', CIRCUMFLEX),
        'î' => ('i', CIRCUMFLEX),
        'ô' => ('o', CIRCUMFLEX),
        'û' => ('u', CIRCUMFLEX),
        'ñ' => ('n', TILDE),
        'Ñ' => ('N', TILDE),
        'ã' => ('a', TILDE),
        'õ' => ('o', TILDE),
        'ü' => ('u', DIAERESIS),
        'Ü' => ('U', DIAERESIS),
        'ë' => ('e', DIAERESIS),
        'ï' => ('i', DIAERESIS),
        'ö' => ('o', DIAERESIS),
        'ä' => ('a', DIAERESIS),
        _ => return None,
    };
    Some(pair)
}

/// The unaccented letter a Latin character is built on, if any.
pub fn base_letter(c: char) -> Option<char> {
    if c.is_ascii() {
        return Some(c);
    }
    match c {
        '¿' => Some('?'),
        '¡' => Some('!'),
        '\u{a0}' => Some(' '),
        _ => decompose(c).map(|(base, _)| base),
    }
}

fn ascii(c: char) -> Option<[u8; 7]> {
    let code = c as u32;
    if !(32..=126).contains(&code) {
        return None;
    }
    Some(ASCII[(code - 32) as usize])
}

#[rustfmt::skip]
const ASCII: [[u8; 7]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04], // '!'
    [0x0A, 0x0A, 0x0A, 0x00, 0x00, 0x00, 0x00], // '"'
    [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A], // '#'
    [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04], // '$'
    [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03], // '%'
    [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D], // '&'
    [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00], // '\''
    [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02], // '('
    [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08], // ')'
    [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00], // '*'
    [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00], // '+'
    [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08], // ','
    [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00], // '-'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C], // '.'
    [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00], // '/'
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // '0'
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // '1'
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // '2'
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // '3'
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // '4'
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // '5'
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // '6'
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // '7'
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // '8'
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // '9'
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00], // ':'
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x04, 0x08], // ';'
    [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02], // '<'
    [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00], // '='
    [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08], // '>'
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04], // '?'
    [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E], // '@'
    [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11], // 'A'
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // 'B'
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // 'C'
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // 'D'
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // 'E'
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // 'F'
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // 'G'
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // 'H'
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // 'I'
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // 'J'
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // 'K'
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // 'L'
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // 'M'
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // 'N'
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // 'O'
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // 'P'
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // 'Q'
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // 'R'
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // 'S'
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // 'T'
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // 'U'
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // 'V'
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // 'W'
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // 'X'
    [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04], // 'Y'
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // 'Z'
    [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E], // '['
    [0x00, 0x10, 0x08, 0x04, 0x02, 0x01, 0x00], // '\\'
    [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E], // ']'
    [0x04, 0x0A, 0x11, 0x00, 0x00, 0x00, 0x00], // '^'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F], // '_'
    [0x08, 0x04, 0x02, 0x00, 0x00, 0x00, 0x00], // '`'
    [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F], // 'a'
    [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x1E], // 'b'
    [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E], // 'c'
    [0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F], // 'd'
    [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E], // 'e'
    [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08], // 'f'
    [0x00, 0x0F, 0x11, 0x11, 0x0F, 0x01, 0x0E], // 'g'
    [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x11], // 'h'
    [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E], // 'i'
    [0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0C], // 'j'
    [0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12], // 'k'
    [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // 'l'
    [0x00, 0x00, 0x1A, 0x15, 0x15, 0x11, 0x11], // 'm'
    [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11], // 'n'
    [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E], // 'o'
    [0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10], // 'p'
    [0x00, 0x00, 0x0D, 0x13, 0x0F, 0x01, 0x01], // 'q'
    [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10], // 'r'
    [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E], // 's'
    [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06], // 't'
    [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D], // 'u'
    [0x00, 0x00, 0x11, 0x11, 0x11, 0x0A, 0x04], // 'v'
    [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A], // 'w'
    [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11], // 'x'
    [0x00, 0x00, 0x11, 0x11, 0x0F, 0x01, 0x0E], // 'y'
    [0x00, 0x00, 0x1F, 0x02, 0x04, 0x08, 0x1F], // 'z'
    [0x02, 0x04, 0x04, 0x08, 0x04, 0x04, 0x02], // '{'
    [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // '|'
    [0x08, 0x04, 0x04, 0x02, 0x04, 0x04, 0x08], // '}'
    [0x00, 0x00, 0x08, 0x15, 0x02, 0x00, 0x00], // '~'
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_lookup() {
        assert_eq!(glyph('A').unwrap().rows, ASCII[33]);
        assert_eq!(glyph('~').unwrap().rows, ASCII[94]);
        assert!(glyph(' ').unwrap().pixels().next().is_none());
    }

    #[test]
    fn test_accent_placement() {
        // Short lowercase: accent sits inside the cell
        assert_eq!(glyph('é').unwrap().accent.unwrap().top, 0);
        // Capitals: accent sits above the cell
        assert_eq!(glyph('É').unwrap().accent.unwrap().top, -2);
        // í drops its dot
        assert_eq!(glyph('í').unwrap().rows, DOTLESS_I);
        assert!(glyph('ñ').unwrap().pixels().any(|(_, row)| row == 0));
    }

    #[test]
    fn test_unsupported_characters_are_reported() {
        assert!(glyph('💳').is_none());
        assert!(glyph('☎').is_none());
        assert_eq!(text_width("Envío:"), 6 * ADVANCE);

        assert!(ensure_drawable("¿Sí? Ñandú & Cía. #3").is_ok());
        match ensure_drawable("Pago ☎ 💳") {
            Err(RenderError::UnsupportedText { character, .. }) => assert_eq!(character, '☎'),
            other => panic!("expected UnsupportedText, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_draws_blank() {
        for c in ['\t', '\u{a0}', ' '] {
            assert!(glyph(c).unwrap().pixels().next().is_none());
        }
        assert_eq!(text_width("a\tb"), 3 * ADVANCE);
    }

    #[test]
    fn test_base_letter() {
        assert_eq!(base_letter('Ó'), Some('O'));
        assert_eq!(base_letter('x'), Some('x'));
        assert_eq!(base_letter('¿'), Some('?'));
        assert_eq!(base_letter('💳'), None);
    }
}
