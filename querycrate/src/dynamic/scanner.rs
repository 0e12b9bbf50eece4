use std::ops::Range;

use crate::template::WhereToken;

const MARKERS: [(&str, WhereToken); 2] = [
    ("where", WhereToken::Where),
    ("andWhere", WhereToken::AndWhere),
];

/// A `where {{ ... }}` or `andWhere {{ ... }}` block found in SQL text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block<'a> {
    pub keyword: WhereToken,
    /// From the first byte of the keyword through the closing `}}`
    pub span: Range<usize>,
    /// Term texts with their braces and surrounding whitespace removed
    pub terms: Vec<&'a str>,
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    i
}

/// `{ {` starting at `i` (whitespace allowed before and between); returns the offset after it
fn open_marker_end(bytes: &[u8], i: usize) -> Option<usize> {
    let i = skip_whitespace(bytes, i);
    (bytes.get(i) == Some(&b'{')).then_some(())?;
    let i = skip_whitespace(bytes, i + 1);
    (bytes.get(i) == Some(&b'{')).then_some(i + 1)
}

/// Walk a block body starting right after the opening `{{`, collecting terms until the block
/// closes. Returns the terms and the offset just past the closing braces.
///
/// The opening `{{` also opens the first term, so `{{ a }{ b }}` holds two terms. A term may carry
/// its own braces on its own line (`{{ { a } { b } }}`): a `{` met while the current term is still
/// blank opens that term explicitly. A `}` closes the open term; a `}` met with no term open
/// closes the block, together with a second `}` when one follows.
fn read_terms(sql: &str, body_start: usize) -> Option<(Vec<&str>, usize)> {
    let bytes = sql.as_bytes();
    let mut terms = Vec::new();
    // start of the open term's text, and whether it was opened by its own brace
    let mut open: Option<(usize, bool)> = Some((body_start, false));
    let mut i = body_start;

    while i < bytes.len() {
        match (bytes[i], open) {
            (b'{', Some((start, _))) if sql[start..i].trim().is_empty() => {
                open = Some((i + 1, true));
            }
            (b'{', None) => open = Some((i + 1, true)),
            (b'}', Some((start, explicit))) => {
                let term = sql[start..i].trim();
                if explicit || !term.is_empty() {
                    terms.push(term);
                }
                open = None;
            }
            (b'}', None) => {
                let j = skip_whitespace(bytes, i + 1);
                let end = if bytes.get(j) == Some(&b'}') { j + 1 } else { i + 1 };
                return Some((terms, end));
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Find the first complete dynamic block. Every `where` candidate is tried before any `andWhere`
/// candidate. Keywords are case-sensitive and must start at a word boundary.
pub(crate) fn scan(sql: &str) -> Option<Block<'_>> {
    let bytes = sql.as_bytes();

    for (marker, keyword) in MARKERS {
        for (start, _) in sql.match_indices(marker) {
            if start > 0 && is_word_byte(bytes[start - 1]) {
                continue;
            }
            let Some(body_start) = open_marker_end(bytes, start + marker.len()) else {
                continue;
            };
            let Some((terms, end)) = read_terms(sql, body_start) else {
                tracing::warn!(
                    offset = start,
                    keyword = marker,
                    "Dynamic block has no closing braces; query left unchanged"
                );
                continue;
            };

            return Some(Block {
                keyword,
                span: start..end,
                terms,
            });
        }
    }

    None
}
