//! Ditch-block removal and the offset map back to the original source.

use std::borrow::Cow;

/// Maps offsets in the ditch-stripped text back to the source as written.
#[derive(Debug, Clone, Default)]
pub(crate) struct SourceMap {
    /// `(offset in stripped text, removed length)` per removed block, ascending.
    removed: Vec<(usize, usize)>,
}

impl SourceMap {
    /// Offset in the original source of a stripped-text offset.
    ///
    /// An offset that sits exactly where a block was cut out maps to the first
    /// byte after the block.
    pub(crate) fn original_offset(&self, offset: usize) -> usize {
        self.removed
            .iter()
            .take_while(|(at, _)| *at <= offset)
            .fold(offset, |acc, (_, len)| acc + len)
    }
}

/// 1-based line and character column of a byte offset in `source`.
pub(crate) fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = floor_char_boundary(source, offset.min(source.len()));
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |nl| nl + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

fn floor_char_boundary(source: &str, mut offset: usize) -> usize {
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Removes every region between a pair of ditch tokens, tokens included.
///
/// Returns the stripped text and its offset map, or the original offset of
/// the ditch token left without a partner.
pub(crate) fn strip<'s>(source: &'s str, ditch: &str) -> Result<(Cow<'s, str>, SourceMap), usize> {
    let tokens: Vec<usize> = source.match_indices(ditch).map(|(at, _)| at).collect();
    if tokens.is_empty() {
        return Ok((Cow::Borrowed(source), SourceMap::default()));
    }
    if tokens.len() % 2 == 1 {
        return Err(tokens[tokens.len() - 1]);
    }

    let mut out = String::with_capacity(source.len());
    let mut map = SourceMap::default();
    let mut cursor = 0;
    for pair in tokens.chunks(2) {
        let (open, close) = (pair[0], pair[1] + ditch.len());
        out.push_str(&source[cursor..open]);
        map.removed.push((out.len(), close - open));
        cursor = close;
    }
    out.push_str(&source[cursor..]);
    Ok((Cow::Owned(out), map))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DITCH: &str = "<!--%%-->";

    #[test]
    fn no_ditch_blocks_borrows() {
        let (text, _) = strip("plain ~%x%", DITCH).unwrap();
        assert!(matches!(text, Cow::Borrowed("plain ~%x%")));
    }

    #[test]
    fn blocks_are_removed() {
        let source = "a<!--%%-->gone<!--%%-->b<!--%%-->x<!--%%-->c";
        let (text, _) = strip(source, DITCH).unwrap();
        assert_eq!(text, "abc");
    }

    #[test]
    fn unpaired_token_reports_last_offset() {
        let source = "a<!--%%-->b<!--%%-->c<!--%%-->d";
        assert_eq!(strip(source, DITCH).unwrap_err(), 21);
    }

    #[test]
    fn offsets_map_past_removed_blocks() {
        let source = "ab<!--%%-->xyz<!--%%-->cd";
        let (text, map) = strip(source, DITCH).unwrap();
        assert_eq!(text, "abcd");
        assert_eq!(map.original_offset(0), 0);
        assert_eq!(map.original_offset(1), 1);
        assert_eq!(map.original_offset(2), source.find("cd").unwrap());
        assert_eq!(map.original_offset(3), source.find('d').unwrap());
    }

    #[test]
    fn line_and_column_count_characters() {
        let source = "first\nsé~%x\nthird";
        assert_eq!(line_column(source, 0), (1, 1));
        assert_eq!(line_column(source, source.find('~').unwrap()), (2, 3));
        assert_eq!(line_column(source, source.find("third").unwrap()), (3, 1));
    }
}
