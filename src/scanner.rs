//! Byte-oriented cursor over a single source line (spec.md §4.1).
//!
//! A `Scanner` never looks across line boundaries: the parser constructs a
//! fresh one over each line's bytes and discards it once the line has been
//! dispatched, which is what lets verbatim content be copied out of the
//! buffer eagerly (spec.md §9 "verbatim-slice deferred copy") instead of the
//! scanner having to stay alive, and pinned to one buffer, for the whole
//! document.

use regex::bytes::Regex;

/// The result of a successful `scan`/`scan_until`: the byte range matched,
/// relative to the scanner's own buffer, plus its captured groups.
#[derive(Debug, Clone)]
pub struct ScanMatch {
    pub start: usize,
    pub end: usize,
    groups: Vec<Option<(usize, usize)>>,
}

impl ScanMatch {
    /// Byte range of capture group `n` (0 is the whole match), if it participated.
    pub fn group(&self, n: usize) -> Option<(usize, usize)> {
        self.groups.get(n).copied().flatten()
    }
}

pub struct Scanner<'a> {
    buf: &'a [u8],
    pos: usize,
    last_match_start: Option<usize>,
}

impl<'a> Scanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Scanner {
            buf,
            pos: 0,
            last_match_start: None,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Byte at the cursor, without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.buf.get(self.pos + offset).copied()
    }

    /// Byte immediately before the cursor (used by the "opening/closing
    /// eligible" whitespace checks in spec.md §4.4.1).
    pub fn peek_prev(&self) -> Option<u8> {
        if self.pos == 0 {
            None
        } else {
            self.buf.get(self.pos - 1).copied()
        }
    }

    /// Advance the cursor by up to `n` bytes, clamped to the buffer end;
    /// returns how far it actually moved.
    pub fn advance(&mut self, n: usize) -> usize {
        let n = n.min(self.buf.len() - self.pos);
        self.pos += n;
        n
    }

    /// Jump the cursor to an arbitrary byte offset, clamped to the buffer.
    /// Used to roll back a tentative lookahead that didn't pan out (e.g. an
    /// unterminated verbatim run) without needing a matching `scan` to undo.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.buf[start..end]
    }

    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.buf[start..self.pos]
    }

    /// True iff `pattern` matches starting exactly at the cursor. Does not move.
    pub fn matches(&self, pattern: &Regex) -> bool {
        matches!(pattern.find(self.remaining()), Some(m) if m.start() == 0)
    }

    /// If `pattern` matches at the cursor, advance past the match and return it.
    pub fn scan(&mut self, pattern: &Regex) -> Option<ScanMatch> {
        let caps = pattern.captures(self.remaining())?;
        let m = caps.get(0)?;
        if m.start() != 0 {
            return None;
        }
        let start = self.pos;
        let end = self.pos + m.end();
        let groups = (0..caps.len())
            .map(|i| caps.get(i).map(|g| (start + g.start(), start + g.end())))
            .collect();
        self.last_match_start = Some(start);
        self.pos = end;
        Some(ScanMatch { start, end, groups })
    }

    /// Search forward (not anchored at the cursor) for the next match of
    /// `pattern`. Advances through the match when `inclusive`, otherwise
    /// stops just before it. Returns `None`, without moving, if not found.
    pub fn scan_until(&mut self, pattern: &Regex, inclusive: bool) -> Option<ScanMatch> {
        let caps = pattern.captures(self.remaining())?;
        let m = caps.get(0)?;
        let start = self.pos + m.start();
        let end = self.pos + m.end();
        let groups = (0..caps.len())
            .map(|i| caps.get(i).map(|g| (self.pos + g.start(), self.pos + g.end())))
            .collect();
        self.last_match_start = Some(start);
        self.pos = if inclusive { end } else { start };
        Some(ScanMatch { start, end, groups })
    }

    /// Undo the most recent successful `scan`/`scan_until`, resetting the
    /// cursor to where that match began.
    pub fn unscan(&mut self) {
        if let Some(start) = self.last_match_start.take() {
            self.pos = start;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(pat: &str) -> Regex {
        Regex::new(pat).unwrap()
    }

    #[test]
    fn scan_advances_on_match_at_cursor() {
        let mut s = Scanner::new(b"## hello");
        let m = s.scan(&re(r"^#+")).unwrap();
        assert_eq!(m.start, 0);
        assert_eq!(m.end, 2);
        assert_eq!(s.pos(), 2);
        assert_eq!(s.peek(), Some(b' '));
    }

    #[test]
    fn scan_fails_when_not_anchored_at_cursor() {
        let mut s = Scanner::new(b"a#b");
        assert!(s.scan(&re(r"#")).is_none());
        assert_eq!(s.pos(), 0);
    }

    #[test]
    fn unscan_rewinds_last_match() {
        let mut s = Scanner::new(b"abc");
        s.scan(&re(r"^ab")).unwrap();
        assert_eq!(s.pos(), 2);
        s.unscan();
        assert_eq!(s.pos(), 0);
    }

    #[test]
    fn scan_until_exclusive_stops_before_match() {
        let mut s = Scanner::new(b"text`code`more");
        let m = s.scan_until(&re("`"), false).unwrap();
        assert_eq!(m.start, 4);
        assert_eq!(s.pos(), 4);
        assert_eq!(s.peek(), Some(b'`'));
    }

    #[test]
    fn captures_report_group_ranges() {
        let mut s = Scanner::new(b"12. x");
        let m = s.scan(&re(r"^(\d+)[.)] ")).unwrap();
        let (gs, ge) = m.group(1).unwrap();
        assert_eq!(&s.slice(gs, ge), b"12");
    }
}
