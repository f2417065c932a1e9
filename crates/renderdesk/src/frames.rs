//! Frame-range expressions.
//!
//! A frame expression is a comma-separated list of single frames (`130`) and
//! inclusive ranges (`101-120`). Ranges are expanded coarse-to-fine: first
//! frame, last frame, then midpoints of ever smaller windows, so that a
//! partially rendered sequence already samples the whole shot. Single frames
//! are emitted exactly as written.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A frame number.
pub type Frame = i64;

/// Most frames a single `start-end` range may expand to.
pub const MAX_RANGE_FRAMES: u64 = 1_000_000;

/// Errors produced while parsing a frame expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty frame token in '{expr}'")]
    EmptyToken { expr: String },

    #[error("Invalid frame number '{token}'")]
    InvalidNumber { token: String },

    #[error("Malformed frame range '{token}' (expected START-END)")]
    MalformedRange { token: String },

    #[error("Reversed frame range {start}-{end} (start must not exceed end)")]
    ReversedRange { start: Frame, end: Frame },

    #[error("Frame range {start}-{end} exceeds {max} frames")]
    RangeTooLarge { start: Frame, end: Frame, max: u64 },
}

/// One comma-separated element of a frame expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameToken {
    /// A literal frame. `text` is the token as written, e.g. `0101`.
    Single { frame: Frame, text: String },
    Range { start: Frame, end: Frame },
}

impl FrameToken {
    fn parse(token: &str) -> Result<Self, ParseError> {
        match token.split_once('-') {
            None => Ok(FrameToken::Single {
                frame: parse_frame(token)?,
                text: token.to_string(),
            }),
            Some((start, end)) => {
                if start.is_empty() || end.is_empty() || end.contains('-') {
                    return Err(ParseError::MalformedRange {
                        token: token.to_string(),
                    });
                }
                let start = parse_frame(start)?;
                let end = parse_frame(end)?;
                if start > end {
                    return Err(ParseError::ReversedRange { start, end });
                }
                let len = end
                    .checked_sub(start)
                    .and_then(|d| d.checked_add(1))
                    .map(|n| n as u64);
                match len {
                    Some(n) if n <= MAX_RANGE_FRAMES => Ok(FrameToken::Range { start, end }),
                    _ => Err(ParseError::RangeTooLarge {
                        start,
                        end,
                        max: MAX_RANGE_FRAMES,
                    }),
                }
            }
        }
    }

    /// Number of frames this token expands to.
    fn len(&self) -> usize {
        match self {
            FrameToken::Single { .. } => 1,
            // Bounded by MAX_RANGE_FRAMES at parse time.
            FrameToken::Range { start, end } => (end - start + 1) as usize,
        }
    }

    /// Iterates this token's frames in render order.
    pub fn frames(&self) -> Box<dyn Iterator<Item = Frame> + '_> {
        match self {
            FrameToken::Single { frame, .. } => Box::new(std::iter::once(*frame)),
            FrameToken::Range { start, .. } => {
                let start = *start;
                Box::new(QcIndices::new(self.len()).map(move |i| start + i as Frame))
            }
        }
    }

    fn bounds(&self) -> (Frame, Frame) {
        match self {
            FrameToken::Single { frame, .. } => (*frame, *frame),
            FrameToken::Range { start, end } => (*start, *end),
        }
    }
}

fn parse_frame(text: &str) -> Result<Frame, ParseError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidNumber {
            token: text.to_string(),
        });
    }
    text.parse().map_err(|_| ParseError::InvalidNumber {
        token: text.to_string(),
    })
}

/// A parsed frame expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameList {
    tokens: Vec<FrameToken>,
}

impl FrameList {
    /// Parses an expression such as `"101-120, 130"`. Whitespace is ignored
    /// and an empty expression yields an empty list.
    pub fn parse(expr: &str) -> Result<Self, ParseError> {
        let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Ok(Self::default());
        }

        let tokens = compact
            .split(',')
            .map(|token| {
                if token.is_empty() {
                    Err(ParseError::EmptyToken {
                        expr: expr.to_string(),
                    })
                } else {
                    FrameToken::parse(token)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[FrameToken] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// All frames in render order: tokens in input order, ranges expanded
    /// coarse-to-fine.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        self.tokens.iter().flat_map(|t| t.frames())
    }

    /// Lowest and highest frame referenced by the expression.
    pub fn span(&self) -> Option<(Frame, Frame)> {
        self.tokens.iter().map(FrameToken::bounds).reduce(|acc, (lo, hi)| {
            (acc.0.min(lo), acc.1.max(hi))
        })
    }
}

impl FromStr for FrameList {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FrameList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.tokens {
            if let FrameToken::Single { text, .. } = token {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str(text)?;
                first = false;
                continue;
            }
            for frame in token.frames() {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{}", frame)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Expands a frame expression into its render-order string, e.g.
/// `"101-103"` becomes `"101, 103, 102"`.
pub fn frame_list(expr: &str) -> Result<String, ParseError> {
    Ok(FrameList::parse(expr)?.to_string())
}

/// Formats a compact `"min-max"` range from two frames in any order.
pub fn format_range(a: Frame, b: Frame) -> String {
    format!("{}-{}", a.min(b), a.max(b))
}

/// Lowest and highest frame of an expression, `None` when it is empty.
pub fn frame_span(expr: &str) -> Result<Option<(Frame, Frame)>, ParseError> {
    Ok(FrameList::parse(expr)?.span())
}

/// Reorders a sequence coarse-to-fine: first, last, then breadth-first
/// midpoints of the remaining windows.
pub fn qc_order<T: Copy>(seq: &[T]) -> Vec<T> {
    QcIndices::new(seq.len()).map(|i| seq[i]).collect()
}

/// Index generator behind [`qc_order`].
///
/// Windows are half-open `(start, stop)` index pairs processed FIFO. Index 0
/// and `len - 1` are emitted up front, so the initial window is `(1, len - 1)`.
struct QcIndices {
    len: usize,
    head: usize,
    queue: VecDeque<(usize, usize)>,
}

impl QcIndices {
    fn new(len: usize) -> Self {
        let mut queue = VecDeque::new();
        if len > 1 {
            queue.push_back((1, len - 1));
        }
        Self {
            len,
            head: 0,
            queue,
        }
    }
}

impl Iterator for QcIndices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.head == 0 && self.len > 0 {
            self.head = 1;
            return Some(0);
        }
        if self.head == 1 {
            self.head = 2;
            if self.len > 1 {
                return Some(self.len - 1);
            }
        }
        while let Some((start, stop)) = self.queue.pop_front() {
            if start < stop {
                let middle = (start + stop) / 2;
                self.queue.push_back((start, middle));
                self.queue.push_back((middle + 1, stop));
                return Some(middle);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_range_emits_ends_then_middle() {
        assert_eq!(frame_list("101-103").unwrap(), "101, 103, 102");
    }

    #[test]
    fn test_single_frame_is_not_expanded() {
        assert_eq!(frame_list("5").unwrap(), "5");
    }

    #[test]
    fn test_degenerate_range() {
        assert_eq!(frame_list("1-1").unwrap(), "1");
    }

    #[test]
    fn test_range_followed_by_literal() {
        // (1, 3) -> middle index 2 (frame 3), then (1, 2) -> index 1 (frame 2)
        assert_eq!(frame_list("1-4, 10").unwrap(), "1, 4, 3, 2, 10");
    }

    #[test]
    fn test_longer_range_order() {
        // indices: 0, 9, then windows (1,9) -> 5, (1,5) -> 3, (6,9) -> 7,
        // (1,3) -> 2, (4,5) -> 4, (6,7) -> 6, (8,9) -> 8, (1,2) -> 1
        assert_eq!(
            frame_list("1-10").unwrap(),
            "1, 10, 6, 4, 8, 3, 5, 7, 9, 2"
        );
    }

    #[test]
    fn test_whitespace_ignored() {
        assert_eq!(frame_list(" 1 - 2 ,  7 ").unwrap(), "1, 2, 7");
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(frame_list("").unwrap(), "");
        assert_eq!(frame_list("   ").unwrap(), "");
        assert!(FrameList::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_every_frame_emitted_once() {
        for (a, b) in [(0, 0), (1, 2), (101, 120), (1001, 1100), (7, 64)] {
            let list = FrameList::parse(&format_range(a, b)).unwrap();
            let mut frames: Vec<Frame> = list.frames().collect();
            assert_eq!(frames.len() as i64, b - a + 1, "range {}-{}", a, b);
            frames.sort_unstable();
            assert_eq!(frames, (a..=b).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_reversed_range_rejected() {
        assert_eq!(
            FrameList::parse("120-101").unwrap_err(),
            ParseError::ReversedRange {
                start: 120,
                end: 101
            }
        );
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        assert!(matches!(
            FrameList::parse("1-2-3"),
            Err(ParseError::MalformedRange { .. })
        ));
        assert!(matches!(
            FrameList::parse("-5"),
            Err(ParseError::MalformedRange { .. })
        ));
        assert!(matches!(
            FrameList::parse("10-"),
            Err(ParseError::MalformedRange { .. })
        ));
        assert_eq!(
            FrameList::parse("1-x").unwrap_err(),
            ParseError::InvalidNumber {
                token: "x".to_string()
            }
        );
        assert!(matches!(
            FrameList::parse("abc"),
            Err(ParseError::InvalidNumber { .. })
        ));
        assert!(matches!(
            FrameList::parse("1,,2"),
            Err(ParseError::EmptyToken { .. })
        ));
    }

    #[test]
    fn test_parse_error_messages_name_the_token() {
        let err = FrameList::parse("101-1o5").unwrap_err();
        assert_eq!(err.to_string(), "Invalid frame number '1o5'");
    }

    #[test]
    fn test_format_range_orders_bounds() {
        assert_eq!(format_range(120, 101), "101-120");
        assert_eq!(format_range(101, 120), "101-120");
    }

    #[test]
    fn test_span() {
        assert_eq!(frame_span("130, 101-120, 95").unwrap(), Some((95, 130)));
        assert_eq!(frame_span("").unwrap(), None);
    }

    #[test]
    fn test_qc_order_on_slice() {
        assert_eq!(qc_order(&["a", "b", "c", "d"]), vec!["a", "d", "c", "b"]);
        assert_eq!(qc_order::<u8>(&[]), Vec::<u8>::new());
        assert_eq!(qc_order(&[9]), vec![9]);
        assert_eq!(qc_order(&[1, 2]), vec![1, 2]);
    }

    #[test]
    fn test_literal_tokens_kept_as_written() {
        assert_eq!(frame_list("0101, 007").unwrap(), "0101, 007");
        assert_eq!(frame_list("0101").unwrap(), "0101");
        // ranges are numeric
        assert_eq!(frame_list("007, 01-03").unwrap(), "007, 1, 3, 2");
        assert_eq!(frame_span("0101, 95").unwrap(), Some((95, 101)));
    }

    #[test]
    fn test_oversized_range_rejected() {
        assert_eq!(
            FrameList::parse("0-9223372036854775807").unwrap_err(),
            ParseError::RangeTooLarge {
                start: 0,
                end: Frame::MAX,
                max: MAX_RANGE_FRAMES
            }
        );
        assert!(matches!(
            FrameList::parse("1-4000000000"),
            Err(ParseError::RangeTooLarge { .. })
        ));
        let edge = format!("1-{}", MAX_RANGE_FRAMES);
        assert_eq!(FrameList::parse(&edge).unwrap().frames().count() as u64, MAX_RANGE_FRAMES);
    }

    #[test]
    fn test_from_str() {
        let list: FrameList = "1-3".parse().unwrap();
        assert_eq!(list.tokens(), &[FrameToken::Range { start: 1, end: 3 }]);
    }
}
