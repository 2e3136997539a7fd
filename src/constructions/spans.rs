// Comma-bounded span extraction.
// Both rules use a fixed lookahead window tried nearest-first; the first comma found wins.

use super::{Span, Token};

/// Offsets from sentence start probed by the start rule
const START_OFFSETS: [usize; 3] = [1, 2, 3];

/// Offsets from a triggering comma probed by the post-comma rule
const AFTER_COMMA_OFFSETS: [usize; 3] = [2, 3, 4];

/// Iterator over candidate spans of one sentence.
///
/// Yields at most one span from the start rule, then at most one span per
/// comma at index `i >= 1`, in sentence order. Spans from the two rules may
/// overlap and are not deduplicated.
#[derive(Debug, Clone)]
pub struct CommaSpans<'a> {
    sentence: &'a [Token],
    start_rule_done: bool,
    cursor: usize,
}

/// Extract every comma-delimited span of `sentence`
pub fn comma_spans(sentence: &[Token]) -> CommaSpans<'_> {
    CommaSpans {
        sentence,
        start_rule_done: false,
        // index 0 is owned by the start rule
        cursor: 1,
    }
}

impl<'a> CommaSpans<'a> {
    fn is_comma_at(&self, index: usize) -> bool {
        self.sentence.get(index).is_some_and(Token::is_comma)
    }

    /// First comma within `origin + offsets`, nearest offset first
    fn first_comma(&self, origin: usize, offsets: &[usize]) -> Option<usize> {
        offsets
            .iter()
            .map(|offset| origin + offset)
            .find(|&index| self.is_comma_at(index))
    }

    fn start_span(&self) -> Option<Span<'a>> {
        self.first_comma(0, &START_OFFSETS)
            .map(|end| Span::new(self.sentence, 0, end))
    }

    fn span_after_comma(&self, comma: usize) -> Option<Span<'a>> {
        self.first_comma(comma, &AFTER_COMMA_OFFSETS)
            .map(|end| Span::new(self.sentence, comma + 1, end))
    }
}

impl<'a> Iterator for CommaSpans<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.start_rule_done {
            self.start_rule_done = true;
            if let Some(span) = self.start_span() {
                return Some(span);
            }
        }

        while self.cursor < self.sentence.len() {
            let index = self.cursor;
            self.cursor += 1;
            if !self.sentence[index].is_comma() {
                continue;
            }
            if let Some(span) = self.span_after_comma(index) {
                return Some(span);
            }
        }

        None
    }
}

impl std::iter::FusedIterator for CommaSpans<'_> {}
