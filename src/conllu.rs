// CoNLL-U decoding into token sentences.
// Only FORM, LEMMA and UPOS are retained; everything else in the line is ignored.

use anyhow::{bail, Result};
use std::str::Lines;
use tracing::debug;

use crate::constructions::{Sentence, Token};

/// Minimum columns needed to read ID, FORM, LEMMA and UPOS
const REQUIRED_COLUMNS: usize = 4;

/// Lazy sentence decoder over CoNLL-U text.
///
/// Sentences are separated by blank lines, `#` lines are comments.
/// Multiword-token ranges (`3-4`) and empty nodes (`5.1`) are skipped.
pub struct SentenceIter<'a> {
    lines: Lines<'a>,
    line_number: usize,
    failed: bool,
}

impl<'a> SentenceIter<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line_number: 0,
            failed: false,
        }
    }
}

impl Iterator for SentenceIter<'_> {
    type Item = Result<Sentence>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let mut sentence = Sentence::new();
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line.trim_end_matches('\r');

            if line.trim().is_empty() {
                if sentence.is_empty() {
                    continue;
                }
                return Some(Ok(sentence));
            }
            if line.starts_with('#') {
                continue;
            }

            match decode_token(line, self.line_number) {
                Ok(Some(token)) => sentence.push(token),
                Ok(None) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }

        // trailing sentence without a closing blank line
        if sentence.is_empty() {
            None
        } else {
            Some(Ok(sentence))
        }
    }
}

/// Decode one token line; `Ok(None)` for nodes that are not surface tokens
fn decode_token(line: &str, line_number: usize) -> Result<Option<Token>> {
    let mut columns = line.split('\t');
    let (Some(id), Some(form), Some(lemma), Some(upos)) =
        (columns.next(), columns.next(), columns.next(), columns.next())
    else {
        bail!(
            "line {}: expected at least {} tab-separated columns, got {}",
            line_number,
            REQUIRED_COLUMNS,
            line.split('\t').count()
        );
    };

    if id.contains('-') || id.contains('.') {
        debug!("Skipping non-surface node {} at line {}", id, line_number);
        return Ok(None);
    }

    Ok(Some(Token::new(form, lemma, upos)))
}

/// Decode every sentence of `text`
pub fn parse_sentences(text: &str) -> Result<Vec<Sentence>> {
    SentenceIter::new(text).collect()
}
