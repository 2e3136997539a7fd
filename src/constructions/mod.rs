// Comma-delimited construction mining over annotated sentences.
// Data flows one way: Sentence -> CommaSpans -> ConstructionFilter -> FrequencyAggregator.

pub mod spans;
pub mod filter;
pub mod frequency;

pub use spans::{comma_spans, CommaSpans};
pub use filter::{Construction, ConstructionFilter, DiscardReason, FilterConfig, FilterOutcome};
pub use frequency::{FrequencyAggregator, FrequencyRecord, FrequencyTable, TableKind};

/// Surface form that delimits spans
pub const COMMA: &str = ",";

/// Universal POS tag for common nouns
pub const UPOS_NOUN: &str = "NOUN";

/// Universal POS tag for proper nouns
pub const UPOS_PROPN: &str = "PROPN";

/// Universal POS tag for punctuation
pub const UPOS_PUNCT: &str = "PUNCT";

/// One annotated token; only the columns the miner needs are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface spelling as it appears in the text
    pub form: String,
    /// Dictionary form
    pub lemma: String,
    /// Coarse part-of-speech tag
    pub upos: String,
}

impl Token {
    pub fn new(form: impl Into<String>, lemma: impl Into<String>, upos: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            lemma: lemma.into(),
            upos: upos.into(),
        }
    }

    pub fn is_comma(&self) -> bool {
        self.form == COMMA
    }
}

/// A decoded sentence is an ordered run of tokens
pub type Sentence = Vec<Token>;

/// Borrowed view of `tokens[start..end]` inside one sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    sentence: &'a [Token],
    pub start: usize,
    pub end: usize,
}

impl<'a> Span<'a> {
    /// Longest span either comma rule can produce
    pub const MAX_LEN: usize = 3;

    pub(crate) fn new(sentence: &'a [Token], start: usize, end: usize) -> Self {
        debug_assert!(start < end && end <= sentence.len());
        debug_assert!(end - start <= Self::MAX_LEN);
        Self { sentence, start, end }
    }

    pub fn tokens(&self) -> &'a [Token] {
        &self.sentence[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Surface forms joined by single spaces, case preserved
    pub fn surface(&self) -> String {
        self.tokens()
            .iter()
            .map(|t| t.form.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
