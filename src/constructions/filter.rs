// Qualification rules for candidate spans.
// Checks run in a fixed order and stop at the first discard.

use rustc_hash::FxHashSet;
use serde::Serialize;

use super::{Span, UPOS_NOUN, UPOS_PROPN};

/// Read-only lexical configuration shared by every filter call in a run
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Lemmas without independent lexical content
    pub stopwords: FxHashSet<String>,
    /// Characters that disqualify a construction when present in its text
    pub excluded_chars: FxHashSet<char>,
}

impl FilterConfig {
    pub fn new<S, C>(stopwords: S, excluded_chars: C) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        C: IntoIterator<Item = char>,
    {
        Self {
            stopwords: stopwords.into_iter().map(Into::into).collect(),
            excluded_chars: excluded_chars.into_iter().collect(),
        }
    }

    pub fn is_stopword(&self, lemma: &str) -> bool {
        self.stopwords.contains(lemma)
    }

    pub fn is_excluded(&self, c: char) -> bool {
        self.excluded_chars.contains(&c)
    }
}

/// Why a span was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// Every lemma is a stopword
    StopwordsOnly,
    /// Every token is a proper noun
    ProperNounsOnly,
    /// Text contains an excluded character
    ExcludedCharacter,
}

/// A span that passed every check, normalized for counting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Construction {
    /// Lowercased forms joined by single spaces
    pub text: String,
    /// Span contains at least one common noun
    pub noun_bearing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Keep(Construction),
    Discard(DiscardReason),
}

impl FilterOutcome {
    pub fn construction(self) -> Option<Construction> {
        match self {
            FilterOutcome::Keep(construction) => Some(construction),
            FilterOutcome::Discard(_) => None,
        }
    }
}

/// Stateless classifier over spans
#[derive(Debug, Clone)]
pub struct ConstructionFilter {
    config: FilterConfig,
}

impl ConstructionFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn classify(&self, span: &Span<'_>) -> FilterOutcome {
        let tokens = span.tokens();

        if tokens.iter().all(|t| self.config.is_stopword(&t.lemma)) {
            return FilterOutcome::Discard(DiscardReason::StopwordsOnly);
        }

        // Tag set exactly {PROPN}; a span is never empty so `all` suffices
        if tokens.iter().all(|t| t.upos == UPOS_PROPN) {
            return FilterOutcome::Discard(DiscardReason::ProperNounsOnly);
        }

        let text = span.surface().to_lowercase();
        if text.chars().any(|c| self.config.is_excluded(c)) {
            return FilterOutcome::Discard(DiscardReason::ExcludedCharacter);
        }

        FilterOutcome::Keep(Construction {
            text,
            noun_bearing: tokens.iter().any(|t| t.upos == UPOS_NOUN),
        })
    }
}
