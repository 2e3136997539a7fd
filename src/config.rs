// Lexical configuration for the construction filter: stopwords and excluded characters.

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::path::Path;
use stop_words::{get, LANGUAGE};
use tracing::info;

use crate::constructions::FilterConfig;

/// Closed-class lemmas missing from the stock Russian list
pub const EXTRA_STOPWORDS: &[&str] = &["который", "это", "весь", "свой"];

/// Typographic symbols excluded alongside ASCII punctuation and digits
const TYPOGRAPHIC_EXCLUDED: &[char] = &['—', '«', '”'];

/// NLTK's Russian stopword list plus [`EXTRA_STOPWORDS`]
pub fn default_stopwords() -> FxHashSet<String> {
    let mut stopwords: FxHashSet<String> = get(LANGUAGE::Russian).iter().map(|s| s.to_string()).collect();
    stopwords.extend(EXTRA_STOPWORDS.iter().map(|s| s.to_string()));
    stopwords
}

/// ASCII punctuation, ASCII digits and a few typographic dashes/quotes
pub fn default_excluded_chars() -> FxHashSet<char> {
    (0u8..=127)
        .map(char::from)
        .filter(|c| c.is_ascii_punctuation() || c.is_ascii_digit())
        .chain(TYPOGRAPHIC_EXCLUDED.iter().copied())
        .collect()
}

/// Parse a newline-separated stopword list; blank lines and `#` comments are ignored
pub fn parse_stopword_list(content: &str) -> FxHashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub async fn load_stopword_file(path: &Path) -> Result<FxHashSet<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read stopword file {}", path.display()))?;
    let stopwords = parse_stopword_list(&content);
    info!("Loaded {} stopwords from {}", stopwords.len(), path.display());
    Ok(stopwords)
}

/// Sources for a [`FilterConfig`]; `None` fields fall back to the defaults
#[derive(Debug, Clone, Default)]
pub struct LexiconOptions<'a> {
    pub stopword_file: Option<&'a Path>,
    pub extra_stopwords: &'a [String],
    pub excluded_chars: Option<&'a str>,
}

/// Assemble the run's filter configuration
pub async fn build_filter_config(options: LexiconOptions<'_>) -> Result<FilterConfig> {
    let mut stopwords = match options.stopword_file {
        Some(path) => load_stopword_file(path).await?,
        None => default_stopwords(),
    };
    stopwords.extend(options.extra_stopwords.iter().cloned());

    let excluded_chars = match options.excluded_chars {
        Some(chars) => chars.chars().collect(),
        None => default_excluded_chars(),
    };

    info!(
        stopwords = stopwords.len(),
        excluded_chars = excluded_chars.len(),
        "Filter configuration ready"
    );

    Ok(FilterConfig { stopwords, excluded_chars })
}
