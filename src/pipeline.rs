// Batch run over annotation files: decode -> extract spans -> filter -> count.
// Each file builds its own aggregator, merged into the run only if the file succeeds.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::conllu::SentenceIter;
use crate::constructions::{
    comma_spans, ConstructionFilter, DiscardReason, FilterOutcome, FrequencyAggregator, Token,
};
use crate::discovery::CandidateFile;
use crate::reader::{AsyncFileReader, ReaderConfig};

/// Counters from extraction and filtering
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionCounts {
    pub sentences: u64,
    pub spans: u64,
    pub kept: u64,
    pub noun_bearing: u64,
    pub discarded_stopwords: u64,
    pub discarded_proper_nouns: u64,
    pub discarded_excluded_chars: u64,
}

impl ExtractionCounts {
    fn count_discard(&mut self, reason: DiscardReason) {
        match reason {
            DiscardReason::StopwordsOnly => self.discarded_stopwords += 1,
            DiscardReason::ProperNounsOnly => self.discarded_proper_nouns += 1,
            DiscardReason::ExcludedCharacter => self.discarded_excluded_chars += 1,
        }
    }

    pub fn discarded(&self) -> u64 {
        self.discarded_stopwords + self.discarded_proper_nouns + self.discarded_excluded_chars
    }

    pub fn add(&mut self, other: &ExtractionCounts) {
        self.sentences += other.sentences;
        self.spans += other.spans;
        self.kept += other.kept;
        self.noun_bearing += other.noun_bearing;
        self.discarded_stopwords += other.discarded_stopwords;
        self.discarded_proper_nouns += other.discarded_proper_nouns;
        self.discarded_excluded_chars += other.discarded_excluded_chars;
    }
}

/// Feed every span of one sentence through the filter into `aggregator`
pub fn process_sentence(
    sentence: &[Token],
    filter: &ConstructionFilter,
    aggregator: &mut FrequencyAggregator,
) -> ExtractionCounts {
    let mut counts = ExtractionCounts { sentences: 1, ..Default::default() };

    for span in comma_spans(sentence) {
        counts.spans += 1;
        match filter.classify(&span) {
            FilterOutcome::Keep(construction) => {
                counts.kept += 1;
                if construction.noun_bearing {
                    counts.noun_bearing += 1;
                }
                aggregator.record_construction(&construction);
            }
            FilterOutcome::Discard(reason) => {
                debug!(?reason, span = %span.surface(), "Discarded span");
                counts.count_discard(reason);
            }
        }
    }

    counts
}

/// Decode CoNLL-U `text` and count its constructions into a fresh aggregator.
///
/// A decode error anywhere fails the whole text; nothing partial is returned.
pub fn process_text(text: &str, filter: &ConstructionFilter) -> Result<(FrequencyAggregator, ExtractionCounts)> {
    let mut aggregator = FrequencyAggregator::new();
    let mut counts = ExtractionCounts::default();

    for sentence in SentenceIter::new(text) {
        let sentence = sentence?;
        counts.add(&process_sentence(&sentence, filter, &mut aggregator));
    }

    Ok((aggregator, counts))
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    /// File path as discovered
    pub path: String,
    /// File size in bytes
    pub bytes: u64,
    /// Extraction counters; zero for failed files
    pub counts: ExtractionCounts,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Processing status (success, failed, skipped)
    pub status: String,
    /// Error message if processing failed
    pub error: Option<String>,
}

/// Aggregate statistics for one run, written with `--stats-out`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunStats {
    /// Seconds since the Unix epoch at run start
    pub run_start: u64,
    pub total_processing_time_ms: u64,
    pub files_processed: u64,
    pub files_skipped: u64,
    pub files_failed: u64,
    pub totals: ExtractionCounts,
    /// Distinct constructions in each table at the end of the run
    pub distinct_constructions: u64,
    pub distinct_noun_constructions: u64,
    pub file_stats: Vec<FileStats>,
}

impl RunStats {
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        info!("Run statistics written to {}", path.display());
        Ok(())
    }
}

/// Knobs for a batch run
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Abort on the first failed file instead of skipping it
    pub fail_fast: bool,
    /// Hide the progress bar
    pub no_progress: bool,
    pub reader: ReaderConfig,
}

/// Sequential batch processor owning the run's aggregator
pub struct BatchRunner {
    config: RunConfig,
    filter: ConstructionFilter,
    reader: AsyncFileReader,
    aggregator: FrequencyAggregator,
    stats: RunStats,
}

impl BatchRunner {
    pub fn new(config: RunConfig, filter: ConstructionFilter) -> Self {
        let reader = AsyncFileReader::new(ReaderConfig {
            fail_fast: config.fail_fast,
            ..config.reader.clone()
        });
        let run_start = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Self {
            config,
            filter,
            reader,
            aggregator: FrequencyAggregator::new(),
            stats: RunStats { run_start, ..Default::default() },
        }
    }

    /// Merge counters produced elsewhere (another batch, a saved snapshot)
    pub fn merge(&mut self, other: &FrequencyAggregator) {
        self.aggregator.merge(other);
    }

    pub fn aggregator(&self) -> &FrequencyAggregator {
        &self.aggregator
    }

    /// Record files that selection left out, each with a `skipped` entry
    pub fn note_skipped(&mut self, files: &[CandidateFile], reason: &str) {
        for file in files {
            debug!("Skipped {}: {}", file.path.display(), reason);
            self.stats.files_skipped += 1;
            self.stats.file_stats.push(FileStats {
                path: file.path.display().to_string(),
                bytes: file.size_bytes,
                counts: ExtractionCounts::default(),
                processing_time_ms: 0,
                status: "skipped".to_string(),
                error: Some(file.error.clone().unwrap_or_else(|| reason.to_string())),
            });
        }
    }

    /// Process one file; failures are recorded in its stats unless fail_fast is set
    pub async fn process_file(&mut self, path: &Path) -> Result<FileStats> {
        let start = Instant::now();
        let outcome = self.load_and_count(path).await;

        let mut file_stats = FileStats {
            path: path.display().to_string(),
            bytes: 0,
            counts: ExtractionCounts::default(),
            processing_time_ms: 0,
            status: "success".to_string(),
            error: None,
        };

        match outcome {
            Ok((aggregator, counts, bytes)) => {
                self.aggregator.merge(&aggregator);
                self.stats.totals.add(&counts);
                self.stats.files_processed += 1;
                file_stats.bytes = bytes;
                file_stats.counts = counts;
                info!(
                    "Processed {}: {} sentences, {} spans, {} kept",
                    path.display(),
                    counts.sentences,
                    counts.spans,
                    counts.kept
                );
            }
            Err(e) => {
                if self.config.fail_fast {
                    return Err(e.context(format!("Processing failed for {}", path.display())));
                }
                warn!("Skipping {}: {:#}", path.display(), e);
                self.stats.files_failed += 1;
                file_stats.status = "failed".to_string();
                file_stats.error = Some(format!("{e:#}"));
            }
        }

        file_stats.processing_time_ms = start.elapsed().as_millis() as u64;
        self.stats.file_stats.push(file_stats.clone());
        Ok(file_stats)
    }

    async fn load_and_count(&self, path: &Path) -> Result<(FrequencyAggregator, ExtractionCounts, u64)> {
        let (text, read_stats) = self.reader.read_file_text(path).await?;
        if let Some(error) = read_stats.read_error {
            anyhow::bail!(error);
        }
        let (aggregator, counts) = process_text(&text, &self.filter)?;
        Ok((aggregator, counts, read_stats.bytes_read))
    }

    /// Process `files` in order with a progress bar
    pub async fn run(&mut self, files: &[CandidateFile]) -> Result<()> {
        let run_timer = Instant::now();
        let total_bytes: u64 = files.iter().map(|f| f.size_bytes).sum();

        let progress = if self.config.no_progress {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(total_bytes);
            bar.set_style(ProgressStyle::with_template(
                "[{elapsed}/{eta}] {bar:40.cyan/blue} {bytes:>10}/{total_bytes:10} {msg}",
            )?);
            bar
        };

        info!("Processing {} files ({} bytes)", files.len(), total_bytes);

        for file in files {
            progress.set_message(file.path.display().to_string());
            let result = self.process_file(&file.path).await;
            progress.inc(file.size_bytes);
            if let Err(e) = result {
                progress.abandon();
                return Err(e);
            }
        }
        progress.finish_with_message(format!("{} constructions", self.aggregator.all().len()));

        self.stats.total_processing_time_ms += run_timer.elapsed().as_millis() as u64;
        info!(
            "Batch complete: {} processed, {} failed, {} skipped",
            self.stats.files_processed, self.stats.files_failed, self.stats.files_skipped
        );
        Ok(())
    }

    /// Final statistics and counters
    pub fn finish(mut self) -> (FrequencyAggregator, RunStats) {
        self.stats.distinct_constructions = self.aggregator.all().len() as u64;
        self.stats.distinct_noun_constructions = self.aggregator.noun_bearing().len() as u64;
        (self.aggregator, self.stats)
    }
}
