pub mod config;
pub mod conllu;
pub mod constructions;
pub mod discovery;
pub mod export;
pub mod pipeline;
pub mod reader;

// Re-export the core types for convenient access
pub use constructions::{
    comma_spans, Construction, ConstructionFilter, FilterConfig, FilterOutcome,
    FrequencyAggregator, FrequencyTable, Sentence, Span, TableKind, Token,
};

// Re-export batch processing entry points
pub use pipeline::{process_sentence, process_text, BatchRunner, FileStats, RunConfig, RunStats};
