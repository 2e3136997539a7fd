// Persistence of frequency tables: JSON snapshots and TSV exports.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constructions::{FrequencyAggregator, FrequencyTable};

/// Default output file names
pub const DEFAULT_SNAPSHOT: &str = "intro_counters.json";
pub const DEFAULT_ALL_TSV: &str = "intro_counter.tsv";
pub const DEFAULT_NOUN_TSV: &str = "intro_noun_counter.tsv";

static BUFFER_CAPACITY: usize = 1 << 20;

#[derive(Debug, Serialize)]
struct TsvRecord<'a> {
    construction: &'a str,
    frequency: u64,
}

/// Where a run writes its results
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub snapshot: PathBuf,
    pub all_tsv: PathBuf,
    pub noun_tsv: PathBuf,
}

impl OutputPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            snapshot: dir.join(DEFAULT_SNAPSHOT),
            all_tsv: dir.join(DEFAULT_ALL_TSV),
            noun_tsv: dir.join(DEFAULT_NOUN_TSV),
        }
    }
}

/// Save both tables as JSON, each an ordered list of `{construction, frequency}`
pub async fn save_snapshot(aggregator: &FrequencyAggregator, path: &Path) -> Result<()> {
    let content = serde_json::to_string(aggregator)?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
    info!(
        "Snapshot written to {}: {} constructions, {} noun-bearing",
        path.display(),
        aggregator.all().len(),
        aggregator.noun_bearing().len()
    );
    Ok(())
}

pub async fn load_snapshot(path: &Path) -> Result<FrequencyAggregator> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let aggregator: FrequencyAggregator = serde_json::from_str(&content)
        .with_context(|| format!("Malformed snapshot {}", path.display()))?;
    info!("Loaded snapshot {}: {} constructions", path.display(), aggregator.all().len());
    Ok(aggregator)
}

/// Write `table` as `construction<TAB>frequency` rows in export order, with a header
pub fn write_tsv(table: &FrequencyTable, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(BufWriter::with_capacity(BUFFER_CAPACITY, file));

    for (construction, frequency) in table.export() {
        writer.serialize(TsvRecord { construction, frequency })?;
    }
    writer.flush()?;

    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Write the snapshot and both TSV tables
pub async fn write_outputs(aggregator: &FrequencyAggregator, paths: &OutputPaths) -> Result<()> {
    save_snapshot(aggregator, &paths.snapshot).await?;
    write_tsv(aggregator.all(), &paths.all_tsv)?;
    write_tsv(aggregator.noun_bearing(), &paths.noun_tsv)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructions::TableKind;
    use tempfile::TempDir;

    fn sample() -> FrequencyAggregator {
        let mut agg = FrequencyAggregator::new();
        agg.record("впрочем", false);
        agg.record("к счастью", true);
        agg.record("к счастью", true);
        agg.record("\"в кавычках\"", false);
        agg
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_SNAPSHOT);
        let agg = sample();

        save_snapshot(&agg, &path).await.unwrap();
        let loaded = load_snapshot(&path).await.unwrap();

        assert_eq!(loaded.export(TableKind::All), agg.export(TableKind::All));
        assert_eq!(loaded.export(TableKind::NounBearing), agg.export(TableKind::NounBearing));
    }

    #[tokio::test]
    async fn test_malformed_snapshot_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, "{\"all\": 3}").unwrap();

        let err = load_snapshot(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("Malformed snapshot"));
    }

    #[test]
    fn test_tsv_header_and_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_ALL_TSV);

        write_tsv(sample().all(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "construction\tfrequency");
        assert_eq!(lines[1], "к счастью\t2");
        assert_eq!(lines[2], "впрочем\t1");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_tsv_round_trips_through_csv_reader() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_ALL_TSV);
        write_tsv(sample().all(), &path).unwrap();

        let mut reader = csv::ReaderBuilder::new().delimiter(b'\t').from_path(&path).unwrap();
        let rows: Vec<(String, u64)> = reader.deserialize().map(|r| r.unwrap()).collect();

        assert_eq!(rows[2], ("\"в кавычках\"".to_string(), 1));
    }

    #[tokio::test]
    async fn test_write_outputs_creates_all_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = OutputPaths::in_dir(temp_dir.path());

        write_outputs(&sample(), &paths).await.unwrap();

        assert!(paths.snapshot.exists());
        assert!(paths.all_tsv.exists());
        let noun = std::fs::read_to_string(&paths.noun_tsv).unwrap();
        assert_eq!(noun, "construction\tfrequency\nк счастью\t2\n");
    }
}
