use anyhow::Result;
use futures::stream::{self, Stream, StreamExt};
use glob::glob;
use ignore::{WalkBuilder, WalkState};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Files above this size are left out of a run by default (2 GiB)
pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Name fragment marking sampled duplicates of larger files
pub const DEFAULT_SKIP_MARKER: &str = "_1m";

/// Configuration for file discovery behavior
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
    /// File extension (without dot) of annotation files
    pub extension: String,
    /// Walk roots with the parallel walker instead of glob
    pub parallel: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            extension: "conllu".to_string(),
            parallel: false,
        }
    }
}

/// A discovered annotation file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub error: Option<String>,
}

/// Rules deciding which discovered files make it into a run
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    /// Files whose path contains any of these are skipped
    pub skip_markers: Vec<String>,
    /// Size cap; the first file above it ends the selection
    pub max_file_bytes: Option<u64>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            skip_markers: vec![DEFAULT_SKIP_MARKER.to_string()],
            max_file_bytes: Some(DEFAULT_MAX_FILE_BYTES),
        }
    }
}

/// Outcome of applying a [`SelectionPolicy`]
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    /// Files to process, ascending by size
    pub selected: Vec<CandidateFile>,
    /// Files dropped by a skip marker
    pub skipped: Vec<CandidateFile>,
    /// Files at or beyond the first one over the size cap
    pub oversized: Vec<CandidateFile>,
    /// Files that could not be inspected
    pub invalid: Vec<CandidateFile>,
}

/// Discovers all files matching `**/*.<extension>` under `root_dir` with glob.
/// Returns an async stream of inspected candidates.
pub fn discover_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<CandidateFile>> {
    let root_path = root_dir.as_ref().to_path_buf();

    stream::unfold(DiscoveryState::new(root_path, config), |mut state| async move {
        state.next_file().await.map(|result| (result, state))
    })
}

/// Parallel directory traversal for large trees
pub fn discover_files_parallel(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<CandidateFile>> {
    let root_path = root_dir.as_ref().to_path_buf();
    let config = Arc::new(config);

    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        info!("Starting parallel directory traversal in: {}", root_path.display());
        let traversal_start = std::time::Instant::now();

        let walker = WalkBuilder::new(&root_path)
            .threads((num_cpus::get() / 2).max(1))
            .follow_links(false)
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .build_parallel();

        let (result_tx, result_rx) = std::sync::mpsc::channel();
        let suffix = format!(".{}", config.extension);

        // the walker blocks, so it runs on its own thread
        std::thread::spawn(move || {
            walker.run(|| {
                let result_tx = result_tx.clone();
                let suffix = suffix.clone();
                Box::new(move |result| {
                    if let Ok(entry) = result {
                        if entry.file_type().is_some_and(|ft| ft.is_file()) {
                            if let Some(file_name) = entry.file_name().to_str() {
                                if file_name.ends_with(&suffix) {
                                    debug!("Found matching file: {}", entry.path().display());
                                    let _ = result_tx.send(entry.path().to_path_buf());
                                }
                            }
                        }
                    }
                    WalkState::Continue
                })
            });
        });

        let mut file_count = 0;
        while let Ok(path) = result_rx.recv() {
            file_count += 1;
            match inspect_file(path, &config).await {
                Ok(candidate) => {
                    if tx.send(Ok(candidate)).is_err() {
                        debug!("Receiver dropped, stopping discovery");
                        break;
                    }
                }
                Err(e) => {
                    if tx.send(Err(e)).is_err() {
                        debug!("Receiver dropped, stopping discovery");
                    }
                    break;
                }
            }
        }

        info!(
            "Parallel discovery completed in {}ms, streamed {} files",
            traversal_start.elapsed().as_millis(),
            file_count
        );
    });

    stream::unfold(rx, |mut receiver| async move {
        receiver.recv().await.map(|result| (result, receiver))
    })
}

/// Stat a discovered path; without fail_fast, problems land in `CandidateFile::error`
async fn inspect_file(path: PathBuf, config: &DiscoveryConfig) -> Result<CandidateFile> {
    match fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => Ok(CandidateFile {
            path,
            size_bytes: metadata.len(),
            error: None,
        }),
        Ok(_) => {
            let error = format!("Path is not a file: {}", path.display());
            warn!("{}", error);
            Ok(CandidateFile { path, size_bytes: 0, error: Some(error) })
        }
        Err(e) => {
            let error = format!("Cannot access file {}: {}", path.display(), e);
            warn!("{}", error);

            if config.fail_fast {
                Err(anyhow::anyhow!(error))
            } else {
                Ok(CandidateFile { path, size_bytes: 0, error: Some(error) })
            }
        }
    }
}

/// Internal state for glob-driven discovery
struct DiscoveryState {
    root_dir: PathBuf,
    config: DiscoveryConfig,
    glob_iter: Option<glob::Paths>,
    finished: bool,
}

impl DiscoveryState {
    fn new(root_dir: PathBuf, config: DiscoveryConfig) -> Self {
        Self {
            root_dir,
            config,
            glob_iter: None,
            finished: false,
        }
    }

    async fn next_file(&mut self) -> Option<Result<CandidateFile>> {
        if self.finished {
            return None;
        }

        if self.glob_iter.is_none() {
            let pattern = format!("{}/**/*.{}", self.root_dir.display(), self.config.extension);
            debug!("Starting file discovery with pattern: {}", pattern);

            match glob(&pattern) {
                Ok(paths) => {
                    self.glob_iter = Some(paths);
                    info!("File discovery initialized for root: {}", self.root_dir.display());
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(anyhow::anyhow!("Failed to create glob pattern: {}", e)));
                }
            }
        }

        let glob_iter = self.glob_iter.as_mut()?;
        loop {
            let Some(next) = glob_iter.next() else {
                info!("File discovery completed for root: {}", self.root_dir.display());
                self.finished = true;
                return None;
            };
            match next {
                Ok(path) => {
                    debug!("Found file: {}", path.display());
                    return Some(inspect_file(path, &self.config).await);
                }
                Err(e) => {
                    let error_msg = format!("Glob iteration error: {e}");
                    warn!("{}", error_msg);

                    if self.config.fail_fast {
                        self.finished = true;
                        return Some(Err(anyhow::anyhow!(error_msg)));
                    }
                }
            }
        }
    }
}

/// Collect the candidates under one root
pub async fn collect_discovered_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<CandidateFile>> {
    let mut stream = if config.parallel {
        discover_files_parallel(root_dir, config).boxed_local()
    } else {
        discover_files(root_dir, config).boxed_local()
    };

    let mut files = Vec::new();
    while let Some(result) = stream.next().await {
        files.push(result?);
    }
    Ok(files)
}

/// Collect candidates from several roots into one list, deduplicated by path
/// and sorted ascending by size (ties by path)
pub async fn collect_from_roots<P: AsRef<Path>>(
    roots: &[P],
    config: DiscoveryConfig,
) -> Result<Vec<CandidateFile>> {
    // nested roots (a root inside another root) report the same file twice
    let mut by_path: BTreeMap<PathBuf, CandidateFile> = BTreeMap::new();

    for root in roots {
        let files = collect_discovered_files(root, config.clone()).await?;
        info!("Discovered {} files under {}", files.len(), root.as_ref().display());
        for file in files {
            by_path.entry(file.path.clone()).or_insert(file);
        }
    }

    let mut files: Vec<CandidateFile> = by_path.into_values().collect();
    files.sort_by(|a, b| a.size_bytes.cmp(&b.size_bytes).then_with(|| a.path.cmp(&b.path)));

    info!("Merged candidate list: {} files from {} roots", files.len(), roots.len());
    Ok(files)
}

/// Split a size-sorted candidate list according to `policy`
pub fn select_files(files: Vec<CandidateFile>, policy: &SelectionPolicy) -> FileSelection {
    let mut selection = FileSelection::default();
    let mut over_cap = false;

    for file in files {
        if file.error.is_some() {
            selection.invalid.push(file);
            continue;
        }

        if over_cap || policy.max_file_bytes.is_some_and(|cap| file.size_bytes > cap) {
            over_cap = true;
            selection.oversized.push(file);
            continue;
        }

        let path = file.path.to_string_lossy();
        if policy.skip_markers.iter().any(|marker| path.contains(marker.as_str())) {
            debug!("Skipping marked file: {}", file.path.display());
            selection.skipped.push(file);
            continue;
        }

        selection.selected.push(file);
    }

    info!(
        "File selection: {} selected, {} skipped, {} oversized, {} invalid",
        selection.selected.len(),
        selection.skipped.len(),
        selection.oversized.len(),
        selection.invalid.len()
    );

    selection
}
