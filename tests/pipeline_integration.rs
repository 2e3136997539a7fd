use commata::config::{build_filter_config, default_excluded_chars, LexiconOptions};
use commata::constructions::FilterConfig;
use commata::discovery::{self, DiscoveryConfig, SelectionPolicy};
use commata::export::{self, OutputPaths};
use commata::{BatchRunner, ConstructionFilter, RunConfig, TableKind};

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::*;

fn filter() -> ConstructionFilter {
    let config = FilterConfig {
        stopwords: ["он", "в", "и", "быть"].iter().map(|s| s.to_string()).collect(),
        excluded_chars: default_excluded_chars(),
    };
    ConstructionFilter::new(config)
}

fn quiet() -> RunConfig {
    RunConfig { no_progress: true, ..Default::default() }
}

/// End-to-end run over a small corpus split across two roots
#[tokio::test]
async fn test_pipeline_two_roots() {
    let first = TestFixture::new();
    let second = TestFixture::new();
    first.create_conllu_file("a.conllu", &[FORTUNATELY, MOSCOW]);
    second.create_conllu_file("nested/b.conllu", &[FORTUNATELY, YEAR]);

    let roots = vec![first.root_path.clone(), second.root_path.clone()];
    let candidates = discovery::collect_from_roots(&roots, DiscoveryConfig::default())
        .await
        .expect("Discovery should succeed");
    assert_eq!(candidates.len(), 2);

    let selection = discovery::select_files(candidates, &SelectionPolicy::default());
    let mut runner = BatchRunner::new(quiet(), filter());
    runner.run(&selection.selected).await.expect("Run should succeed");
    let (agg, stats) = runner.finish();

    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.totals.sentences, 4);

    // FORTUNATELY twice: [к счастью] (start rule) and [впрочем]; [он] is a stopword
    assert_eq!(agg.all().get("к счастью"), 2);
    assert_eq!(agg.noun_bearing().get("к счастью"), 2);
    assert_eq!(agg.all().get("впрочем"), 2);
    assert_eq!(agg.noun_bearing().get("впрочем"), 0);
    assert_eq!(agg.all().get("он"), 0);

    // MOSCOW: [Москва] and [Россия] are proper nouns only
    assert_eq!(agg.all().get("москва"), 0);
    assert_eq!(agg.all().get("россия"), 0);

    // YEAR: [в 1812 году] has a digit; [кстати] survives
    assert_eq!(agg.all().get("в 1812 году"), 0);
    assert_eq!(agg.all().get("кстати"), 1);

    assert_eq!(
        agg.export(TableKind::All),
        vec![("к счастью", 2), ("впрочем", 2), ("кстати", 1)]
    );
}

/// The built-in lexicon keeps content-word constructions
#[tokio::test]
async fn test_pipeline_default_lexicon() {
    let fixture = TestFixture::new();
    let path = fixture.create_conllu_file("a.conllu", &[ONE_SIDE, FORTUNATELY]);

    let config = build_filter_config(LexiconOptions::default())
        .await
        .expect("Default lexicon should build");
    let mut runner = BatchRunner::new(quiet(), ConstructionFilter::new(config));
    runner.process_file(&path).await.unwrap();
    let (agg, stats) = runner.finish();

    assert_eq!(stats.files_processed, 1);
    assert_eq!(agg.all().get("с одной стороны"), 1);
    assert_eq!(agg.noun_bearing().get("с одной стороны"), 1);
    assert_eq!(agg.all().get("однако"), 1);
    assert_eq!(agg.noun_bearing().get("однако"), 0);
    assert_eq!(agg.noun_bearing().get("к счастью"), 1);

    // [он] and [впрочем] are stopwords
    assert_eq!(agg.all().get("он"), 0);
    assert_eq!(agg.all().get("впрочем"), 0);
}

/// Outputs written after a run can be merged into a later run
#[tokio::test]
async fn test_pipeline_snapshot_merge_across_batches() {
    let fixture = TestFixture::new();
    let first = fixture.create_conllu_file("batch1/a.conllu", &[FORTUNATELY]);
    let second = fixture.create_conllu_file("batch2/b.conllu", &[FORTUNATELY]);
    let out_dir = fixture.out_dir();
    let paths = OutputPaths::in_dir(&out_dir);

    let mut runner = BatchRunner::new(quiet(), filter());
    runner.process_file(&first).await.unwrap();
    let (agg, _) = runner.finish();
    export::write_outputs(&agg, &paths).await.unwrap();

    let earlier = export::load_snapshot(&paths.snapshot).await.unwrap();
    let mut runner = BatchRunner::new(quiet(), filter());
    runner.merge(&earlier);
    runner.process_file(&second).await.unwrap();
    let (merged, _) = runner.finish();

    assert_eq!(merged.all().get("к счастью"), 2);
    assert_eq!(merged.noun_bearing().get("к счастью"), 2);

    let tsv = std::fs::read_to_string(&paths.all_tsv).unwrap();
    assert!(tsv.starts_with("construction\tfrequency\n"));
}

/// Files excluded by name marker or size never reach the aggregator
#[tokio::test]
async fn test_pipeline_selection_policy() {
    let fixture = TestFixture::new();
    fixture.create_conllu_file("small.conllu", &[FORTUNATELY]);
    fixture.create_conllu_file("sample_1m.conllu", &[YEAR]);
    fixture.create_conllu_file("big.conllu", &[YEAR, YEAR, YEAR, YEAR]);

    let small_size = std::fs::metadata(fixture.root_path.join("small.conllu")).unwrap().len();
    let candidates = discovery::collect_from_roots(&[&fixture.root_path], DiscoveryConfig::default())
        .await
        .unwrap();
    let policy = SelectionPolicy {
        skip_markers: vec!["_1m".to_string()],
        max_file_bytes: Some(small_size + 10),
    };
    let selection = discovery::select_files(candidates, &policy);

    assert_eq!(selection.selected.len(), 1);
    assert_eq!(selection.skipped.len(), 1);
    assert_eq!(selection.oversized.len(), 1);

    let mut runner = BatchRunner::new(quiet(), filter());
    runner.run(&selection.selected).await.unwrap();
    let (agg, _) = runner.finish();
    assert_eq!(agg.all().get("кстати"), 0);
}
