use std::fs;
use std::path::Path;

use show_critiques::ingest::ingest_to_path;
use show_critiques::source::{sqlite, DirectorySource, MemorySource, SqliteSource};
use show_critiques::{CritiqueStore, IngestReport, Ingestor};
use tempfile::tempdir;

const END: &str = "Please note that all reports and articles are the copyright of the publisher.";

fn golden_report(body: &str) -> String {
    format!("RETRIEVER GOLDEN\n{}\n{}", body, END)
}

fn copy_fixture(dir: &Path, fixture: &str, as_name: &str) {
    let text = fs::read_to_string(format!("tests/fixtures/{}", fixture)).unwrap();
    fs::write(dir.join(as_name), text).unwrap();
}

fn assert_invariants(store: &CritiqueStore) {
    for dog in store.dogs() {
        let entries = store.entries(dog);
        let mut texts: Vec<_> = entries.iter().map(|e| e.critique.as_str()).collect();
        texts.sort();
        texts.dedup();
        assert_eq!(texts.len(), entries.len(), "duplicate critique for {}", dog);

        let mut seen_unknown = false;
        for pair in entries.windows(2) {
            match (pair[0].year, pair[1].year) {
                (Some(a), Some(b)) => assert!(a >= b, "{} not newest-first", dog),
                (None, Some(_)) => panic!("{}: unknown year before known year", dog),
                _ => {}
            }
        }
        for e in entries {
            if e.year.is_none() {
                seen_unknown = true;
            } else {
                assert!(!seen_unknown);
            }
        }
    }
}

#[test]
fn two_dogs_from_one_class() {
    let source = MemorySource::new().with(
        "Crufts_2023.txt",
        golden_report("PJ (2,0)\n1st Smith's Goldie, a lovely bitch. 2nd Jones's Star, steady mover."),
    );
    let (store, report) = Ingestor::default().run(CritiqueStore::new(), &source).unwrap();

    assert_eq!(report.entries, 2);
    let goldie = store.entries("Goldie");
    assert_eq!(goldie.len(), 1);
    assert_eq!(goldie[0].critique, "1st Smith's Goldie, a lovely bitch.");
    assert_eq!(goldie[0].class, "PJ");
    let star = store.entries("Star");
    assert_eq!(star.len(), 1);
    assert_eq!(star[0].critique, "2nd Jones's Star, steady mover.");
    assert_eq!(star[0].class, "PJ");
}

#[test]
fn reingesting_same_document_is_noop() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("critiques.json");
    let reports = dir.path().join("reports");
    fs::create_dir(&reports).unwrap();
    fs::write(
        reports.join("Crufts_2023.txt"),
        golden_report("PJ (2,0)\n1st Smith's Goldie, a lovely bitch. 2nd Jones's Star, steady mover."),
    )
    .unwrap();

    let ingestor = Ingestor::default();
    let source = DirectorySource::new(&reports);
    ingest_to_path(&ingestor, &store_path, &source).unwrap();
    let first = fs::read_to_string(&store_path).unwrap();

    let report = ingest_to_path(&ingestor, &store_path, &source).unwrap();
    let second = fs::read_to_string(&store_path).unwrap();

    assert_eq!(report.already_processed, 1);
    assert_eq!(report.extracted, 0);
    assert_eq!(first, second);
    let store = CritiqueStore::load(&store_path).unwrap();
    assert_eq!(store.entries("Goldie").len(), 1);
}

#[test]
fn same_critique_under_new_source_not_duplicated() {
    let text = golden_report("PJ (1,0)\n1st Smith's Goldie, a lovely bitch.");
    let ingestor = Ingestor::default();
    let (store, _) = ingestor
        .run(CritiqueStore::new(), &MemorySource::new().with("a_2023.txt", text.clone()))
        .unwrap();
    let (store, _) = ingestor
        .run(store, &MemorySource::new().with("copy_of_a_2023.txt", text))
        .unwrap();
    assert_eq!(store.entries("Goldie").len(), 1);
    assert_eq!(store.entries("Goldie")[0].source, "a_2023.txt");
}

#[test]
fn missing_end_marker_contributes_nothing() {
    let text = fs::read_to_string("tests/fixtures/no_end_marker.txt").unwrap();
    let source = MemorySource::new().with("Windsor_2022.txt", text);
    let (store, report) = Ingestor::default().run(CritiqueStore::new(), &source).unwrap();
    assert_eq!(report.not_extractable, 1);
    assert_eq!(report.entries, 0);
    assert!(store.is_empty());
}

#[test]
fn end_before_start_contributes_nothing() {
    let text = format!("{}\nRETRIEVER GOLDEN\nPJ (1,0)\n1st Smith's Goldie, a lovely bitch.", END);
    let source = MemorySource::new().with("x_2022.txt", text);
    let (store, report) = Ingestor::default().run(CritiqueStore::new(), &source).unwrap();
    assert_eq!(report.not_extractable, 1);
    assert!(store.is_empty());
}

#[test]
fn later_year_first() {
    let source = MemorySource::new()
        .with("Bath_2019.txt", golden_report("PJ (1,0)\n1st Smith's Goldie, a lovely bitch."))
        .with("Bath_2022.txt", golden_report("OB (1,0)\n1st Smith's Goldie, matured beautifully."));
    let (store, _) = Ingestor::default().run(CritiqueStore::new(), &source).unwrap();

    let goldie = store.entries("Goldie");
    assert_eq!(goldie.len(), 2);
    assert_eq!(goldie[0].year, Some(2022));
    assert_eq!(goldie[0].class, "OB");
    assert_eq!(goldie[1].year, Some(2019));
}

#[test]
fn incremental_directory_runs() {
    let dir = tempdir().unwrap();
    let reports = dir.path().join("golden-critiques");
    fs::create_dir(&reports).unwrap();
    let store_path = reports.join("golden_critiques_by_dog.json");
    copy_fixture(&reports, "paignton_2019.txt", "Paignton_2019.txt");

    let ingestor = Ingestor::default();
    let source = DirectorySource::new(&reports);
    let first: IngestReport = ingest_to_path(&ingestor, &store_path, &source).unwrap();
    assert_eq!(first.extracted, 1);
    assert_eq!(first.available, 1, "the store file itself is not a report");

    copy_fixture(&reports, "bath_2021.txt", "Bath_2021.txt");
    copy_fixture(&reports, "no_end_marker.txt", "Windsor_2022.txt");
    let second = ingest_to_path(&ingestor, &store_path, &source).unwrap();
    assert_eq!(second.available, 3);
    assert_eq!(second.already_processed, 1);
    assert_eq!(second.extracted, 1);
    assert_eq!(second.not_extractable, 1);

    let store = CritiqueStore::load(&store_path).unwrap();
    assert_invariants(&store);

    let breeze = store.entries("Sh Ch Goldenglow Summer Breeze");
    assert_eq!(breeze.len(), 2);
    assert_eq!(breeze[0].year, Some(2021));
    assert_eq!(breeze[0].show, "Bath");
    assert_eq!(breeze[1].year, Some(2019));
    assert!(breeze[0].critique.starts_with("1st Walker's Sh Ch Goldenglow Summer Breeze, now 10"));

    assert_eq!(store.entries("Sunmaze Oscar").len(), 1);
    assert!(store.entries("Absent").is_empty());

    let sources = store.processed_sources();
    assert!(sources.contains("Paignton_2019.txt"));
    assert!(sources.contains("Bath_2021.txt"));
    assert!(!sources.contains("Windsor_2022.txt"));
}

#[test]
fn unknown_years_sort_last() {
    let source = MemorySource::new()
        .with("undated.txt", golden_report("PJ (1,0)\n1st Smith's Goldie, undated critique."))
        .with("Show_2020.txt", golden_report("PJ (1,0)\n1st Smith's Goldie, dated critique."));
    let (store, _) = Ingestor::default().run(CritiqueStore::new(), &source).unwrap();
    let goldie = store.entries("Goldie");
    assert_eq!(goldie[0].year, Some(2020));
    assert_eq!(goldie[1].year, None);
    assert_invariants(&store);
}

#[test]
fn sqlite_source_end_to_end() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("reports.sqlite");
    let source = SqliteSource::open(&db_path).unwrap();
    sqlite::insert_reports(
        source.connection(),
        &[(
            "Crufts_2023.txt".to_string(),
            golden_report("PJ (2,0)\n1st Smith's Goldie, a lovely bitch. 2nd Jones's Star, steady mover."),
        )],
    )
    .unwrap();

    let store_path = dir.path().join("critiques.json");
    let report = ingest_to_path(&Ingestor::default(), &store_path, &source).unwrap();
    assert_eq!(report.entries, 2);
    let again = ingest_to_path(&Ingestor::default(), &store_path, &source).unwrap();
    assert_eq!(again.already_processed, 1);
    assert_eq!(CritiqueStore::load(&store_path).unwrap().entry_count(), 2);
}

#[test]
fn failed_batch_leaves_store_untouched() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("critiques.json");
    let source = MemorySource::new().with("a_2020.txt", golden_report("PJ (1,0)\n1st A's Goldie, fine."));
    ingest_to_path(&Ingestor::default(), &store_path, &source).unwrap();
    let before = fs::read_to_string(&store_path).unwrap();

    let missing = DirectorySource::new(dir.path().join("does-not-exist"));
    assert!(ingest_to_path(&Ingestor::default(), &store_path, &missing).is_err());
    assert_eq!(fs::read_to_string(&store_path).unwrap(), before);
}
