use crate::common::{cpu_sheet, fan_sheet, ZipBuilder};
use dwdm_monitor::classify::{
    classify_bytes_with_sink, Classifier, ClassifierConfig, ClassifyError, CollectingSink,
    LoadError, Loader, LoaderRegistry, NullSink,
};
use dwdm_monitor::core::{ReportContent, ReportKind};

#[test]
fn nesting_beyond_max_depth_is_reported() {
    let deepest = ZipBuilder::new().file("cpu.xlsx", cpu_sheet()).build();
    let middle = ZipBuilder::new()
        .file("fan.xlsx", fan_sheet())
        .file("deeper.zip", deepest)
        .build();
    let archive = ZipBuilder::new().file("outer.zip", middle).build();

    let config = ClassifierConfig {
        max_depth: 1,
        ..ClassifierConfig::default()
    };
    let mut sink = CollectingSink::new();
    let result = classify_bytes_with_sink(&archive, &config, &mut sink).unwrap();

    assert!(result.is_present(ReportKind::Fan));
    assert!(!result.is_present(ReportKind::Cpu));
    assert_eq!(sink.len(), 1);
    let diagnostic = &sink.diagnostics[0];
    assert_eq!(diagnostic.containers, vec!["outer.zip".to_string()]);
    assert!(matches!(
        &diagnostic.error,
        ClassifyError::DepthExceeded { entry, max_depth: 1 } if entry == "deeper.zip"
    ));
}

#[test]
fn default_depth_allows_moderate_nesting() {
    let mut archive = ZipBuilder::new().file("cpu.xlsx", cpu_sheet()).build();
    for level in 0..5 {
        archive = ZipBuilder::new()
            .file(&format!("level{}.zip", level), archive)
            .build();
    }
    let result = classify_bytes_with_sink(&archive, &ClassifierConfig::default(), &mut NullSink)
        .unwrap();
    assert_eq!(result.get(ReportKind::Cpu).unwrap().depth(), 5);
}

#[test]
fn oversized_entries_are_skipped() {
    let archive = ZipBuilder::new()
        .file("wason_big.txt", vec![b'a'; 4096])
        .file("wason_small.txt", "ok\n")
        .build();
    let config = ClassifierConfig {
        max_entry_size: 1024,
        ..ClassifierConfig::default()
    };
    let mut sink = CollectingSink::new();
    let result = classify_bytes_with_sink(&archive, &config, &mut sink).unwrap();

    assert_eq!(
        result.get(ReportKind::Wason).unwrap().source,
        "wason_small.txt"
    );
    assert!(matches!(
        &sink.diagnostics[0].error,
        ClassifyError::Parse {
            source: LoadError::TooLarge { limit: 1024, .. },
            ..
        }
    ));
}

struct CsvLineCount;

impl Loader for CsvLineCount {
    fn load(&self, bytes: &[u8]) -> Result<ReportContent, LoadError> {
        Ok(ReportContent::Text(format!("{} lines", bytes.split(|b| *b == b'\n').count())))
    }
}

#[test]
fn custom_registry_extends_supported_extensions() {
    let mut registry = LoaderRegistry::default();
    registry.register("CSV", CsvLineCount);
    let classifier = Classifier::with_registry(ClassifierConfig::default(), registry);

    let archive = ZipBuilder::new()
        .file("osc_optical.csv", "a\nb\nc")
        .build();
    let result = classifier.classify(&archive).unwrap();
    assert_eq!(
        result.get(ReportKind::Osc).unwrap().content.as_text(),
        Some("3 lines")
    );
}

#[test]
fn empty_registry_classifies_nothing() {
    let classifier =
        Classifier::with_registry(ClassifierConfig::default(), LoaderRegistry::empty());
    let result = classifier
        .classify(&ZipBuilder::new().file("cpu.xlsx", cpu_sheet()).build())
        .unwrap();
    assert!(result.is_empty());
}
