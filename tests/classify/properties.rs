use crate::common::{cpu_sheet, fan_sheet, xlsx, ZipBuilder};
use dwdm_monitor::classify::{
    classify_bytes, classify_bytes_with_sink, Classifier, ClassifierConfig, ClassifyError,
    CollectingSink,
};
use dwdm_monitor::core::{Cell, ReportContent, ReportKind};
use dwdm_monitor::MonitorError;

fn classify(bytes: &[u8]) -> dwdm_monitor::ClassificationResult {
    classify_bytes(bytes, &ClassifierConfig::default()).expect("valid archive")
}

#[test]
fn first_match_wins_across_nesting() {
    let nested = ZipBuilder::new()
        .file("cpu_nested.xlsx", xlsx(&["Board"], &[&["NESTED"]]))
        .build();
    let archive = ZipBuilder::new()
        .file("inner.zip", nested.clone())
        .file("cpu_top.xlsx", cpu_sheet())
        .build();
    let result = classify(&archive);
    let cpu = result.get(ReportKind::Cpu).unwrap();
    assert_eq!(cpu.source, "cpu_nested.xlsx");
    assert_eq!(cpu.containers, vec!["inner.zip".to_string()]);
    assert_eq!(cpu.depth(), 1);
    assert_eq!(cpu.display_path(), "inner.zip!cpu_nested.xlsx");

    // Same members, top-level file first.
    let archive = ZipBuilder::new()
        .file("cpu_top.xlsx", cpu_sheet())
        .file("inner.zip", nested)
        .build();
    let result = classify(&archive);
    assert_eq!(result.get(ReportKind::Cpu).unwrap().source, "cpu_top.xlsx");
}

#[test]
fn session_log_beats_other_keywords() {
    let archive = ZipBuilder::new()
        .file("ClientBoard_sessionlog.txt", "session start\n")
        .build();
    let result = classify(&archive);
    assert!(result.is_present(ReportKind::Wason));
    assert!(!result.is_present(ReportKind::Client));
    assert_eq!(
        result.get(ReportKind::Wason).unwrap().content.as_text(),
        Some("session start\n")
    );
}

#[test]
fn line_requires_a_spreadsheet() {
    let archive = ZipBuilder::new()
        .file("line_board_summary.csv", "a,b\n1,2\n")
        .file("line.txt", "not a sheet\n")
        .build();
    let result = classify(&archive);
    assert!(result.is_empty());

    let archive = ZipBuilder::new()
        .file("Line Board.xlsx", xlsx(&["Board"], &[&["L1"]]))
        .build();
    assert!(classify(&archive).is_present(ReportKind::Line));
}

#[test]
fn corrupt_nested_container_is_skipped() {
    let archive = ZipBuilder::new()
        .file("broken.zip", b"PK\x03\x04 this is not really a zip".to_vec())
        .file("CPU_Report.xlsx", cpu_sheet())
        .build();
    let mut sink = CollectingSink::new();
    let result =
        classify_bytes_with_sink(&archive, &ClassifierConfig::default(), &mut sink).unwrap();

    assert!(result.is_present(ReportKind::Cpu));
    assert_eq!(sink.len(), 1);
    assert!(matches!(
        &sink.diagnostics[0].error,
        ClassifyError::NestedContainer { entry, .. } if entry == "broken.zip"
    ));
    assert!(sink.diagnostics[0].error.is_recoverable());
}

#[test]
fn directories_and_unsupported_entries_are_inert() {
    let plain = ZipBuilder::new()
        .file("cpu.xlsx", cpu_sheet())
        .file("fan.xlsx", fan_sheet())
        .build();
    let noisy = ZipBuilder::new()
        .dir("reports/")
        .file("cpu.xlsx", cpu_sheet())
        .file("cpu_notes.csv", "cpu,notes\n")
        .dir("reports/fan/")
        .file("fan.pdf", b"%PDF-1.4".to_vec())
        .file("fan.xlsx", fan_sheet())
        .build();

    let mut sink = CollectingSink::new();
    let noisy_result =
        classify_bytes_with_sink(&noisy, &ClassifierConfig::default(), &mut sink).unwrap();
    assert_eq!(noisy_result, classify(&plain));
    assert!(sink.is_empty());
}

#[test]
fn non_container_input_fails() {
    let err = classify_bytes(b"plain text, no archive here", &ClassifierConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        MonitorError::Classify(ClassifyError::ContainerFormat(_))
    ));

    let err = Classifier::default().classify(&[]).unwrap_err();
    assert!(!err.is_recoverable());
}

#[test]
fn parse_failure_leaves_kind_open() {
    let archive = ZipBuilder::new()
        .file("cpu_corrupt.xlsx", b"garbage instead of a workbook".to_vec())
        .file("cpu_good.xlsx", cpu_sheet())
        .build();
    let mut sink = CollectingSink::new();
    let result =
        classify_bytes_with_sink(&archive, &ClassifierConfig::default(), &mut sink).unwrap();

    assert_eq!(result.get(ReportKind::Cpu).unwrap().source, "cpu_good.xlsx");
    assert!(matches!(
        &sink.diagnostics[0].error,
        ClassifyError::Parse { entry, kind: ReportKind::Cpu, .. } if entry == "cpu_corrupt.xlsx"
    ));
}

#[test]
fn spreadsheet_rows_are_typed() {
    let archive = ZipBuilder::new().file("cpu.xlsx", cpu_sheet()).build();
    let result = classify(&archive);
    let table = result
        .get(ReportKind::Cpu)
        .and_then(|r| r.content.as_table())
        .unwrap();
    assert_eq!(
        table.headers,
        vec!["NE Name", "Board", "CPU Usage(%)", "Max threshold"]
    );
    assert_eq!(table.len(), 3);
    assert_eq!(table.cell(1, "board"), Some(&Cell::Text("LINE-1".into())));
    assert_eq!(table.cell(1, "CPU Usage(%)").and_then(Cell::as_f64), Some(92.0));
}

#[test]
fn text_decoding_replaces_malformed_bytes() {
    let archive = ZipBuilder::new()
        .file("wason.txt", b"caf\xe9 ok\n".to_vec())
        .build();

    let result = classify(&archive);
    match &result.get(ReportKind::Wason).unwrap().content {
        ReportContent::Text(text) => assert_eq!(text, "caf\u{fffd} ok\n"),
        other => panic!("expected text, got {:?}", other),
    }

    let config = ClassifierConfig {
        text_encoding: "windows-1252".into(),
        ..ClassifierConfig::default()
    };
    let result = classify_bytes(&archive, &config).unwrap();
    assert_eq!(
        result.get(ReportKind::Wason).unwrap().content.as_text(),
        Some("café ok\n")
    );
}

#[test]
fn unknown_encoding_is_a_config_error() {
    let config = ClassifierConfig {
        text_encoding: "klingon-8".into(),
        ..ClassifierConfig::default()
    };
    assert!(matches!(
        Classifier::new(config),
        Err(MonitorError::InvalidConfig(_))
    ));
}
