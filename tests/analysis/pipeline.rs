use crate::common::{site1_zip, xlsx};
use dwdm_monitor::analysis::{build_analyzers, run_analyzers, ThresholdSpec, FINDING_COLUMN};
use dwdm_monitor::classify::{classify_bytes, ClassifierConfig};
use dwdm_monitor::core::{Cell, ReportKind};
use dwdm_monitor::report::{Section, SummaryReport, CLEAN_MESSAGE};
use std::path::Path;
use tempfile::TempDir;

fn write_reference(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("cpu_limits.xlsx");
    let bytes = xlsx(
        &["NE Name", "Board", "Max usage"],
        &[
            &["NE-1", "SCC", "80"],
            &["NE-1", "LINE-1", "85"],
            &["NE-2", "SCC", "80"],
        ],
    );
    std::fs::write(&path, bytes).unwrap();
    path
}

fn specs(reference: &Path) -> Vec<ThresholdSpec> {
    serde_json::from_value(serde_json::json!([
        {
            "name": "CPU",
            "kind": "cpu",
            "checks": [{"column": "CPU Usage(%)", "max": "Max usage"}],
            "reference": {"path": reference, "join_on": ["NE Name", "Board"]}
        },
        {
            "name": "FAN",
            "kind": "fan",
            "checks": [{"column": "Value of Fan Rotate Speed(Rps)", "min": 20, "max": 60}]
        },
        {
            "name": "MSU",
            "kind": "msu",
            "checks": [{"column": "Temperature", "max": 65}]
        }
    ]))
    .unwrap()
}

#[test]
fn reference_workbook_limits_flag_site1_cpu_row() {
    let dir = TempDir::new().unwrap();
    let specs = specs(&write_reference(dir.path()));
    let analyzers = build_analyzers(&specs).unwrap();

    let result = classify_bytes(&site1_zip(), &ClassifierConfig::default()).unwrap();
    let run = run_analyzers(&analyzers, &result);

    assert_eq!(run.outcomes.len(), 2);
    let cpu = &run.outcomes[0];
    assert_eq!(cpu.analyzer, "CPU");
    assert_eq!(cpu.kind, ReportKind::Cpu);
    assert_eq!(cpu.sources, vec!["CPU_Report.xlsx".to_string()]);
    assert_eq!(cpu.total_rows, 3);
    assert_eq!(cpu.flagged.len(), 1);

    let row = &cpu.flagged.rows[0];
    assert_eq!(row[0], Cell::Text("NE-1".into()));
    assert_eq!(row[1], Cell::Text("LINE-1".into()));
    assert_eq!(row[2].as_f64(), Some(92.0));
    assert_eq!(cpu.flagged.headers.last().unwrap(), FINDING_COLUMN);
    assert_eq!(
        row.last().unwrap().to_string(),
        "CPU Usage(%) 92 above maximum 85"
    );

    let fan = &run.outcomes[1];
    assert!(fan.is_clean());
    assert_eq!(fan.total_rows, 2);

    assert_eq!(run.skipped.len(), 1);
    assert_eq!(run.skipped[0].0, "MSU");
}

#[test]
fn summary_report_renders_site1_findings() {
    let dir = TempDir::new().unwrap();
    let specs = specs(&write_reference(dir.path()));
    let analyzers = build_analyzers(&specs).unwrap();
    let result = classify_bytes(&site1_zip(), &ClassifierConfig::default()).unwrap();

    let order: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
    let report = SummaryReport::from_run(
        run_analyzers(&analyzers, &result),
        &order,
        vec!["site1.zip".into()],
    );

    let names: Vec<&str> = report.sections.iter().map(Section::analyzer).collect();
    assert_eq!(names, vec!["CPU", "FAN", "MSU"]);
    assert_eq!(report.flagged_rows(), 1);

    let text = report.render_text();
    assert!(text.contains("Archives: site1.zip"));
    assert!(text.contains("1 of 3 rows flagged"));
    let flagged_line = text
        .lines()
        .find(|l| l.contains("LINE-1"))
        .expect("flagged row rendered");
    assert!(flagged_line.starts_with("NE-1"));
    assert!(flagged_line.contains("92"));
    assert!(flagged_line.ends_with("CPU Usage(%) 92 above maximum 85"));
    assert!(text.contains(CLEAN_MESSAGE));
    assert!(text.contains("Skipped: no qualifying MSU file was found"));
    assert!(!text.contains("SCC"));
}
