use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

const ANALYSIS_JSON: &str = r#"{
  "project_description": "Two-storey warehouse on a 3 acre parcel",
  "analysis": {
    "summary": "Runoff and excavation are the dominant site risks.",
    "insights": ["Silt fence is missing along the north boundary"],
    "records": []
  },
  "recommendations": [
    {
      "title": "Install silt fence",
      "description": "Place silt fence along the north boundary before grading.",
      "category": "environmental",
      "citation": "EPA CGP 2.2.3"
    }
  ]
}"#;

/// Workspace with a config, an analysis file and two uploaded sources.
fn create_workspace() -> TempDir {
    let dir = tempdir().expect("Creating temp workspace failed");
    let root = dir.path();
    fs::create_dir_all(root.join("sources")).unwrap();
    write(root.join("sources/survey.pdf"), b"%PDF-1.4 survey").unwrap();
    write(root.join("sources/permit.txt"), b"permit text").unwrap();
    write(root.join("analysis.json"), ANALYSIS_JSON).unwrap();
    write(
        root.join("config.yaml"),
        format!(
            "source_dir: {}\noutput_dir: {}\nbundle:\n  transfer_delay_ms: 100\n",
            root.join("sources").display(),
            root.join("out").display()
        ),
    )
    .unwrap();
    dir
}

fn archives_in(dir: &Path) -> Vec<std::path::PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            let name = p.file_name().unwrap().to_string_lossy().to_string();
            name.starts_with("session_") && name.ends_with(".zip")
        })
        .collect()
}

#[test]
fn types_lists_the_catalog() {
    let mut cmd = Command::cargo_bin("doc-bundle").expect("Binary exists");
    cmd.arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("swppp").and(predicate::str::contains("jsa")));
}

#[test]
fn types_filtered_by_priority_excludes_other_classes() {
    let mut cmd = Command::cargo_bin("doc-bundle").expect("Binary exists");
    cmd.args(["types", "--priority", "low"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\thigh\t").not());
}

#[test]
fn templates_lists_all_templates() {
    let mut cmd = Command::cargo_bin("doc-bundle").expect("Binary exists");
    cmd.arg("templates").assert().success().stdout(
        predicate::str::contains("report")
            .and(predicate::str::contains("summary"))
            .and(predicate::str::contains("analysis"))
            .and(predicate::str::contains("recommendations")),
    );
}

#[test]
fn generate_writes_a_session_archive() {
    let workspace = create_workspace();
    let root = workspace.path();

    let mut cmd = Command::cargo_bin("doc-bundle").expect("Binary exists");
    cmd.arg("generate")
        .arg("--config")
        .arg(root.join("config.yaml"))
        .arg("--analysis")
        .arg(root.join("analysis.json"))
        .args(["--types", "swppp,jsa"])
        .args(["--title", "Site Plan"])
        .args(["--source", "survey.pdf"])
        .arg("--include-recommendations")
        .args(["--format", "md"])
        .arg("--zip");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Site Plan - Job Safety Analysis"));

    let archives = archives_in(&root.join("out"));
    assert_eq!(archives.len(), 1, "expected one archive, found {archives:?}");
    let file = fs::File::open(&archives[0]).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    assert_eq!(zip.len(), 2);
    assert!(zip
        .by_name("Site_Plan_Stormwater_Pollution_Prevention_Plan.md")
        .is_ok());
}

#[test]
fn generate_with_unknown_source_fails() {
    let workspace = create_workspace();
    let root = workspace.path();

    let mut cmd = Command::cargo_bin("doc-bundle").expect("Binary exists");
    cmd.arg("generate")
        .arg("--config")
        .arg(root.join("config.yaml"))
        .arg("--analysis")
        .arg(root.join("analysis.json"))
        .args(["--types", "swppp"])
        .args(["--source", "missing.pdf"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing.pdf"));
    assert!(!root.join("out").exists());
}

#[test]
fn bundle_individual_copies_files_into_output_dir() {
    let workspace = create_workspace();
    let root = workspace.path();

    let mut cmd = Command::cargo_bin("doc-bundle").expect("Binary exists");
    cmd.arg("bundle")
        .arg("--config")
        .arg(root.join("config.yaml"))
        .args(["--files", "permit.txt,survey.pdf"])
        .args(["--mode", "individual"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"individual\""));
    assert_eq!(
        fs::read(root.join("out/permit.txt")).unwrap(),
        b"permit text"
    );
    assert!(root.join("out/survey.pdf").exists());
}

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use doc_bundle::cli::{run, Cli, Commands};

    // A missing config path still logs the startup event before failing.
    let cli = Cli {
        command: Commands::Bundle {
            config: std::path::PathBuf::from("dummy.yaml"),
            files: vec!["a.pdf".to_string()],
            mode: doc_bundle_core::model::DeliveryMode::Zip,
        },
    };

    let result = run(cli).await;
    assert!(result.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
