use std::{fs, path::PathBuf};

use tempfile::tempdir;

use facsimile_cli::{Args, CliError};
use facsimile_core::{Diagram, DiagramError, DiagramFile, Id};

/// Collects all .toml diagrams from a directory
fn collect_diagrams(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Reads a `# key: value` header line of a demo diagram.
fn header(path: &PathBuf, key: &str) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let prefix = format!("# {key}:");
    content
        .lines()
        .find_map(|line| line.strip_prefix(&prefix))
        .map(|value| value.trim().to_string())
}

fn args(input: &PathBuf, output: &PathBuf, select: &[&str]) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        select: select.iter().map(|s| s.to_string()).collect(),
        target: None,
        at: "0,0".to_string(),
        config: None,
        log_level: "off".to_string(),
    }
}

fn demo_args(example_path: &PathBuf, output_path: &PathBuf) -> Args {
    let select = header(example_path, "select").unwrap_or_default();
    let mut args = args(example_path, output_path, &[]);
    args.select = select.split(',').map(str::to_string).collect();
    if let Some(at) = header(example_path, "at") {
        args.at = at;
    }
    args
}

fn read_diagram(path: &PathBuf) -> Diagram {
    let content = fs::read_to_string(path).expect("Failed to read output");
    let file: DiagramFile = toml::from_str(&content).expect("Output is not a diagram file");
    Diagram::from_file(file).expect("Output diagram is inconsistent")
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let demos = collect_diagrams(PathBuf::from("demos"));

    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed = Vec::new();

    for demo_path in &demos {
        let output_path = temp_dir
            .path()
            .join(demo_path.file_name().unwrap().to_string_lossy().to_string());

        let args = demo_args(demo_path, &output_path);
        if let Err(e) = facsimile_cli::run(&args) {
            failed.push((demo_path.clone(), e));
            continue;
        }

        let input = read_diagram(demo_path);
        let output = read_diagram(&output_path);
        assert!(
            output.len() > input.len(),
            "{} pasted nothing",
            demo_path.display()
        );
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_diagrams(PathBuf::from("demos/errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_path = temp_dir.path().join(format!(
            "error_{}",
            demo_path.file_name().unwrap().to_string_lossy()
        ));

        if facsimile_cli::run(&demo_args(demo_path, &output_path)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_paste_into_target() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = PathBuf::from("demos/process.toml");
    let output = temp_dir.path().join("pasted.toml");

    let mut args = args(&input, &output, &["submit", "approve"]);
    args.target = Some("lane".to_string());
    args.at = "300,400".to_string();

    facsimile_cli::run(&args).expect("Paste failed");

    let before = read_diagram(&input);
    let after = read_diagram(&output);
    // submit, approve, deadline, flow and flow_label
    assert_eq!(after.len(), before.len() + 5);

    let lane = after.element(Id::new("lane")).unwrap();
    let pasted: Vec<_> = lane
        .children()
        .iter()
        .filter(|id| !before.contains(**id))
        .collect();
    assert_eq!(pasted.len(), 5);

    let connection = after
        .iter()
        .find(|element| element.is_connection() && !before.contains(element.id()))
        .expect("Connection was not pasted");
    assert!(!before.contains(connection.source().unwrap()));
    assert!(!before.contains(connection.target().unwrap()));
}

#[test]
fn e2e_nothing_to_copy_writes_input_unchanged() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = PathBuf::from("demos/process.toml");
    let output = temp_dir.path().join("unchanged.toml");

    // a connection without its endpoints cannot be copied
    facsimile_cli::run(&args(&input, &output, &["flow"])).expect("Run failed");

    let before = read_diagram(&input);
    let after = read_diagram(&output);
    assert_eq!(after.to_file(), before.to_file());
}

#[test]
fn e2e_invalid_point() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = PathBuf::from("demos/process.toml");
    let output = temp_dir.path().join("never.toml");

    let mut args = args(&input, &output, &["submit"]);
    args.at = "left".to_string();

    let err = facsimile_cli::run(&args).unwrap_err();

    assert!(matches!(err, CliError::Argument(_)));
    assert!(!output.exists());
}

#[test]
fn e2e_malformed_diagram_reports_location() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = PathBuf::from("demos/errors/malformed.toml");
    let output = temp_dir.path().join("never.toml");

    let err = facsimile_cli::run(&args(&input, &output, &["task"])).unwrap_err();

    assert!(matches!(err, CliError::Format { .. }));
}

#[test]
fn e2e_parent_cycle_is_rejected() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = PathBuf::from("demos/errors/parent_cycle.toml");
    let output = temp_dir.path().join("never.toml");

    let err = facsimile_cli::run(&args(&input, &output, &["lane"])).unwrap_err();

    assert!(matches!(
        err,
        CliError::Diagram(DiagramError::ParentCycle(_))
    ));
    assert!(!output.exists());
}
