use harmonia_cli::cli::{run, CliError};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const Y00: f64 = 0.282_094_791_773_878_14;

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent directory should be created");
    }
    fs::write(path, content).expect("file should be written");
}

fn read_json(path: &Path) -> Value {
    let source = fs::read_to_string(path).expect("output should exist");
    serde_json::from_str(&source).expect("output should be JSON")
}

fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn run_binary(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_harmonia"))
        .args(args)
        .current_dir(workspace_root())
        .output()
        .expect("harmonia binary should run")
}

fn expect_compute_error(result: Result<i32, CliError>, expected_code: &str) {
    match result {
        Err(CliError::Compute(error)) => {
            assert_eq!(error.code(), expected_code, "{error}");
            assert_eq!(error.exit_code(), 2);
        }
        Err(other) => panic!("expected compute error {expected_code}, got {other}"),
        Ok(code) => panic!("expected compute error {expected_code}, got exit code {code}"),
    }
}

#[test]
fn project_writes_column_major_matrix() {
    let temp = TempDir::new().expect("tempdir should be created");
    let vectors = temp.path().join("vectors.json");
    let output = temp.path().join("out/matrix.json");
    write_file(
        &vectors,
        r#"[
          { "radius": 1.0, "theta": 1.5707963267948966, "phi": 1.5707963267948966 },
          { "radius": 2.0, "theta": 0.5, "phi": 0.25 }
        ]"#,
    );

    let code = run([
        "project",
        "--vectors",
        &arg(&vectors),
        "--max-degree",
        "1",
        "--output",
        &arg(&output),
    ])
    .expect("project should succeed");
    assert_eq!(code, 0);

    let parsed = read_json(&output);
    assert_eq!(parsed["maxDegree"], 1);
    assert_eq!(parsed["vectorsSize"], 2);
    assert_eq!(parsed["coefficientCount"], 4);
    assert_eq!(parsed["layout"], "column-major");
    let matrix = parsed["matrix"].as_array().expect("matrix array");
    assert_eq!(matrix.len(), 8);
    // Column 0 is the constant basis function for both vectors.
    for value in &matrix[..2] {
        assert!((value.as_f64().expect("number") - Y00).abs() <= 1.0e-12);
    }
}

#[test]
fn sample_single_basis_function_fills_points_and_quads() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output = temp.path().join("grid.json");

    let code = run([
        "sample",
        "--resolution",
        "4x2",
        "--degree",
        "0",
        "--order",
        "0",
        "--output",
        &arg(&output),
    ])
    .expect("sample should succeed");
    assert_eq!(code, 0);

    let parsed = read_json(&output);
    assert_eq!(parsed["resolution"]["x"], 4);
    assert_eq!(parsed["resolution"]["y"], 2);
    let points = parsed["points"].as_array().expect("points array");
    let indices = parsed["indices"].as_array().expect("indices array");
    assert_eq!(points.len(), 8);
    assert_eq!(indices.len(), 32);
    for point in points {
        assert!((point["value"].as_f64().expect("value") - Y00).abs() <= 1.0e-12);
    }
    assert_eq!(points[0]["theta"], 0.0);
    assert_eq!(points[0]["phi"], 0.0);
    let first_quad: Vec<u64> = indices[..4].iter().map(|v| v.as_u64().expect("index")).collect();
    assert_eq!(first_quad, vec![0, 1, 3, 2]);
}

#[test]
fn sample_expansion_with_negative_order_flag_parses() {
    let temp = TempDir::new().expect("tempdir should be created");
    let coefficients = temp.path().join("coefficients.json");
    let output = temp.path().join("grid.json");
    write_file(&coefficients, "[2.0, 0.0, 0.0, 0.0]");

    run([
        "sample",
        "--resolution",
        "3x3",
        "--coefficients",
        &arg(&coefficients),
        "--output",
        &arg(&output),
    ])
    .expect("expansion sample should succeed");
    let parsed = read_json(&output);
    for point in parsed["points"].as_array().expect("points array") {
        assert!((point["value"].as_f64().expect("value") - 2.0 * Y00).abs() <= 1.0e-12);
    }

    let single = temp.path().join("single.json");
    run([
        "sample",
        "--resolution",
        "3x3",
        "--degree",
        "1",
        "--order",
        "-1",
        "--output",
        &arg(&single),
    ])
    .expect("negative order should parse");
    assert!(single.exists());
}

#[test]
fn sample_requires_a_source() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output = temp.path().join("grid.json");

    let result = run(["sample", "--resolution", "4x2", "--output", &arg(&output)]);
    assert!(matches!(result, Err(CliError::Usage(_))));
    assert!(!output.exists());

    expect_compute_error(
        run([
            "sample",
            "--resolution",
            "4x2",
            "--degree",
            "1",
            "--order",
            "2",
            "--output",
            &arg(&output),
        ]),
        "INPUT.DEGREE_ORDER",
    );
}

#[test]
fn product_with_constant_lhs_scales_rhs() {
    let temp = TempDir::new().expect("tempdir should be created");
    let lhs = temp.path().join("lhs.json");
    let rhs = temp.path().join("rhs.json");
    let output = temp.path().join("product.json");
    write_file(&lhs, "[1.5, 0.0, 0.0, 0.0]");
    write_file(&rhs, "[0.1, 0.2, 0.3, 0.4]");

    run([
        "product",
        "--lhs",
        &arg(&lhs),
        "--rhs",
        &arg(&rhs),
        "--output",
        &arg(&output),
    ])
    .expect("product should succeed");

    let parsed = read_json(&output);
    let out = parsed.as_array().expect("coefficient array");
    let scale = 1.5 / (4.0 * std::f64::consts::PI).sqrt();
    for (value, source) in out.iter().zip([0.1, 0.2, 0.3, 0.4]) {
        assert!((value.as_f64().expect("number") - scale * source).abs() <= 1.0e-12);
    }
}

#[test]
fn product_rejects_mismatched_or_non_square_expansions() {
    let temp = TempDir::new().expect("tempdir should be created");
    let lhs = temp.path().join("lhs.json");
    let rhs = temp.path().join("rhs.json");
    let output = temp.path().join("product.json");
    write_file(&lhs, "[1.0, 0.0, 0.0, 0.0]");
    write_file(&rhs, "[1.0]");

    let args = |rhs: &Path| {
        vec![
            "product".to_string(),
            "--lhs".to_string(),
            arg(&lhs),
            "--rhs".to_string(),
            arg(rhs),
            "--output".to_string(),
            arg(&output),
        ]
    };
    expect_compute_error(run(args(&rhs)), "INPUT.COEFFICIENT_COUNT");

    write_file(&rhs, "[1.0, 2.0, 3.0]");
    expect_compute_error(run(args(&rhs)), "INPUT.COEFFICIENT_COUNT");

    write_file(&rhs, "{ \"not\": \"an array\" }");
    expect_compute_error(run(args(&rhs)), "INPUT.JSON");
    assert!(!output.exists());
}

#[test]
fn missing_input_file_is_an_io_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let missing = temp.path().join("missing.json");

    let error = run(["compare", "--lhs", &arg(&missing), "--rhs", &arg(&missing)])
        .expect_err("missing input should fail");
    assert!(matches!(error, CliError::Internal(_)));
    let diagnostic = error.as_harmonia_error();
    assert_eq!(diagnostic.exit_code(), 3);
    assert!(diagnostic.diagnostic_line().starts_with("ERROR: [IO.CLI]"));
}

#[test]
fn configuration_file_is_validated_before_dispatch() {
    let temp = TempDir::new().expect("tempdir should be created");
    let config = temp.path().join("harmonia.json");
    let lhs = temp.path().join("lhs.json");
    let output = temp.path().join("product.json");
    write_file(&lhs, "[1.0, 0.5, -0.5, 0.25]");

    write_file(&config, r#"{ "launch": { "block3d": [2, 0, 2] } }"#);
    let args = [
        "--config".to_string(),
        arg(&config),
        "product".to_string(),
        "--lhs".to_string(),
        arg(&lhs),
        "--rhs".to_string(),
        arg(&lhs),
        "--output".to_string(),
        arg(&output),
    ];
    expect_compute_error(run(args.clone()), "INPUT.CONFIG");

    write_file(&config, r#"{ "launch": { "block3d": [3, 2, 5] } }"#);
    assert_eq!(run(args).expect("valid config should run"), 0);
    assert_eq!(read_json(&output).as_array().expect("array").len(), 4);
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let error = run(["rotate"]).expect_err("unknown command should fail");
    assert!(matches!(error, CliError::Usage(_)));
    assert_eq!(error.as_harmonia_error().code(), "INPUT.CLI_USAGE");
    assert_eq!(run(["--help"]).expect("help should succeed"), 0);
}

#[test]
fn evaluate_prints_the_basis_value() {
    let output = run_binary(&[
        "evaluate",
        "--degree",
        "0",
        "--order",
        "0",
        "--theta",
        "1.5707963267948966",
        "--phi",
        "1.5707963267948966",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: f64 = String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .expect("stdout should be a number");
    assert!((value - Y00).abs() <= 1.0e-12);
}

#[test]
fn evaluate_rejects_order_above_degree_with_exit_code() {
    let output = run_binary(&[
        "evaluate", "--degree", "1", "--order", "-2", "--theta", "0", "--phi", "0",
    ]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: [INPUT.DEGREE_ORDER]"), "stderr: {stderr}");
    assert!(stderr.contains("FATAL EXIT CODE: 2"), "stderr: {stderr}");
}

#[test]
fn degrees_past_the_coefficient_range_are_rejected() {
    let temp = TempDir::new().expect("tempdir should be created");
    let vectors = temp.path().join("vectors.json");
    let output = temp.path().join("matrix.json");
    write_file(&vectors, r#"[{ "radius": 1.0, "theta": 0.0, "phi": 0.0 }]"#);

    expect_compute_error(
        run([
            "project",
            "--vectors",
            &arg(&vectors),
            "--max-degree",
            "65535",
            "--output",
            &arg(&output),
        ]),
        "INPUT.DEGREE_ORDER",
    );
    assert!(!output.exists());

    expect_compute_error(
        run(["verify", "--max-degree", "4294967295"]),
        "INPUT.DEGREE_ORDER",
    );

    let output = run_binary(&[
        "evaluate",
        "--degree",
        "4294967295",
        "--order",
        "0",
        "--theta",
        "0",
        "--phi",
        "0",
    ]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: [INPUT.DEGREE_ORDER]"), "stderr: {stderr}");
    assert!(!stderr.contains("panicked"), "stderr: {stderr}");
}

#[test]
fn compare_prints_euclidean_distance() {
    let temp = TempDir::new().expect("tempdir should be created");
    let lhs = temp.path().join("lhs.json");
    let rhs = temp.path().join("rhs.json");
    write_file(&lhs, "[3.0, 4.0, 0.0, 0.0]");
    write_file(&rhs, "[0.0, 0.0, 0.0, 0.0]");

    let output = run_binary(&["compare", "--lhs", &arg(&lhs), "--rhs", &arg(&rhs)]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "5");
}

#[test]
fn verify_passes_with_the_workspace_policy() {
    let policy = workspace_root().join("tasks/numeric-tolerance-policy.json");
    let output = run_binary(&[
        "verify",
        "--max-degree",
        "3",
        "--resolution",
        "8x4",
        "--policy",
        &arg(&policy),
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stdout: {stdout} stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    for engine in ["projection", "sampling", "coupling"] {
        assert!(stdout.contains(&format!("{engine}: cases=")), "stdout: {stdout}");
    }
    assert!(stdout.contains("Verification status: PASS"));
}

#[test]
fn verify_requires_every_engine_category() {
    let temp = TempDir::new().expect("tempdir should be created");
    let policy = temp.path().join("policy.json");
    write_file(
        &policy,
        r#"{
          "policyVersion": "1.0.0",
          "defaultMode": "abs_or_rel",
          "categories": [
            { "id": "projection", "mode": "abs_or_rel",
              "tolerance": { "absTol": 1e-12, "relTol": 1e-10, "relativeFloor": 1e-12 } }
          ]
        }"#,
    );

    expect_compute_error(
        run(["verify", "--max-degree", "1", "--policy", &arg(&policy)]),
        "INPUT.POLICY_CATEGORY",
    );
}
