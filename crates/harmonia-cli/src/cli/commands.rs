use super::CliError;
use super::helpers::*;
use harmonia_core::domain::{HarmoniaError, Resolution, SamplePoint, SphericalVector};
use harmonia_core::engines::{
    calculate_matrix, coupling_coefficient, matrix_index, product, sample, sample_sum,
};
use harmonia_core::launch::BlockSizes;
use harmonia_core::numerics::special::{
    coefficient_count, coefficient_lm, compare, evaluate, evaluate_index, evaluate_sum,
};
use harmonia_core::numerics::{
    compare_with_policy_tolerance, format_numeric_for_policy, load_numeric_tolerance_policy,
    NumericTolerance, NumericTolerancePolicy, NumericTolerancePolicyError,
    NUMERIC_TOLERANCE_POLICY_PATH,
};
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI};
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct EvaluateArgs {
    /// Degree l
    #[arg(long)]
    degree: u32,

    /// Order m, |m| <= l
    #[arg(long, allow_hyphen_values = true)]
    order: i32,

    /// Azimuth in radians
    #[arg(long, allow_hyphen_values = true)]
    theta: f64,

    /// Polar angle in radians
    #[arg(long, allow_hyphen_values = true)]
    phi: f64,

    /// Evaluate in single precision
    #[arg(long)]
    f32: bool,
}

#[derive(clap::Args)]
pub(super) struct ProjectArgs {
    /// JSON array of {radius, theta, phi}
    #[arg(long)]
    vectors: PathBuf,

    /// Highest degree of the projection basis
    #[arg(long)]
    max_degree: u32,

    /// Output JSON path
    #[arg(long)]
    output: PathBuf,
}

#[derive(clap::Args)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["coefficients", "degree"])))]
pub(super) struct SampleArgs {
    /// Grid size as WIDTHxHEIGHT (longitude x latitude)
    #[arg(long, value_parser = parse_resolution)]
    resolution: Resolution,

    /// Output JSON path
    #[arg(long)]
    output: PathBuf,

    /// JSON array of expansion coefficients
    #[arg(long)]
    coefficients: Option<PathBuf>,

    /// Degree of a single basis function
    #[arg(long, requires = "order")]
    degree: Option<u32>,

    /// Order of a single basis function
    #[arg(long, requires = "degree", allow_hyphen_values = true)]
    order: Option<i32>,
}

#[derive(clap::Args)]
pub(super) struct ProductArgs {
    /// JSON array of left-hand coefficients
    #[arg(long)]
    lhs: PathBuf,

    /// JSON array of right-hand coefficients
    #[arg(long)]
    rhs: PathBuf,

    /// Output JSON path
    #[arg(long)]
    output: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct CompareArgs {
    /// JSON array of left-hand coefficients
    #[arg(long)]
    lhs: PathBuf,

    /// JSON array of right-hand coefficients
    #[arg(long)]
    rhs: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct VerifyArgs {
    /// Highest degree exercised by every engine
    #[arg(long, default_value_t = 4)]
    max_degree: u32,

    /// Sample grid size as WIDTHxHEIGHT
    #[arg(long, default_value = "16x8", value_parser = parse_resolution)]
    resolution: Resolution,

    /// Numeric tolerance policy path
    #[arg(long, default_value = NUMERIC_TOLERANCE_POLICY_PATH)]
    policy: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionOutput {
    max_degree: u32,
    vectors_size: usize,
    coefficient_count: u32,
    layout: &'static str,
    matrix: Vec<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SampleOutput {
    resolution: Resolution,
    points: Vec<SamplePoint<f64>>,
    indices: Vec<u32>,
}

pub(super) fn run_evaluate_command(args: EvaluateArgs) -> Result<i32, CliError> {
    check_degree_order(args.degree, args.order)?;

    if args.f32 {
        let value = evaluate::<f32>(args.degree, args.order, args.theta as f32, args.phi as f32);
        println!("{}", value);
    } else {
        let value = evaluate::<f64>(args.degree, args.order, args.theta, args.phi);
        println!("{}", value);
    }
    Ok(0)
}

pub(super) fn run_project_command(args: ProjectArgs, sizes: &BlockSizes) -> Result<i32, CliError> {
    check_degree(args.max_degree)?;
    let vectors: Vec<SphericalVector<f64>> = read_json(&args.vectors)?;
    let count = coefficient_count(args.max_degree);
    let mut matrix = vec![0.0; vectors.len() * count as usize];
    calculate_matrix(sizes, args.max_degree, &vectors, &mut matrix)?;

    write_json(
        &args.output,
        &ProjectionOutput {
            max_degree: args.max_degree,
            vectors_size: vectors.len(),
            coefficient_count: count,
            layout: "column-major",
            matrix,
        },
    )?;
    info!(output = %args.output.display(), "wrote projection matrix");
    Ok(0)
}

pub(super) fn run_sample_command(args: SampleArgs, sizes: &BlockSizes) -> Result<i32, CliError> {
    let resolution = args.resolution;
    let mut points = vec![SamplePoint::default(); resolution.cell_count()];
    let mut indices = vec![0_u32; 4 * resolution.cell_count()];

    match (args.coefficients, args.degree, args.order) {
        (Some(path), _, _) => {
            let coefficients: Vec<f64> = read_json(&path)?;
            let max_l = expansion_degree("coefficients", &coefficients)?;
            sample_sum(sizes, max_l, resolution, &coefficients, &mut points, &mut indices)?;
        }
        (None, Some(degree), Some(order)) => {
            check_degree_order(degree, order)?;
            sample(sizes, degree, order, resolution, &mut points, &mut indices)?;
        }
        _ => {
            return Err(CliError::Usage(
                "sample requires --coefficients or both --degree and --order".to_string(),
            ));
        }
    }

    write_json(
        &args.output,
        &SampleOutput {
            resolution,
            points,
            indices,
        },
    )?;
    info!(output = %args.output.display(), %resolution, "wrote sample grid");
    Ok(0)
}

pub(super) fn run_product_command(args: ProductArgs, sizes: &BlockSizes) -> Result<i32, CliError> {
    let (lhs, rhs) = read_expansion_pair(&args.lhs, &args.rhs)?;
    let mut out = vec![0.0_f64; lhs.len()];
    product(sizes, &lhs, &rhs, &mut out)?;

    write_json(&args.output, &out)?;
    info!(output = %args.output.display(), coefficients = out.len(), "wrote product");
    Ok(0)
}

pub(super) fn run_compare_command(args: CompareArgs) -> Result<i32, CliError> {
    let (lhs, rhs) = read_expansion_pair(&args.lhs, &args.rhs)?;
    println!("{}", compare(&lhs, &rhs));
    Ok(0)
}

fn read_expansion_pair(
    lhs_path: &std::path::Path,
    rhs_path: &std::path::Path,
) -> Result<(Vec<f64>, Vec<f64>), CliError> {
    let lhs: Vec<f64> = read_json(lhs_path)?;
    let rhs: Vec<f64> = read_json(rhs_path)?;
    expansion_degree("lhs", &lhs)?;
    expansion_degree("rhs", &rhs)?;
    if lhs.len() != rhs.len() {
        return Err(CliError::Compute(HarmoniaError::invalid_input(
            "INPUT.COEFFICIENT_COUNT",
            format!(
                "lhs holds {} coefficients but rhs holds {}",
                lhs.len(),
                rhs.len()
            ),
        )));
    }
    Ok((lhs, rhs))
}

/// Outcome of one engine checked against its serial reference.
#[derive(Debug, Clone, PartialEq)]
struct EngineCheck {
    engine: &'static str,
    cases: usize,
    failures: usize,
    max_abs_diff: f64,
}

impl EngineCheck {
    fn new(engine: &'static str) -> Self {
        Self {
            engine,
            cases: 0,
            failures: 0,
            max_abs_diff: 0.0,
        }
    }

    fn record(&mut self, expected: f64, actual: f64, tolerance: NumericTolerance) {
        let comparison = compare_with_policy_tolerance(expected, actual, tolerance);
        self.cases += 1;
        self.max_abs_diff = self.max_abs_diff.max(comparison.abs_diff);
        if !comparison.passes {
            self.failures += 1;
        }
    }

    fn passed(&self) -> bool {
        self.failures == 0
    }
}

pub(super) fn run_verify_command(args: VerifyArgs, sizes: &BlockSizes) -> Result<i32, CliError> {
    check_degree(args.max_degree)?;
    let policy = load_numeric_tolerance_policy(&args.policy).map_err(policy_error)?;
    let max_l = args.max_degree;

    let checks = [
        verify_projection(sizes, max_l, category_tolerance(&policy, "projection")?)?,
        verify_sampling(
            sizes,
            max_l,
            args.resolution,
            category_tolerance(&policy, "sampling")?,
        )?,
        verify_coupling(sizes, max_l, category_tolerance(&policy, "coupling")?)?,
    ];

    for check in &checks {
        println!(
            "{}: cases={} failures={} max_abs_diff={} {}",
            check.engine,
            check.cases,
            check.failures,
            format_numeric_for_policy(check.max_abs_diff),
            if check.passed() { "PASS" } else { "FAIL" }
        );
    }

    let passed = checks.iter().all(EngineCheck::passed);
    println!(
        "Verification status: {}",
        if passed { "PASS" } else { "FAIL" }
    );
    if passed { Ok(0) } else { Ok(1) }
}

fn policy_error(error: NumericTolerancePolicyError) -> CliError {
    let diagnostic = match &error {
        NumericTolerancePolicyError::Read { .. } => {
            HarmoniaError::io("IO.POLICY_READ", error.to_string())
        }
        NumericTolerancePolicyError::Parse { .. } => {
            HarmoniaError::invalid_input("INPUT.POLICY", error.to_string())
        }
    };
    CliError::Compute(diagnostic)
}

fn category_tolerance(
    policy: &NumericTolerancePolicy,
    category_id: &str,
) -> Result<NumericTolerance, CliError> {
    policy.tolerance_for_category(category_id).ok_or_else(|| {
        CliError::Compute(HarmoniaError::invalid_input(
            "INPUT.POLICY_CATEGORY",
            format!("tolerance policy has no '{category_id}' category"),
        ))
    })
}

fn verify_projection(
    sizes: &BlockSizes,
    max_l: u32,
    tolerance: NumericTolerance,
) -> Result<EngineCheck, CliError> {
    let vectors: Vec<SphericalVector<f64>> = seeded_uniform(2 * 37, 11)
        .chunks(2)
        .map(|pair| SphericalVector::new(1.0, (pair[0] + 1.0) * PI, (pair[1] + 1.0) * FRAC_PI_2))
        .collect();
    let count = coefficient_count(max_l) as usize;
    let mut matrix = vec![0.0; vectors.len() * count];
    calculate_matrix(sizes, max_l, &vectors, &mut matrix)?;

    let mut check = EngineCheck::new("projection");
    for (v, vector) in vectors.iter().enumerate() {
        for c in 0..count {
            check.record(
                evaluate_index(c as u32, vector.theta, vector.phi),
                matrix[matrix_index(vectors.len(), v, c)],
                tolerance,
            );
        }
    }
    Ok(check)
}

fn verify_sampling(
    sizes: &BlockSizes,
    max_l: u32,
    resolution: Resolution,
    tolerance: NumericTolerance,
) -> Result<EngineCheck, CliError> {
    let coefficients = seeded_uniform(coefficient_count(max_l) as usize, 3);
    let mut points = vec![SamplePoint::default(); resolution.cell_count()];
    let mut indices = vec![0_u32; 4 * resolution.cell_count()];
    sample_sum(sizes, max_l, resolution, &coefficients, &mut points, &mut indices)?;

    let mut check = EngineCheck::new("sampling");
    for point in &points {
        check.record(
            evaluate_sum(max_l, &coefficients, point.theta, point.phi),
            point.value,
            tolerance,
        );
    }
    Ok(check)
}

fn verify_coupling(
    sizes: &BlockSizes,
    max_l: u32,
    tolerance: NumericTolerance,
) -> Result<EngineCheck, CliError> {
    let count = coefficient_count(max_l);
    let lhs = seeded_uniform(count as usize, 5);
    let rhs = seeded_uniform(count as usize, 9);
    let mut out = vec![0.0_f64; count as usize];
    product(sizes, &lhs, &rhs, &mut out)?;

    let mut check = EngineCheck::new("coupling");
    for (o, &actual) in out.iter().enumerate() {
        let mut expected = 0.0;
        for (l, &lhs_value) in lhs.iter().enumerate() {
            for (r, &rhs_value) in rhs.iter().enumerate() {
                expected += coupling_coefficient::<f64>(
                    coefficient_lm(l as u32),
                    coefficient_lm(r as u32),
                    coefficient_lm(o as u32),
                ) * lhs_value
                    * rhs_value;
            }
        }
        check.record(expected, actual, tolerance);
    }
    Ok(check)
}
