use super::CliError;
use anyhow::Context;
use harmonia_core::common::{load_config, ConfigError, HarmoniaConfig};
use harmonia_core::domain::{HarmoniaError, Resolution};
use harmonia_core::launch::BlockSizes;
use harmonia_core::numerics::special::{coefficient_count, maximum_degree};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber once; later calls keep the first one.
pub(super) fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub(super) fn load_block_sizes(config_path: Option<&Path>) -> Result<BlockSizes, CliError> {
    let config = match config_path {
        Some(path) => load_config(path).map_err(config_error)?,
        None => HarmoniaConfig::default(),
    };
    debug!(?config, "runtime configuration");

    if let Some(threads) = config.threads {
        // The global pool can only be built once per process.
        if let Err(error) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            warn!(threads, %error, "keeping the existing rayon pool");
        }
    }

    Ok(BlockSizes::from(config.launch))
}

fn config_error(error: ConfigError) -> CliError {
    let diagnostic = match &error {
        ConfigError::Read { .. } => HarmoniaError::io("IO.CONFIG_READ", error.to_string()),
        ConfigError::Parse { .. } | ConfigError::Invalid { .. } => {
            HarmoniaError::invalid_input("INPUT.CONFIG", error.to_string())
        }
    };
    CliError::Compute(diagnostic)
}

pub(super) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    serde_json::from_str(&source).map_err(|error| {
        CliError::Compute(HarmoniaError::invalid_input(
            "INPUT.JSON",
            format!("failed to parse '{}': {}", path.display(), error),
        ))
    })
}

pub(super) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    let rendered = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize '{}'", path.display()))?;
    fs::write(path, rendered).with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}

/// Parses `WxH`, both sides positive.
pub(super) fn parse_resolution(raw: &str) -> Result<Resolution, String> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|error| format!("invalid width '{width}': {error}"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|error| format!("invalid height '{height}': {error}"))?;
    if width == 0 || height == 0 {
        return Err(format!("resolution must be positive, got {width}x{height}"));
    }
    Ok(Resolution::new(width, height))
}

/// Degree of an expansion whose length must be a perfect square.
pub(super) fn expansion_degree(label: &str, coefficients: &[f64]) -> Result<u32, CliError> {
    let invalid = || {
        CliError::Compute(HarmoniaError::invalid_input(
            "INPUT.COEFFICIENT_COUNT",
            format!(
                "{label} holds {} coefficients; expected a positive perfect square",
                coefficients.len()
            ),
        ))
    };
    let count = u32::try_from(coefficients.len()).map_err(|_| invalid())?;
    let max_l = maximum_degree(count);
    if count == 0 || coefficient_count(max_l) != count {
        return Err(invalid());
    }
    Ok(max_l)
}

/// Rejects degrees whose coefficient count `(l + 1)^2` does not fit in `u32`.
pub(super) fn check_degree(degree: u32) -> Result<(), CliError> {
    if degree.checked_add(1).and_then(|n| n.checked_mul(n)).is_none() {
        return Err(CliError::Compute(HarmoniaError::invalid_input(
            "INPUT.DEGREE_ORDER",
            format!("degree {degree} is too large; its expansion has more than u32::MAX coefficients"),
        )));
    }
    Ok(())
}

pub(super) fn check_degree_order(degree: u32, order: i32) -> Result<(), CliError> {
    check_degree(degree)?;
    if order.unsigned_abs() > degree {
        return Err(CliError::Compute(HarmoniaError::invalid_input(
            "INPUT.DEGREE_ORDER",
            format!("order {order} is outside [-{degree}, {degree}]"),
        )));
    }
    Ok(())
}

/// `count` reproducible values drawn uniformly from `[-1, 1)`.
pub(super) fn seeded_uniform(count: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| rng.random_range(-1.0..1.0)).collect()
}
