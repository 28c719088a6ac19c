//! Dose-coverage cost optimizer.
//!
//! Finds the cheapest non-negative integer combination of vials whose total
//! strength covers a target dose. Doses and strengths are converted to fixed
//! point (`dose_scale` units per mg) before a bounded dynamic-programming
//! search; prices are compared in fixed point (`price_scale` units per
//! currency unit). Strengths and prices must be exact at their scale so the
//! fixed-point optimum is the real optimum; the target dose is rounded up.
//!
//! Among equally cheap combinations the result delivers the smallest dose,
//! then uses the fewest vials, then has the lexicographically smallest sorted
//! sequence of vial codes.

mod fixed_point;
mod search;

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::models::{Combination, LineItem, VialOption};

use fixed_point::{gcd, required_scale, to_fixed, Rounding};
use search::{search, ScaledOption, SearchLimits};

/// Optimizer errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("Invalid dose: {0} (must be a finite value greater than zero)")]
    InvalidDose(f64),

    #[error("Invalid vial option: {0}")]
    InvalidOption(String),

    #[error("Infeasible: no vial options available or no covering combination found")]
    Infeasible,

    #[error("Search space too large: {levels} dose levels exceeds limit of {limit}")]
    SearchSpaceTooLarge { levels: u64, limit: usize },

    #[error("Cost overflow while summing fixed-point prices")]
    CostOverflow,

    #[error("Optimizer timed out")]
    TimedOut,
}

pub type OptimizerResult<T> = Result<T, OptimizerError>;

/// Solver for the minimum-cost dose coverage problem.
#[derive(Debug, Clone, Default)]
pub struct DoseCoverageOptimizer {
    config: OptimizerConfig,
}

impl DoseCoverageOptimizer {
    /// Create an optimizer with the given configuration.
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Find the cheapest combination of `options` delivering at least
    /// `target_dose_mg`.
    ///
    /// Line items are returned in vial-code order. Identical inputs always
    /// produce identical combinations.
    pub fn solve(&self, options: &[VialOption], target_dose_mg: f64) -> OptimizerResult<Combination> {
        if !target_dose_mg.is_finite() || target_dose_mg <= 0.0 {
            return Err(OptimizerError::InvalidDose(target_dose_mg));
        }
        if options.is_empty() {
            return Err(OptimizerError::Infeasible);
        }

        let mut order: Vec<usize> = (0..options.len()).collect();
        order.sort_by(|&a, &b| options[a].code.cmp(&options[b].code).then(a.cmp(&b)));
        let sorted: Vec<&VialOption> = order.iter().map(|&i| &options[i]).collect();

        let mut scaled = Vec::with_capacity(sorted.len());
        for option in &sorted {
            scaled.push(self.scale_option(option)?);
        }

        // Every reachable level is a multiple of the common divisor of the strengths.
        let divisor = scaled.iter().fold(0, |acc, o| gcd(acc, o.strength));
        for option in &mut scaled {
            option.strength /= divisor;
        }
        let target = to_fixed(target_dose_mg, self.config.dose_scale, Rounding::Up)
            .ok_or(OptimizerError::InvalidDose(target_dose_mg))?
            .max(1)
            .div_ceil(divisor);

        let limits = SearchLimits {
            max_levels: self.config.max_dose_levels,
            deadline: self.config.timeout().map(deadline_after),
        };
        let outcome = search(&scaled, target, limits)?.ok_or(OptimizerError::Infeasible)?;

        debug!(
            options = sorted.len(),
            target_units = target,
            divisor,
            levels = outcome.levels_searched,
            delivered_units = outcome.level,
            fixed_cost = outcome.cost,
            "Dose coverage solved"
        );

        Ok(Combination::from_line_items(
            sorted
                .into_iter()
                .zip(outcome.quantities)
                .map(|(option, quantity)| LineItem {
                    option: option.clone(),
                    quantity,
                }),
        ))
    }

    fn scale_option(&self, option: &VialOption) -> OptimizerResult<ScaledOption> {
        option.validate().map_err(OptimizerError::InvalidOption)?;

        let dose_scale = self.config.dose_scale;
        let strength = to_fixed(option.strength_mg, dose_scale, Rounding::Exact)
            .filter(|&s| s > 0)
            .ok_or_else(|| {
                OptimizerError::InvalidOption(format!(
                    "vial {} strength {} mg is not a multiple of 1/{} mg ({})",
                    option.code,
                    option.strength_mg,
                    dose_scale,
                    scale_hint("dose_scale", option.strength_mg, dose_scale)
                ))
            })?;

        let price_scale = self.config.price_scale;
        let price = to_fixed(option.price, price_scale, Rounding::Exact).ok_or_else(|| {
            OptimizerError::InvalidOption(format!(
                "vial {} price {} is not a multiple of 1/{} ({})",
                option.code,
                option.price,
                price_scale,
                scale_hint("price_scale", option.price, price_scale)
            ))
        })?;

        Ok(ScaledOption { strength, price })
    }
}

fn scale_hint(setting: &str, value: f64, scale: u32) -> String {
    match required_scale(value, scale) {
        Some(required) => format!("requires {} >= {}", setting, required),
        None => format!("not representable at any {}", setting),
    }
}

fn deadline_after(timeout: Duration) -> Instant {
    Instant::now() + timeout
}

/// Solve with the default configuration.
pub fn solve(options: &[VialOption], target_dose_mg: f64) -> OptimizerResult<Combination> {
    DoseCoverageOptimizer::default().solve(options, target_dose_mg)
}
