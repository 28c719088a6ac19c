//! Bounded minimum-cost covering search over exact dose levels.
//!
//! Level `d` holds the best combination delivering exactly `d` units, where
//! "best" orders by cost, then unit count, then the sorted identifier
//! sequence. Options are visited from the last identifier to the first, so a
//! candidate that uses the current option always wins a (cost, units) tie
//! against a combination built only from later identifiers.

use std::time::Instant;

use super::{OptimizerError, OptimizerResult};

/// Marks the empty combination at level 0.
const ORIGIN: u32 = u32::MAX;

/// Deadline is polled once per this many relaxations.
const DEADLINE_POLL_INTERVAL: u64 = 4096;

/// An option in fixed-point units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScaledOption {
    pub strength: u64,
    pub price: u64,
}

/// Resource limits for one search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchLimits {
    pub max_levels: usize,
    pub deadline: Option<Instant>,
}

/// Result of a successful search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchOutcome {
    /// Quantity per option, same order as the input
    pub quantities: Vec<u32>,
    /// Delivered dose level
    pub level: u64,
    /// Fixed-point cost
    pub cost: u64,
    /// Size of the level table
    pub levels_searched: usize,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    cost: u64,
    units: u32,
    last: u32,
}

/// Find the best combination covering at least `target` units.
///
/// `options` must be sorted by identifier and have positive strengths.
/// Returns `Ok(None)` when no level at or above `target` is reachable.
pub(crate) fn search(
    options: &[ScaledOption],
    target: u64,
    limits: SearchLimits,
) -> OptimizerResult<Option<SearchOutcome>> {
    let max_strength = match options.iter().map(|o| o.strength).max() {
        Some(s) if s > 0 => s,
        _ => return Ok(None),
    };

    // No optimum overshoots the target by a whole unit of the largest strength.
    let levels = target
        .checked_add(max_strength)
        .and_then(|l| usize::try_from(l).ok())
        .filter(|&l| l <= limits.max_levels && l <= u32::MAX as usize)
        .ok_or(OptimizerError::SearchSpaceTooLarge {
            levels: target.saturating_add(max_strength),
            limit: limits.max_levels,
        })?;

    let mut table: Vec<Option<Cell>> = vec![None; levels];
    table[0] = Some(Cell {
        cost: 0,
        units: 0,
        last: ORIGIN,
    });

    let mut relaxations: u64 = 0;
    for (idx, option) in options.iter().enumerate().rev() {
        let step = option.strength as usize;
        if step == 0 || step >= levels {
            continue;
        }
        for d in step..levels {
            relaxations += 1;
            if relaxations % DEADLINE_POLL_INTERVAL == 0 {
                check_deadline(limits.deadline)?;
            }

            let Some(prev) = table[d - step] else {
                continue;
            };
            let candidate = Cell {
                cost: prev
                    .cost
                    .checked_add(option.price)
                    .ok_or(OptimizerError::CostOverflow)?,
                units: prev.units + 1,
                last: idx as u32,
            };
            let replace = match table[d] {
                None => true,
                Some(current) => (candidate.cost, candidate.units) <= (current.cost, current.units),
            };
            if replace {
                table[d] = Some(candidate);
            }
        }
    }

    // Cheapest covering level; the lowest level wins a cost tie.
    let start = target as usize;
    let mut best: Option<(usize, u64)> = None;
    for (d, cell) in table.iter().enumerate().skip(start) {
        if let Some(cell) = cell {
            if best.map_or(true, |(_, cost)| cell.cost < cost) {
                best = Some((d, cell.cost));
            }
        }
    }
    let Some((level, cost)) = best else {
        return Ok(None);
    };

    let mut quantities = vec![0u32; options.len()];
    let mut d = level;
    while d > 0 {
        let Some(cell) = table[d] else {
            return Ok(None);
        };
        let Some(option) = options.get(cell.last as usize) else {
            return Ok(None);
        };
        quantities[cell.last as usize] += 1;
        d -= option.strength as usize;
    }

    Ok(Some(SearchOutcome {
        quantities,
        level: level as u64,
        cost,
        levels_searched: levels,
    }))
}

fn check_deadline(deadline: Option<Instant>) -> OptimizerResult<()> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Err(OptimizerError::TimedOut),
        _ => Ok(()),
    }
}
