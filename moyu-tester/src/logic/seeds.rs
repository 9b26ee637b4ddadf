use anyhow::{Result, bail};
use std::collections::BTreeSet;

/// Seeds swept when `all` is requested.
pub const SEED_SWEEP: &[u64] = &[1, 7, 42, 1337, 2024, 31_337, 65_535, 0xC0FF_EE00];

/// Fallback when no seed tokens survive parsing.
pub const DEFAULT_SEED: u64 = 1337;

/// Split a comma-separated CLI argument, dropping empty entries.
#[must_use]
pub fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve CLI seed tokens into a de-duplicated, ordered seed list.
///
/// Accepts decimal integers (negative values use their magnitude), `0x`
/// hexadecimal, and the keyword `all` which expands to [`SEED_SWEEP`].
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();
    let mut seen: BTreeSet<u64> = BTreeSet::new();
    let mut push = |seed: u64, seeds: &mut Vec<u64>| {
        if seen.insert(seed) {
            seeds.push(seed);
        }
    };

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") {
            for seed in SEED_SWEEP {
                push(*seed, &mut seeds);
            }
            continue;
        }

        if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            && let Ok(value) = u64::from_str_radix(&hex.replace('_', ""), 16)
        {
            push(value, &mut seeds);
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            push(value.unsigned_abs(), &mut seeds);
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            push(value, &mut seeds);
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    Ok(seeds)
}
