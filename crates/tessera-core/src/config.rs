//! Runtime Settings
//!
//! Process-wide knobs read once from the environment:
//!
//! - `TESSERA_PARALLEL_THRESHOLD`: element count at which contiguous CPU
//!   loops fan out over the rayon pool (default 4096).
//! - `TESSERA_CASTING`: default casting rule for pre-supplied outputs,
//!   one of `unsafe`, `same_kind`, `safe` (default `unsafe`).
//!
//! Values that fail to parse fall back to the default with a warning.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use std::env;
use std::sync::OnceLock;

use crate::dtype::CastingPolicy;

/// Default element count above which CPU loops run in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

const PARALLEL_THRESHOLD_VAR: &str = "TESSERA_PARALLEL_THRESHOLD";
const CASTING_VAR: &str = "TESSERA_CASTING";

static PARALLEL_THRESHOLD: OnceLock<usize> = OnceLock::new();
static DEFAULT_CASTING: OnceLock<CastingPolicy> = OnceLock::new();

fn parse_threshold(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

fn read_setting<T: Copy>(var: &str, default: T, parse: impl Fn(&str) -> Option<T>) -> T {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => parse(&value).unwrap_or_else(|| {
            tracing::warn!(var, value = %value, "ignoring unparseable setting");
            default
        }),
        _ => default,
    }
}

/// Element count at or above which contiguous CPU loops use rayon.
pub fn parallel_threshold() -> usize {
    *PARALLEL_THRESHOLD.get_or_init(|| {
        read_setting(PARALLEL_THRESHOLD_VAR, DEFAULT_PARALLEL_THRESHOLD, parse_threshold)
    })
}

/// Casting rule applied when no explicit rule is configured.
pub fn default_casting() -> CastingPolicy {
    *DEFAULT_CASTING
        .get_or_init(|| read_setting(CASTING_VAR, CastingPolicy::Unsafe, CastingPolicy::parse))
}
