//! Parameter sweeps across independent engine instances.
//!
//! Each variant gets its own `Backtest` built from its own config value —
//! there is no shared mutable state between instances, which is what makes
//! the rayon fan-out safe. The bar loop inside each instance stays strictly
//! sequential.

use rayon::prelude::*;
use tracing::info;

use scalplab_core::domain::Bar;
use scalplab_core::{Backtest, ScalperConfig};

use crate::metrics::{summarize, Summary};

/// One sweep variant's outcome.
#[derive(Debug, Clone)]
pub struct SweepRow {
    pub label: String,
    pub fingerprint: String,
    pub summary: Summary,
}

/// Run every labeled config over the same bars, in parallel.
///
/// Variants with invalid configs are dropped with a log line rather than
/// failing the whole sweep.
pub fn run_sweep(bars: &[Bar], variants: Vec<(String, ScalperConfig)>) -> Vec<SweepRow> {
    info!(variants = variants.len(), bars = bars.len(), "sweep start");

    variants
        .into_par_iter()
        .filter_map(|(label, cfg)| {
            let fingerprint = cfg.fingerprint();
            let backtest = match Backtest::new(cfg) {
                Ok(b) => b,
                Err(err) => {
                    tracing::warn!(%label, %err, "skipping invalid sweep variant");
                    return None;
                }
            };
            let result = backtest.run(bars);
            Some(SweepRow { label, fingerprint, summary: summarize(&result) })
        })
        .collect()
}
