//! CSV bar loading with feed-boundary validation.
//!
//! The core assumes its input is well-formed, deduplicated, and
//! chronologically increasing; this loader is where those assumptions are
//! enforced. Malformed rows and clock regressions are hard errors; exact
//! duplicate timestamps are dropped with a warning (retried feed fetches
//! produce them routinely).

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use scalplab_core::domain::Bar;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse record {record}")]
    Parse {
        record: usize,
        #[source]
        source: csv::Error,
    },
    #[error("malformed bar at record {record} ({ts}): OHLC fields are not a valid range")]
    Malformed { record: usize, ts: DateTime<Utc> },
    #[error("bar at record {record} ({ts}) does not advance the clock (previous {prev})")]
    NonMonotonic {
        record: usize,
        ts: DateTime<Utc>,
        prev: DateTime<Utc>,
    },
}

/// One CSV row: `ts,open,high,low,close,volume` with an RFC 3339 timestamp.
#[derive(Debug, Deserialize)]
struct BarRow {
    ts: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl From<BarRow> for Bar {
    fn from(row: BarRow) -> Self {
        Bar {
            ts: row.ts,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

pub fn load_bars_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>, DataError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut bars: Vec<Bar> = Vec::new();
    for (record, row) in reader.deserialize::<BarRow>().enumerate() {
        let row = row.map_err(|source| DataError::Parse { record, source })?;
        let bar: Bar = row.into();

        if !bar.is_sane() {
            return Err(DataError::Malformed { record, ts: bar.ts });
        }

        if let Some(prev) = bars.last() {
            if bar.ts == prev.ts {
                warn!(ts = %bar.ts, record, "dropping duplicate bar");
                continue;
            }
            if bar.ts < prev.ts {
                return Err(DataError::NonMonotonic { record, ts: bar.ts, prev: prev.ts });
            }
        }

        bars.push(bar);
    }

    Ok(bars)
}
