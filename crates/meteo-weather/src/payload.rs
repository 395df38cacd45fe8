//! Provider payload shapes as returned by Open-Meteo (`timeformat=unixtime`).
//!
//! Each variable table exposes a time axis and named columns through
//! [`VariableTable`]; the normalizer only talks to that trait.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// A timestamp may sit this fraction of an interval off its slot (an hour for daily rows)
const SLOT_TOLERANCE_DIVISOR: i64 = 24;

/// More axis rows than this per provided timestamp means a corrupt time array
const MAX_ROWS_PER_TIMESTAMP: usize = 4;

/// Left-inclusive, right-exclusive time axis in epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAxis {
    pub start: i64,
    pub end: i64,
    pub interval: i64,
}

impl TimeAxis {
    pub fn new(start: i64, end: i64, interval: i64) -> Self {
        Self { start, end, interval }
    }

    /// Number of rows: `(end - start) / interval`
    pub fn len(&self) -> usize {
        if self.interval <= 0 {
            return 0;
        }
        self.end
            .checked_sub(self.start)
            .filter(|span| *span > 0)
            .and_then(|span| usize::try_from(span / self.interval).ok())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Epoch seconds of every row
    pub fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.len()).map_while(move |i| {
            let offset = i64::try_from(i).ok()?.checked_mul(self.interval)?;
            self.start.checked_add(offset)
        })
    }

    /// Row index of the nearest slot to an epoch timestamp.
    ///
    /// `None` when the timestamp is off the axis or more than
    /// `interval / 24` away from its nearest slot.
    pub fn slot(&self, epoch: i64) -> Option<usize> {
        if self.interval <= 0 {
            return None;
        }
        let offset = epoch.checked_sub(self.start)?;
        let index = offset.checked_add(self.interval / 2)?.div_euclid(self.interval);
        let distance = offset.checked_sub(index.checked_mul(self.interval)?)?;
        if distance.abs() > self.interval / SLOT_TOLERANCE_DIVISOR {
            return None;
        }
        let index = usize::try_from(index).ok()?;
        (index < self.len()).then_some(index)
    }

    /// Smallest axis with a slot for every timestamp in `start..=last`
    fn covering(start: i64, last: i64, interval: i64) -> Option<Self> {
        if interval <= 0 {
            return None;
        }
        let rows = last
            .checked_sub(start)?
            .checked_add(interval / 2)?
            .div_euclid(interval)
            .checked_add(1)?;
        let end = start.checked_add(rows.checked_mul(interval)?)?;
        Some(Self::new(start, end, interval))
    }
}

/// A resolved column; out-of-range reads are absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column(Vec<Option<f64>>);

impl Column {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self(values)
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A provider table of parallel variable columns sharing one time axis
pub trait VariableTable {
    /// Time axis of the table at its fixed row interval
    fn axis(&self, interval: i64) -> Option<TimeAxis>;

    /// Column values aligned to the axis, or `None` if the variable is absent
    fn column(&self, name: &str, axis: &TimeAxis) -> Option<Vec<Option<f64>>>;

    /// Resolve the first present alias into a column
    fn resolve(&self, aliases: &[&str], axis: &TimeAxis) -> Column {
        for alias in aliases {
            if let Some(values) = self.column(alias, axis) {
                return Column::new(values);
            }
        }
        tracing::trace!("No column for aliases {:?}", aliases);
        Column::default()
    }
}

/// Coerce a provider value into a finite number
///
/// Null, NaN, infinities and non-numeric values become `None`.
pub fn coerce(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// One location's forecast response
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub timezone_abbreviation: Option<String>,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub current: Option<SnapshotBlock>,
    #[serde(default)]
    pub hourly: Option<SeriesBlock>,
    #[serde(default)]
    pub daily: Option<SeriesBlock>,
}

/// The `current` block: one timestamp and scalar variables
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotBlock {
    pub time: i64,
    #[serde(default)]
    pub interval: Option<i64>,
    #[serde(flatten)]
    pub variables: HashMap<String, Value>,
}

impl SnapshotBlock {
    /// First present alias, coerced
    pub fn value(&self, aliases: &[&str]) -> Option<f64> {
        aliases
            .iter()
            .find_map(|alias| self.variables.get(*alias))
            .and_then(coerce)
    }
}

/// An `hourly` or `daily` block: a `time` array plus parallel variable arrays
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesBlock {
    pub time: Vec<i64>,
    #[serde(flatten)]
    pub variables: HashMap<String, Value>,
}

impl VariableTable for SeriesBlock {
    fn axis(&self, interval: i64) -> Option<TimeAxis> {
        let start = *self.time.iter().min()?;
        let last = *self.time.iter().max()?;

        let Some(axis) = TimeAxis::covering(start, last, interval) else {
            tracing::warn!("Time array {}..={} is out of range, ignoring table", start, last);
            return None;
        };
        if axis.len() > self.time.len().saturating_mul(MAX_ROWS_PER_TIMESTAMP) {
            tracing::warn!(
                "Time array spans {} rows for {} timestamps, ignoring table",
                axis.len(),
                self.time.len()
            );
            return None;
        }
        Some(axis)
    }

    fn column(&self, name: &str, axis: &TimeAxis) -> Option<Vec<Option<f64>>> {
        let raw = self.variables.get(name)?.as_array()?;
        let mut values = vec![None; axis.len()];
        let mut dropped = 0usize;
        // Place each value by its own timestamp so gaps stay gaps
        for (epoch, value) in self.time.iter().zip(raw) {
            match axis.slot(*epoch) {
                Some(slot) if slot < values.len() => values[slot] = coerce(value),
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::debug!("Dropped {} value(s) of {} off the time axis", dropped, name);
        }
        Some(values)
    }
}
