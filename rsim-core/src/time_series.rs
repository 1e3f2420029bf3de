use thiserror::Error;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The ways constructing a [`TimeSeries`] can fail.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimeSeriesError {
    /// The number of timestamps and the number of values must match one to one.
    #[error("got {timestamps} timestamps for {values} values")]
    LengthMismatch { timestamps: usize, values: usize },
    /// A time series must contain at least one sample so that its time span is defined.
    #[error("a time series must contain at least one sample")]
    Empty,
    /// Timestamps must be strictly increasing.
    #[error("timestamps must be strictly increasing (violated at index {index})")]
    NonIncreasing { index: usize },
}

/// An ordered sequence of `(timestamp, value)` pairs.
///
/// Timestamps are real-valued seconds, strictly increasing, and paired one to one with
/// the values. A `TimeSeries` is immutable once constructed; owners that need a
/// different sampling replace the series wholesale rather than mutating it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TimeSeries<T> {
    timestamps: Vec<f64>,
    values: Vec<T>,
}

impl<T> TimeSeries<T> {
    /// Creates a time series after validating the pairing invariants.
    pub fn new(timestamps: Vec<f64>, values: Vec<T>) -> Result<Self, TimeSeriesError> {
        if timestamps.len() != values.len() {
            return Err(TimeSeriesError::LengthMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }
        if timestamps.is_empty() {
            return Err(TimeSeriesError::Empty);
        }
        if let Some(index) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(TimeSeriesError::NonIncreasing { index: index + 1 });
        }
        Ok(Self { timestamps, values })
    }

    /// The number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; empty series are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The sample timestamps in seconds.
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// The sample values, in timestamp order.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The first timestamp.
    pub fn start_time(&self) -> f64 {
        self.timestamps[0]
    }

    /// The last timestamp.
    pub fn end_time(&self) -> f64 {
        self.timestamps[self.timestamps.len() - 1]
    }

    /// Iterates over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> {
        self.timestamps.iter().copied().zip(self.values.iter())
    }
}
