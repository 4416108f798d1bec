use std::error;
use std::fmt;
use std::result;

/// Just put any error in a box.
pub type Result<T> = result::Result<T, Box<dyn error::Error + Send + Sync>>;

/// Misuse detected when building or registering metrics.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricError {
    /// Reservoirs must hold at least one value.
    InvalidReservoirSize(usize),
    /// Decay factors must be finite and strictly positive.
    InvalidAlpha(f64),
    /// Averaging windows and tick intervals must be non-zero.
    InvalidWindow,
    /// A metric of another kind is already registered under this name.
    MetricKindConflict {
        name: String,
        existing: &'static str,
        requested: &'static str,
    },
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetricError::InvalidReservoirSize(size) => {
                write!(f, "reservoir size must be at least 1, got {}", size)
            }
            MetricError::InvalidAlpha(alpha) => {
                write!(f, "decay factor must be finite and positive, got {}", alpha)
            }
            MetricError::InvalidWindow => write!(f, "averaging window and tick interval must be non-zero"),
            MetricError::MetricKindConflict {
                name,
                existing,
                requested,
            } => write!(
                f,
                "a {} named '{}' already exists, cannot register it as a {}",
                existing, name, requested
            ),
        }
    }
}

impl error::Error for MetricError {}
