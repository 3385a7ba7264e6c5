use log::trace;
use nalgebra::Vector3;

use crate::{
    ephemeris::{EphemerisTable, TableKind},
    time::TimeValue,
};

/// Quality of an [InterpolationOutcome].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum InterpolationStatus {
    /// Fully centered, full order interpolation.
    #[default]
    NotError,
    /// Window could not be centered on the target (table boundary), or the
    /// target sits within one sampling interval outside of the table.
    /// Results are populated, with degraded accuracy.
    NotInTheMiddle,
    /// Target lies outside of the table coverage. Nothing was computed.
    OutOfBounds,
    /// Table holds fewer samples than the requested window. Nothing was computed.
    DataSizeMismatch,
}

impl InterpolationStatus {
    /// True when the outcome does not hold any usable value.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, Self::OutOfBounds | Self::DataSizeMismatch)
    }
}

impl std::fmt::Display for InterpolationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NotError => write!(f, "not-error"),
            Self::NotInTheMiddle => write!(f, "not-in-the-middle"),
            Self::OutOfBounds => write!(f, "out-of-bounds"),
            Self::DataSizeMismatch => write!(f, "data-size-mismatch"),
        }
    }
}

/// Result of a single [interpolate] query.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InterpolationOutcome {
    /// [InterpolationStatus] of this query
    pub status: InterpolationStatus,
    /// Requested instant
    pub time: TimeValue,
    /// Interpolated position (m). Null on hard failure.
    pub position: Vector3<f64>,
    /// Interpolated velocity (m/s), when it could be determined.
    pub velocity: Option<Vector3<f64>>,
    /// Number of samples contributing to the polynomial
    pub used_samples: usize,
    /// True when the window could not be centered on the target
    pub degraded_accuracy: bool,
}

impl InterpolationOutcome {
    fn failure(time: TimeValue, status: InterpolationStatus) -> Self {
        Self {
            status,
            time,
            position: Vector3::zeros(),
            velocity: None,
            used_samples: 0,
            degraded_accuracy: false,
        }
    }

    /// True when position (and possibly velocity) hold usable values.
    pub fn is_valid(&self) -> bool {
        !self.status.is_hard_failure()
    }
}

/// Index of the first sample of the window, prior to clamping.
/// Even windows have as many samples on both sides of the bracket,
/// the extra sample of odd windows goes to the earlier side.
fn ideal_window_start(bracket: usize, window_size: usize) -> isize {
    bracket as isize + 1 - window_size.div_ceil(2) as isize
}

/// Lagrange basis L_j(x) for each node.
fn basis(nodes: &[f64], x: f64) -> Vec<f64> {
    nodes
        .iter()
        .enumerate()
        .map(|(j, xj)| {
            nodes
                .iter()
                .enumerate()
                .filter(|(m, _)| *m != j)
                .fold(1.0, |acc, (_, xm)| acc * (x - xm) / (xj - xm))
        })
        .collect()
}

/// Derivative of the Lagrange basis, dL_j(x)/dx for each node.
fn basis_derivative(nodes: &[f64], x: f64) -> Vec<f64> {
    nodes
        .iter()
        .enumerate()
        .map(|(j, xj)| {
            let mut sum = 0.0;
            for (m, xm) in nodes.iter().enumerate() {
                if m == j {
                    continue;
                }
                let mut prod = 1.0 / (xj - xm);
                for (k, xk) in nodes.iter().enumerate() {
                    if k != j && k != m {
                        prod *= (x - xk) / (xj - xk);
                    }
                }
                sum += prod;
            }
            sum
        })
        .collect()
}

fn weighted_sum(weights: &[f64], values: impl Iterator<Item = Vector3<f64>>) -> Vector3<f64> {
    weights
        .iter()
        .zip(values)
        .fold(Vector3::zeros(), |acc, (w, v)| acc + v * *w)
}

/// Evaluates the position (and velocity) of the object described by
/// [EphemerisTable] at `target`, using a Lagrange polynomial of degree
/// `window_size - 1` fitted over consecutive samples surrounding `target`.
///
/// Validation happens in this order:
/// - [InterpolationStatus::DataSizeMismatch] when `window_size < 2` or the
///   table has fewer samples than `window_size`
/// - [InterpolationStatus::OutOfBounds] when `target` is further than one mean
///   sampling interval away from the table
/// - [InterpolationStatus::NotInTheMiddle] when the window had to be shifted
///   against a table boundary, or `target` needs to be extrapolated
///
/// Velocity is interpolated with the same basis when the table carries
/// velocities, otherwise derived from the position polynomial.
/// This function has no side effect: identical inputs always produce
/// bit-identical outputs.
pub fn interpolate(
    table: &EphemerisTable,
    target: TimeValue,
    window_size: usize,
) -> InterpolationOutcome {
    let len = table.len();

    if window_size < 2 || window_size > len {
        trace!(
            "{}: window of {} samples, table of {}",
            target,
            window_size,
            len
        );
        return InterpolationOutcome::failure(target, InterpolationStatus::DataSizeMismatch);
    }

    let margin = table.mean_interval_s();
    let before_first = target - table.first_time();
    let after_last = target - table.last_time();

    if before_first < -margin || after_last > margin {
        trace!("{}: out of table coverage", target);
        return InterpolationOutcome::failure(target, InterpolationStatus::OutOfBounds);
    }

    let extrapolated = before_first < 0.0 || after_last > 0.0;
    let bracket = table.bracket(target).unwrap_or_default();

    let ideal = ideal_window_start(bracket, window_size);
    let start = ideal.clamp(0, (len - window_size) as isize);
    let degraded = extrapolated || start != ideal;
    let start = start as usize;

    let offsets = &table.offsets()[start..start + window_size];
    let samples = &table.samples()[start..start + window_size];

    // polynomial is expressed relative to the window first sample
    let origin = offsets[0];
    let nodes = offsets.iter().map(|t| t - origin).collect::<Vec<_>>();
    let x = before_first - origin;

    let weights = basis(&nodes, x);
    let position = weighted_sum(&weights, samples.iter().map(|s| s.position));

    let velocity = match table.kind() {
        TableKind::HasVelocity => Some(weighted_sum(
            &weights,
            samples.iter().filter_map(|s| s.velocity),
        )),
        TableKind::PositionOnly => {
            let weights = basis_derivative(&nodes, x);
            Some(weighted_sum(&weights, samples.iter().map(|s| s.position)))
        },
    };

    let status = if degraded {
        InterpolationStatus::NotInTheMiddle
    } else {
        InterpolationStatus::NotError
    };

    if degraded {
        trace!(
            "{}: window [{}; {}] not centered (bracket={})",
            target,
            start,
            start + window_size - 1,
            bracket
        );
    }

    InterpolationOutcome {
        status,
        time: target,
        position,
        velocity,
        used_samples: window_size,
        degraded_accuracy: degraded,
    }
}
