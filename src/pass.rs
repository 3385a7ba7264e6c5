use log::{debug, trace};
use rayon::prelude::*;

use crate::{
    cfg::PassOpts, error::Error, interpolation::InterpolationStatus, predictor::Predictor,
    time::TimeValue,
};

/// Inverse of the golden ratio
const GOLDEN_RATIO_INV: f64 = 0.618_033_988_749_894_9;

/// Contiguous time interval during which the target remains above the elevation mask.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassWindow {
    /// Rise instant, or scan start if [Self::open_start]
    pub start: TimeValue,
    /// Set instant, or last valid instant if [Self::open_end]
    pub end: TimeValue,
    /// Culmination instant
    pub max_elevation_time: TimeValue,
    /// Culmination elevation (degrees)
    pub max_elevation: f64,
    /// Elevation mask (degrees) this pass was computed against
    pub min_elevation_mask: f64,
    /// Target was already above the mask when the scan started
    pub open_start: bool,
    /// Target was still above the mask when the scan ended
    pub open_end: bool,
}

impl PassWindow {
    /// Pass duration (s)
    pub fn duration_s(&self) -> f64 {
        self.end - self.start
    }

    /// True if either end of this pass was not observed.
    pub fn is_truncated(&self) -> bool {
        self.open_start || self.open_end
    }
}

/// Describes why a scan stopped early.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScanTruncation {
    /// First instant that could not be evaluated
    pub time: TimeValue,
    /// Interpolation failure at that instant
    pub status: InterpolationStatus,
}

/// Result of one pass scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassScan {
    /// Passes, in chronological order
    pub passes: Vec<PassWindow>,
    /// Present when the scan stopped before the end of the range.
    pub truncation: Option<ScanTruncation>,
}

impl PassScan {
    /// True when the scan did not cover the whole requested range.
    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }
}

/// Pass being built
struct OngoingPass {
    start: TimeValue,
    open_start: bool,
    max_time: TimeValue,
    max_elevation: f64,
}

impl OngoingPass {
    fn new(start: TimeValue, elevation: f64, open_start: bool) -> Self {
        Self {
            start,
            open_start,
            max_time: start,
            max_elevation: elevation,
        }
    }

    fn update(&mut self, t: TimeValue, elevation: f64) {
        if elevation > self.max_elevation {
            self.max_time = t;
            self.max_elevation = elevation;
        }
    }
}

/// [PassCalculator] scans a [Predictor] over time ranges
/// and turns elevations into discrete [PassWindow]s.
pub struct PassCalculator<'a> {
    predictor: &'a Predictor,
    opts: PassOpts,
}

impl<'a> PassCalculator<'a> {
    /// Builds a new [PassCalculator] using the [PassOpts] of this [Predictor].
    pub fn new(predictor: &'a Predictor) -> Self {
        Self {
            predictor,
            opts: predictor.cfg().pass,
        }
    }

    /// Computes the passes above `mask_deg` within `[start, end]`, sampling
    /// elevation every `step_s` seconds. Mask crossings are refined by bisection
    /// and culminations by golden section search. A pass shorter than one step
    /// may be missed entirely.
    ///
    /// A hard interpolation failure stops the scan: passes found so far
    /// are returned, along with a [ScanTruncation]. An ongoing pass is then
    /// closed at the last valid step and flagged [PassWindow::open_end].
    pub fn compute_passes(
        &self,
        mask_deg: f64,
        start: TimeValue,
        end: TimeValue,
        step_s: f64,
    ) -> Result<PassScan, Error> {
        if !(mask_deg.is_finite() && (-90.0..=90.0).contains(&mask_deg)) {
            return Err(Error::InvalidElevationMask(mask_deg));
        }
        if !(step_s.is_finite() && step_s > 0.0) {
            return Err(Error::InvalidStep(step_s));
        }
        if end < start {
            return Err(Error::InvalidTimeRange);
        }

        let mut scan = PassScan::default();

        let mut prev_t = start;
        let mut prev_elev = match self.predictor.elevation_at(start) {
            Ok(elev) => elev,
            Err(status) => {
                debug!("{}: pass scan aborted ({})", start, status);
                scan.truncation = Some(ScanTruncation {
                    time: start,
                    status,
                });
                return Ok(scan);
            },
        };

        let mut ongoing = if prev_elev >= mask_deg {
            trace!("{}: pass already in progress ({:.3}°)", start, prev_elev);
            Some(OngoingPass::new(start, prev_elev, true))
        } else {
            None
        };

        let steps = ((end - start) / step_s).ceil() as usize;

        for i in 1..=steps {
            let t = (start + i as f64 * step_s).min(end);

            let elev = match self.predictor.elevation_at(t) {
                Ok(elev) => elev,
                Err(status) => {
                    debug!("{}: pass scan truncated ({})", t, status);
                    if let Some(pass) = ongoing.take() {
                        scan.passes
                            .push(self.close_pass(pass, prev_t, mask_deg, step_s, true));
                    }
                    scan.truncation = Some(ScanTruncation { time: t, status });
                    return Ok(scan);
                },
            };

            match ongoing.take() {
                None => {
                    if elev >= mask_deg {
                        let rise = self.refine_crossing(prev_t, prev_elev, t, elev, mask_deg);
                        debug!("{}: rise above {:.3}°", rise, mask_deg);
                        let mut pass = OngoingPass::new(rise, mask_deg, false);
                        pass.update(t, elev);
                        ongoing = Some(pass);
                    }
                },
                Some(mut pass) => {
                    if elev >= mask_deg {
                        pass.update(t, elev);
                        ongoing = Some(pass);
                    } else {
                        let set = self.refine_crossing(prev_t, prev_elev, t, elev, mask_deg);
                        debug!("{}: set below {:.3}°", set, mask_deg);
                        scan.passes
                            .push(self.close_pass(pass, set, mask_deg, step_s, false));
                    }
                },
            }

            prev_t = t;
            prev_elev = elev;
        }

        if let Some(pass) = ongoing.take() {
            trace!("{}: pass still in progress", end);
            scan.passes
                .push(self.close_pass(pass, end, mask_deg, step_s, true));
        }

        Ok(scan)
    }

    /// Scans independent ranges in parallel. Results are returned in the
    /// order of `ranges`, each one identical to [Self::compute_passes].
    pub fn compute_passes_for_ranges(
        &self,
        mask_deg: f64,
        ranges: &[(TimeValue, TimeValue)],
        step_s: f64,
    ) -> Result<Vec<PassScan>, Error> {
        ranges
            .par_iter()
            .map(|(start, end)| self.compute_passes(mask_deg, *start, *end, step_s))
            .collect()
    }

    fn close_pass(
        &self,
        pass: OngoingPass,
        end: TimeValue,
        mask_deg: f64,
        step_s: f64,
        open_end: bool,
    ) -> PassWindow {
        let lower = (pass.max_time - step_s).max(pass.start);
        let upper = (pass.max_time + step_s).min(end);
        let (max_elevation_time, max_elevation) =
            self.refine_maximum(lower, upper, pass.max_time, pass.max_elevation);

        PassWindow {
            start: pass.start,
            end,
            max_elevation_time,
            max_elevation,
            min_elevation_mask: mask_deg,
            open_start: pass.open_start,
            open_end,
        }
    }

    /// Refines the mask crossing between two consecutive steps by
    /// bisection, then linear interpolation within the final bracket.
    /// Falls back to linear interpolation if an evaluation fails.
    fn refine_crossing(
        &self,
        mut t_a: TimeValue,
        mut elev_a: f64,
        mut t_b: TimeValue,
        mut elev_b: f64,
        mask_deg: f64,
    ) -> TimeValue {
        let mut iter = 0;
        while t_b - t_a > self.opts.tolerance_s && iter < self.opts.max_iterations {
            let t_mid = t_a + (t_b - t_a) / 2.0;
            let Ok(elev_mid) = self.predictor.elevation_at(t_mid) else {
                break;
            };
            if (elev_mid >= mask_deg) == (elev_b >= mask_deg) {
                t_b = t_mid;
                elev_b = elev_mid;
            } else {
                t_a = t_mid;
                elev_a = elev_mid;
            }
            iter += 1;
        }

        let (f_a, f_b) = (elev_a - mask_deg, elev_b - mask_deg);
        if f_a == f_b {
            t_a + (t_b - t_a) / 2.0
        } else {
            t_a + (t_b - t_a) * (f_a / (f_a - f_b)).clamp(0.0, 1.0)
        }
    }

    /// Golden section search of the culmination within `[lower, upper]`.
    /// Never returns less than the best sampled elevation.
    fn refine_maximum(
        &self,
        mut lower: TimeValue,
        mut upper: TimeValue,
        sampled_t: TimeValue,
        sampled_elev: f64,
    ) -> (TimeValue, f64) {
        let mut best = (sampled_t, sampled_elev);
        let eval = |t: TimeValue| self.predictor.elevation_at(t).unwrap_or(f64::NEG_INFINITY);

        let mut c = upper - (upper - lower) * GOLDEN_RATIO_INV;
        let mut d = lower + (upper - lower) * GOLDEN_RATIO_INV;
        let mut elev_c = eval(c);
        let mut elev_d = eval(d);

        let mut iter = 0;
        while upper - lower > self.opts.tolerance_s && iter < self.opts.max_iterations {
            if elev_c > elev_d {
                upper = d;
                d = c;
                elev_d = elev_c;
                c = upper - (upper - lower) * GOLDEN_RATIO_INV;
                elev_c = eval(c);
            } else {
                lower = c;
                c = d;
                elev_c = elev_d;
                d = lower + (upper - lower) * GOLDEN_RATIO_INV;
                elev_d = eval(d);
            }
            iter += 1;
        }

        for candidate in [(c, elev_c), (d, elev_d)] {
            if candidate.1 > best.1 {
                best = candidate;
            }
        }
        best
    }
}
