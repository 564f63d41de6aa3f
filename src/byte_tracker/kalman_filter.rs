use crate::error::TrackError;
use nalgebra::{DMatrix, SMatrix};

/* -----------------------------------------------------------------------------
 * Type aliases
 * ----------------------------------------------------------------------------- */
// 1x4
pub type DetectBox = SMatrix<f32, 1, 4>;
// 1x8
pub type StateMean = SMatrix<f32, 1, 8>;
// 8x8
pub type StateCov = SMatrix<f32, 8, 8>;
// 1x4
pub type StateHMean = SMatrix<f32, 1, 4>;
// 4x4
pub type StateHCov = SMatrix<f32, 4, 4>;

/* -----------------------------------------------------------------------------
 * Gating metric
 * ----------------------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatingMetric {
    /// Squared Euclidean distance in projected measurement space.
    Gaussian,
    /// Squared Mahalanobis distance under the projected covariance.
    Maha,
}

/* -----------------------------------------------------------------------------
 * Kalman Filter
 * ----------------------------------------------------------------------------- */
// Constant-velocity filter over (cx, cy, a, h) and their velocities,
// dt = 1. Noise standard deviations scale with the current height except
// for the aspect-ratio components, which use small fixed constants.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    std_weight_position: f32,
    std_weight_velocity: f32,
    motion_mat: SMatrix<f32, 8, 8>, // 8x8
    update_mat: SMatrix<f32, 4, 8>, // 4x8
}

impl KalmanFilter {
    pub fn new(
        std_weight_position: f32,
        std_weight_velocity: f32,
    ) -> Self {
        let ndim = 4;
        let dt = 1.0;

        let mut motion_mat = SMatrix::<f32, 8, 8>::identity();
        for i in 0..ndim {
            motion_mat[(i, i + ndim)] = dt;
        }

        // 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        // 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        // 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        // 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0,
        let mut update_mat = SMatrix::<f32, 4, 8>::zeros();
        update_mat[(0, 0)] = 1.0;
        update_mat[(1, 1)] = 1.0;
        update_mat[(2, 2)] = 1.0;
        update_mat[(3, 3)] = 1.0;

        Self {
            std_weight_position,
            std_weight_velocity,
            motion_mat,
            update_mat,
        }
    }

    /// Start a new state from an (cx, cy, a, h) measurement. Velocities
    /// are zero; the initial uncertainty scales with the measured height.
    pub fn initiate(
        &self,
        measurement: &DetectBox,
    ) -> (StateMean, StateCov) {
        let mut mean = StateMean::zeros();
        mean.as_mut_slice()[0..4].copy_from_slice(measurement.as_slice());

        let measure_val = measurement[(0, 3)];
        let mut std = SMatrix::<f32, 1, 8>::zeros();
        std[0] = 2.0 * self.std_weight_position * measure_val;
        std[1] = 2.0 * self.std_weight_position * measure_val;
        std[2] = 1e-2;
        std[3] = 2.0 * self.std_weight_position * measure_val;
        std[4] = 10.0 * self.std_weight_velocity * measure_val;
        std[5] = 10.0 * self.std_weight_velocity * measure_val;
        std[6] = 1e-5;
        std[7] = 10.0 * self.std_weight_velocity * measure_val;

        let tmp = std.component_mul(&std);
        let covariance = SMatrix::<f32, 8, 8>::from_diagonal(&tmp.transpose());
        (mean, covariance)
    }

    /// One constant-velocity step. The process noise is built from the
    /// pre-predict mean.
    pub fn predict(
        &self,
        mean: &StateMean,
        covariance: &StateCov,
    ) -> (StateMean, StateCov) {
        let mut std = SMatrix::<f32, 1, 8>::zeros();
        std[0] = self.std_weight_position * mean[(0, 3)];
        std[1] = self.std_weight_position * mean[(0, 3)];
        std[2] = 1e-2;
        std[3] = self.std_weight_position * mean[(0, 3)];
        std[4] = self.std_weight_velocity * mean[(0, 3)];
        std[5] = self.std_weight_velocity * mean[(0, 3)];
        std[6] = 1e-5;
        std[7] = self.std_weight_velocity * mean[(0, 3)];

        let tmp = std.component_mul(&std);
        let motion_cov = SMatrix::<f32, 8, 8>::from_diagonal(&tmp.transpose());

        let new_mean = (self.motion_mat * mean.transpose()).transpose();
        let new_covariance =
            self.motion_mat * covariance * self.motion_mat.transpose()
                + motion_cov;
        (new_mean, new_covariance)
    }

    /// Batched `predict`, one state per slot. Each slot gets its own
    /// process noise from that slot's mean.
    pub fn multi_predict(
        &self,
        means: &mut [StateMean],
        covariances: &mut [StateCov],
    ) {
        debug_assert_eq!(means.len(), covariances.len());
        for (mean, covariance) in means.iter_mut().zip(covariances.iter_mut())
        {
            let (new_mean, new_covariance) = self.predict(mean, covariance);
            *mean = new_mean;
            *covariance = new_covariance;
        }
    }

    /// Project the state into measurement space.
    pub fn project(
        &self,
        mean: &StateMean,
        covariance: &StateCov,
    ) -> (StateHMean, StateHCov) {
        let std = SMatrix::<f32, 1, 4>::from_iterator([
            self.std_weight_position * mean[(0, 3)],
            self.std_weight_position * mean[(0, 3)],
            1e-2,
            self.std_weight_position * mean[(0, 3)],
        ]);

        // update_mat: 4x8, mean: 1x8
        let projected_mean = mean * self.update_mat.transpose();

        let diag = SMatrix::<f32, 4, 4>::from_diagonal(&std.transpose());
        let innovation_cov = diag.component_mul(&diag);
        let cov = self.update_mat * covariance * self.update_mat.transpose();
        (projected_mean, cov + innovation_cov)
    }

    /// Kalman correction step. The gain comes from a Cholesky solve of the
    /// projected covariance; a factorization failure leaves the inputs
    /// untouched and is reported to the caller.
    pub fn update(
        &self,
        mean: &StateMean,      // 1x8
        covariance: &StateCov, // 8x8
        measurement: &DetectBox,
    ) -> Result<(StateMean, StateCov), TrackError> {
        if measurement.iter().any(|value| !value.is_finite()) {
            return Err(TrackError::NonFiniteMeasurement(format!(
                "kalman update measurement {:?}",
                measurement.as_slice()
            )));
        }

        let (projected_mean, projected_covariance) =
            self.project(mean, covariance);

        let b = (covariance * self.update_mat.transpose()).transpose();
        let cholesky_factor = projected_covariance
            .cholesky()
            .ok_or(TrackError::NonPositiveDefinite)?;
        // kalman_gain: 4x8
        let kalman_gain = cholesky_factor.solve(&b);
        // innovation: 1x4
        let innovation = measurement - projected_mean;

        let new_mean = mean + innovation * kalman_gain;
        let new_covariance = covariance
            - kalman_gain.transpose() * projected_covariance * kalman_gain;
        Ok((new_mean, new_covariance))
    }

    /// Squared distance between the projected state and a batch of
    /// measurements, one row per measurement. `only_position` restricts
    /// the comparison to the (cx, cy) components.
    pub fn gating_distance(
        &self,
        mean: &StateMean,
        covariance: &StateCov,
        measurements: &DMatrix<f32>,
        only_position: bool,
        metric: GatingMetric,
    ) -> Result<Vec<f32>, TrackError> {
        let dim = if only_position { 2 } else { 4 };
        if measurements.ncols() < dim {
            return Err(TrackError::InvalidInput(format!(
                "gating measurements need at least {} columns, got {}",
                dim,
                measurements.ncols()
            )));
        }

        let (projected_mean, projected_covariance) =
            self.project(mean, covariance);

        let n_measurements = measurements.nrows();
        let mut residuals = DMatrix::<f32>::zeros(n_measurements, dim);
        for row in 0..n_measurements {
            for col in 0..dim {
                let value = measurements[(row, col)];
                if !value.is_finite() {
                    return Err(TrackError::NonFiniteMeasurement(format!(
                        "gating measurement ({}, {})",
                        row, col
                    )));
                }
                residuals[(row, col)] = value - projected_mean[(0, col)];
            }
        }

        match metric {
            GatingMetric::Gaussian => Ok((0..n_measurements)
                .map(|row| {
                    residuals.row(row).iter().map(|d| d * d).sum::<f32>()
                })
                .collect()),
            GatingMetric::Maha => {
                let mut cov = DMatrix::<f32>::zeros(dim, dim);
                for row in 0..dim {
                    for col in 0..dim {
                        cov[(row, col)] = projected_covariance[(row, col)];
                    }
                }
                let cholesky = cov
                    .cholesky()
                    .ok_or(TrackError::NonPositiveDefinite)?;
                let z = cholesky
                    .l()
                    .solve_lower_triangular(&residuals.transpose())
                    .ok_or(TrackError::NonPositiveDefinite)?;
                Ok((0..n_measurements)
                    .map(|col| z.column(col).iter().map(|d| d * d).sum::<f32>())
                    .collect())
            }
        }
    }
}
