//! Predictive motion-model tracker using ndarray and a nalgebra-based inverse.
//!
//! Constant-velocity Kalman filter over a 6-dimensional state
//! `[cx, cy, size, v_cx, v_cy, v_size]`, assuming a square target box.
//! `update` is a pure predict step (it never misses once seeded); `correct`
//! folds a fresh detection into position and size while keeping the velocity
//! estimates, which is what distinguishes this variant from plain reseeding.

use ndarray::{Array1, Array2};

use crate::tracker::base::Tracker;
use crate::tracker::bbox::BoundingBox;
use crate::video::Frame;

const STATE_DIM: usize = 6;
const MEASUREMENT_DIM: usize = 3;

/// Fixed, equal-across-channels uncertainty constants. Deliberately not a
/// tuned model.
const PROCESS_NOISE: f64 = 1e-1;
const MEASUREMENT_NOISE: f64 = 1e-1;

#[derive(Debug, Clone)]
pub struct KalmanTracker {
    transition: Array2<f64>,
    measurement: Array2<f64>,
    process_noise: Array2<f64>,
    measurement_noise: Array2<f64>,
    state: Array1<f64>,
    covariance: Array2<f64>,
    initialised: bool,
}

impl Default for KalmanTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanTracker {
    pub fn new() -> Self {
        let mut measurement = Array2::zeros((MEASUREMENT_DIM, STATE_DIM));
        for i in 0..MEASUREMENT_DIM {
            measurement[[i, i]] = 1.0;
        }

        Self {
            transition: Array2::eye(STATE_DIM),
            measurement,
            process_noise: Array2::eye(STATE_DIM) * PROCESS_NOISE,
            measurement_noise: Array2::eye(MEASUREMENT_DIM) * MEASUREMENT_NOISE,
            state: Array1::zeros(STATE_DIM),
            covariance: Array2::zeros((STATE_DIM, STATE_DIM)),
            initialised: false,
        }
    }

    /// Write the time step into the velocity columns of the transition.
    fn set_time_step(&mut self, frame_rate: f64) {
        let dt = 1.0 / frame_rate;
        for i in 0..MEASUREMENT_DIM {
            self.transition[[i, MEASUREMENT_DIM + i]] = dt;
        }
    }

    /// Square box at the current state, truncated to the pixel grid with a
    /// 1 px minimum size.
    fn state_box(&self) -> BoundingBox {
        let size = (self.state[2] as i32).max(1);
        BoundingBox::from_center(self.state[0], self.state[1], size, size)
    }
}

impl Tracker for KalmanTracker {
    fn init(&mut self, _frame: &Frame, bbox: BoundingBox, frame_rate: f64) {
        self.set_time_step(frame_rate);
        let (cx, cy) = bbox.center();
        // Size is seeded from the width; the box is treated as square from
        // here on. Velocity starts at zero, covariance at zero (the first
        // predict lifts it to the process-noise floor).
        self.state = Array1::from_vec(vec![cx, cy, bbox.width as f64, 0.0, 0.0, 0.0]);
        self.covariance = Array2::zeros((STATE_DIM, STATE_DIM));
        self.initialised = true;
    }

    fn update(&mut self, _frame: &Frame) -> Option<BoundingBox> {
        if !self.initialised {
            return None;
        }

        self.state = self.transition.dot(&self.state);
        self.covariance =
            self.transition.dot(&self.covariance).dot(&self.transition.t()) + &self.process_noise;

        Some(self.state_box())
    }

    fn correct(&mut self, frame: &Frame, bbox: BoundingBox, frame_rate: f64) {
        if !self.initialised {
            self.init(frame, bbox, frame_rate);
            return;
        }

        let (cx, cy) = bbox.center();
        let z = Array1::from_vec(vec![cx, cy, bbox.width as f64]);
        let innovation = z - self.measurement.dot(&self.state);

        // K = P * H^T * S^-1 with S = H * P * H^T + R.
        // We use nalgebra internally for the 3x3 inversion to avoid BLAS/LAPACK.
        let s = self.measurement.dot(&self.covariance).dot(&self.measurement.t())
            + &self.measurement_noise;
        let s_inv = invert_3x3(&s);

        let pht = self.covariance.dot(&self.measurement.t());
        let gain = pht.dot(&s_inv);

        self.state = &self.state + &gain.dot(&innovation);
        let identity: Array2<f64> = Array2::eye(STATE_DIM);
        self.covariance = (identity - gain.dot(&self.measurement)).dot(&self.covariance);
    }

    fn name(&self) -> &'static str {
        "kalman"
    }
}

/// Helper to invert a 3x3 matrix using nalgebra (pure Rust).
fn invert_3x3(m: &Array2<f64>) -> Array2<f64> {
    let mut nm = nalgebra::Matrix3::zeros();
    for i in 0..3 {
        for j in 0..3 {
            nm[(i, j)] = m[[i, j]];
        }
    }
    let inv = nm.try_inverse().expect("3x3 matrix inversion failed");
    let mut res = Array2::zeros((3, 3));
    for i in 0..3 {
        for j in 0..3 {
            res[[i, j]] = inv[(i, j)];
        }
    }
    res
}
