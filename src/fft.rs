use num_complex::Complex32;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Cached forward/inverse real-FFT pair of a fixed length.
///
/// The plan computes the half-spectrum of real input (forward) and the real
/// inverse of a half-spectrum (inverse). The inverse is scaled by `1/len`
/// so that a forward/inverse round trip reproduces the input.
///
/// # Example
/// ```
/// use yingram::fft::RealFftPlan;
///
/// let plan = RealFftPlan::new(8);
/// let spectrum = plan.forward(&[1.0f32; 8]);
/// assert_eq!(spectrum.len(), 5); // 8/2 + 1
/// assert!((spectrum[0].re - 8.0).abs() < 1e-6);
/// ```
pub struct RealFftPlan {
    r2c: Arc<dyn RealToComplex<f32>>,
    c2r: Arc<dyn ComplexToReal<f32>>,
    len: usize,
}

impl RealFftPlan {
    /// Create a plan for transforms of `len` real samples (`len` > 0).
    pub fn new(len: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(len);
        let c2r = planner.plan_fft_inverse(len);
        Self { r2c, c2r, len }
    }

    /// Transform length in samples.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the plan has zero length (never true for constructed plans).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Compute the half-spectrum of `input` (length must equal `len`).
    ///
    /// Returns `len / 2 + 1` complex bins.
    pub fn forward(&self, input: &[f32]) -> Vec<Complex32> {
        let mut in_buf = input.to_vec();
        let mut spectrum = self.r2c.make_output_vec();
        let _ = self.r2c.process(&mut in_buf, &mut spectrum);
        spectrum
    }

    /// Invert a half-spectrum back to `len` real samples.
    ///
    /// The output is scaled by `1/len` to undo the forward transform's gain.
    /// The spectrum buffer is used as scratch and left in an unspecified
    /// state.
    pub fn inverse(&self, spectrum: &mut [Complex32]) -> Vec<f32> {
        let mut out = self.c2r.make_output_vec();
        let _ = self.c2r.process(spectrum, &mut out);
        let scale = 1.0 / self.len as f32;
        for v in out.iter_mut() {
            *v *= scale;
        }
        out
    }
}

#[cfg(feature = "parallel")]
const _: () = {
    fn _assert_send_sync<T: Send + Sync>() {}
    fn _check() {
        _assert_send_sync::<RealFftPlan>();
    }
};

/// Circular autocorrelation of `frame` via the power spectrum.
///
/// Computes the squared-magnitude spectrum of the frame and inverts it
/// (Wiener-Khinchin), yielding the circular autocorrelation
/// `a[tau] = sum_j frame[j] * frame[(j + tau) mod W]` for lags
/// `0..max_lag`. The transform length is exactly the frame length, with no
/// zero padding: the wrap-around terms are part of the result.
///
/// The plan's length must equal `frame.len()`, and `max_lag` must not
/// exceed it.
///
/// # Example
/// ```
/// use yingram::fft::{power_autocorrelate, RealFftPlan};
///
/// let plan = RealFftPlan::new(8);
/// let corr = power_autocorrelate(&plan, &[1.0f32; 8], 4);
/// // Circular autocorrelation of a constant signal is flat.
/// for &c in &corr {
///     assert!((c - 8.0).abs() < 1e-4);
/// }
/// ```
pub fn power_autocorrelate(plan: &RealFftPlan, frame: &[f32], max_lag: usize) -> Vec<f32> {
    let mut spectrum = plan.forward(frame);
    for c in spectrum.iter_mut() {
        *c = Complex32::new(c.norm_sqr(), 0.0);
    }
    let corr = plan.inverse(&mut spectrum);
    corr[..max_lag].to_vec()
}

/// Direct O(W * max_lag) circular autocorrelation.
///
/// Produces the same values as [`power_autocorrelate`] up to floating-point
/// tolerance; useful as a cross-check oracle for the FFT path.
pub fn autocorrelate_direct(frame: &[f32], max_lag: usize) -> Vec<f32> {
    let n = frame.len();
    let mut corr = vec![0.0f32; max_lag];
    for (tau, c) in corr.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        for j in 0..n {
            acc += frame[j] * frame[(j + tau) % n];
        }
        *c = acc;
    }
    corr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_restores_input() {
        let signal: Vec<f32> = (0..16).map(|i| (i as f32 * 0.37).sin()).collect();
        let plan = RealFftPlan::new(signal.len());
        let mut spectrum = plan.forward(&signal);
        let restored = plan.inverse(&mut spectrum);
        for (a, b) in signal.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn fft_autocorrelation_matches_direct() {
        let signal: Vec<f32> = (0..128)
            .map(|i| {
                let t = i as f32;
                (0.11 * t).sin() + 0.5 * (0.31 * t).cos()
            })
            .collect();
        let plan = RealFftPlan::new(signal.len());
        let fast = power_autocorrelate(&plan, &signal, 64);
        let slow = autocorrelate_direct(&signal, 64);
        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!((a - b).abs() < 1e-3, "fft {} vs direct {}", a, b);
        }
    }

    #[test]
    fn lag_zero_is_signal_energy() {
        let signal = vec![0.5f32, -0.25, 0.75, -1.0];
        let plan = RealFftPlan::new(signal.len());
        let corr = power_autocorrelate(&plan, &signal, 1);
        let energy: f32 = signal.iter().map(|x| x * x).sum();
        assert!((corr[0] - energy).abs() < 1e-5);
    }

    #[test]
    fn odd_length_transform() {
        let signal: Vec<f32> = (0..15).map(|i| (i as f32 * 0.7).cos()).collect();
        let plan = RealFftPlan::new(signal.len());
        let fast = power_autocorrelate(&plan, &signal, 7);
        let slow = autocorrelate_direct(&signal, 7);
        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }
}
