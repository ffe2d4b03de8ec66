//! Yingram: cumulative mean-normalized difference resampled onto the MIDI
//! pitch scale.
//!
//! The extractor frames each waveform, computes the YIN difference function
//! per frame through an FFT autocorrelation, normalizes it by its running
//! cumulative sum with a linear lag re-weighting, and linearly interpolates
//! the result onto an equal-tempered (semitone) grid of fractional lags.
//! The output is a time-pitch map analogous to a spectrogram, but built
//! from periodicity rather than spectral energy.

use crate::convert::{lag_to_midi, midi_to_lag};
use crate::fft::{power_autocorrelate, RealFftPlan};
use crate::frame;
use ndarray::{Array2, Array3, ArrayView2, ArrayViewMut1};

/// Guard against division by zero in the cumulative normalization.
const CMND_EPS: f32 = 1e-7;

/// Configuration for Yingram extraction.
///
/// This struct provides a builder pattern for configuring the extractor
/// instead of using many positional arguments.
///
/// # Example
/// ```
/// use yingram::YingramConfig;
///
/// let extractor = YingramConfig::new(16000)
///     .with_strides(160)
///     .with_lag_bounds(22, 2048)
///     .build()
///     .unwrap();
/// assert!(extractor.n_bins() > 0);
/// ```
#[derive(Debug, Clone)]
pub struct YingramConfig {
    /// Sample rate in Hz
    pub sr: u32,
    /// Number of samples between adjacent windows
    pub strides: usize,
    /// Width of the analysis window in samples
    pub window: usize,
    /// Smallest time-lag searched, in samples (`sr / fmax`)
    pub lag_min: usize,
    /// Largest time-lag searched, in samples (`sr / fmin`)
    pub lag_max: usize,
}

impl YingramConfig {
    /// Create a configuration with defaults for the given sample rate.
    pub fn new(sr: u32) -> Self {
        Self {
            sr,
            strides: 256,
            window: 2048,
            lag_min: 22,
            lag_max: 2048,
        }
    }

    /// Set the hop size in samples.
    pub fn with_strides(mut self, strides: usize) -> Self {
        self.strides = strides;
        self
    }

    /// Set the analysis window width in samples.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the searched lag range `[lag_min, lag_max)` in samples.
    pub fn with_lag_bounds(mut self, lag_min: usize, lag_max: usize) -> Self {
        self.lag_min = lag_min;
        self.lag_max = lag_max;
        self
    }

    /// Validate the configuration and construct the extractor.
    pub fn build(self) -> crate::Result<Yingram> {
        Yingram::new(self)
    }
}

impl Default for YingramConfig {
    fn default() -> Self {
        Self::new(16000)
    }
}

/// Batched Yingram extractor.
///
/// Construction validates the configuration and precomputes the MIDI
/// resampling grid; after that the extractor is a pure function of its
/// input and can be shared freely across threads.
///
/// # Example
/// ```
/// use ndarray::Array2;
/// use yingram::YingramConfig;
///
/// let extractor = YingramConfig::new(16000).build().unwrap();
/// let audio = Array2::<f32>::zeros((2, 4096));
/// let gram = extractor.compute(audio.view()).unwrap();
/// assert_eq!(gram.shape(), &[2, 4096 / 256 + 1, extractor.n_bins()]);
/// ```
#[derive(Debug, Clone)]
pub struct Yingram {
    config: YingramConfig,
    midi_min: i64,
    midi_max: i64,
    /// Fractional lag for each MIDI grid point, ascending MIDI order.
    lags: Vec<f32>,
}

impl Yingram {
    /// Validate `config` and precompute the MIDI grid.
    ///
    /// # Errors
    /// Returns `Error::InvalidSize` for zero sizes and
    /// `Error::InvalidParameter` for lag bounds that escape the window, an
    /// empty MIDI grid, or a grid point whose interpolation would index at
    /// or past `lag_max`.
    pub fn new(config: YingramConfig) -> crate::Result<Self> {
        if config.window == 0 {
            return Err(crate::Error::InvalidSize {
                name: "window",
                value: 0,
                reason: "must be > 0",
            });
        }
        if config.strides == 0 {
            return Err(crate::Error::InvalidSize {
                name: "strides",
                value: 0,
                reason: "must be > 0",
            });
        }
        if config.lag_min == 0 {
            return Err(crate::Error::InvalidSize {
                name: "lag_min",
                value: 0,
                reason: "must be > 0",
            });
        }
        if config.sr == 0 {
            return Err(crate::Error::InvalidParameter {
                name: "sr",
                value: "0".into(),
                reason: "sample rate must be > 0".into(),
            });
        }
        if config.lag_min >= config.lag_max {
            return Err(crate::Error::InvalidParameter {
                name: "lag_min",
                value: config.lag_min.to_string(),
                reason: format!("must be < lag_max ({})", config.lag_max),
            });
        }
        if config.lag_max > config.window {
            return Err(crate::Error::InvalidParameter {
                name: "lag_max",
                value: config.lag_max.to_string(),
                reason: format!("must not exceed window ({})", config.window),
            });
        }

        // MIDI grid bounds: ceil at the low end, truncation (not rounding)
        // at the high end.
        let midi_min = lag_to_midi(config.lag_max as f64, config.sr).ceil() as i64;
        let midi_max = lag_to_midi(config.lag_min as f64, config.sr) as i64;
        if midi_max < midi_min {
            return Err(crate::Error::InvalidParameter {
                name: "lag_min",
                value: config.lag_min.to_string(),
                reason: "lag range is too narrow: MIDI grid is empty".into(),
            });
        }

        let lags: Vec<f32> = (midi_min..=midi_max)
            .map(|m| midi_to_lag(m as f64, config.sr) as f32)
            .collect();
        for &lag in &lags {
            let ceil = lag.ceil();
            if !(0.0..config.lag_max as f32).contains(&ceil) {
                return Err(crate::Error::InvalidParameter {
                    name: "lag_max",
                    value: config.lag_max.to_string(),
                    reason: format!(
                        "grid lag {} interpolates at index {} outside [0, {})",
                        lag, ceil, config.lag_max
                    ),
                });
            }
        }

        Ok(Self {
            config,
            midi_min,
            midi_max,
            lags,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &YingramConfig {
        &self.config
    }

    /// Number of MIDI bins per output frame. Depends only on the
    /// configuration, never on input content.
    pub fn n_bins(&self) -> usize {
        self.lags.len()
    }

    /// Inclusive MIDI note range `(midi_min, midi_max)` of the output bins.
    pub fn midi_range(&self) -> (i64, i64) {
        (self.midi_min, self.midi_max)
    }

    /// Number of output frames for a waveform of `len` samples.
    pub fn n_frames(&self, len: usize) -> usize {
        frame::frame_count(len, self.config.strides)
    }

    /// Compute the Yingram of a batch of waveforms.
    ///
    /// # Arguments
    /// * `audio` - `(B, T)` array of `[-1, 1]`-ranged samples; rows shorter
    ///   than `T` must be zero-padded by the caller.
    ///
    /// # Returns
    /// `(B, T / strides + 1, n_bins)` array, MIDI bins in ascending order.
    ///
    /// # Errors
    /// Returns `Error::ShapeMismatch` for an empty batch and
    /// `Error::EmptyAudio` for zero-length waveforms. The call either
    /// succeeds for the whole batch or fails as a unit.
    pub fn compute(&self, audio: ArrayView2<'_, f32>) -> crate::Result<Array3<f32>> {
        let (batch, len) = audio.dim();
        if batch == 0 {
            return Err(crate::Error::ShapeMismatch {
                expected: "(B, T) with B > 0".into(),
                got: format!("({}, {})", batch, len),
            });
        }
        if len == 0 {
            return Err(crate::Error::EmptyAudio);
        }

        let plan = RealFftPlan::new(self.config.window);

        let rows: Vec<Array2<f32>> = {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                (0..batch)
                    .into_par_iter()
                    .map(|b| self.process_row(&audio.row(b).to_vec(), &plan))
                    .collect::<crate::Result<_>>()?
            }
            #[cfg(not(feature = "parallel"))]
            {
                (0..batch)
                    .map(|b| self.process_row(&audio.row(b).to_vec(), &plan))
                    .collect::<crate::Result<_>>()?
            }
        };

        let n_frames = self.n_frames(len);
        let mut out = Array3::<f32>::zeros((batch, n_frames, self.n_bins()));
        for (mut slot, row) in out.outer_iter_mut().zip(rows) {
            slot.assign(&row);
        }
        Ok(out)
    }

    /// Compute the Yingram of a single waveform.
    ///
    /// Returns a `(T / strides + 1, n_bins)` array; equivalent to
    /// [`compute`](Self::compute) with a batch of one.
    pub fn compute_single(&self, y: &[f32]) -> crate::Result<Array2<f32>> {
        if y.is_empty() {
            return Err(crate::Error::EmptyAudio);
        }
        let plan = RealFftPlan::new(self.config.window);
        self.process_row(y, &plan)
    }

    /// Cumulative mean-normalized difference of one analysis frame.
    ///
    /// The returned vector has length `lag_max`; index 0 is fixed to 1.0 by
    /// convention. This is the quantity sampled by the MIDI grid, exposed
    /// for inspection and testing.
    ///
    /// # Errors
    /// Returns `Error::ShapeMismatch` unless `frame.len()` equals the
    /// configured window.
    pub fn cmnd(&self, frame: &[f32]) -> crate::Result<Vec<f32>> {
        if frame.len() != self.config.window {
            return Err(crate::Error::ShapeMismatch {
                expected: format!("frame of {} samples", self.config.window),
                got: frame.len().to_string(),
            });
        }
        let plan = RealFftPlan::new(self.config.window);
        Ok(self.cmnd_frame(frame, &plan))
    }

    fn process_row(&self, y: &[f32], plan: &RealFftPlan) -> crate::Result<Array2<f32>> {
        let frames = frame::frame_signal(y, self.config.window, self.config.strides)?;
        let mut out = Array2::<f32>::zeros((frames.nrows(), self.n_bins()));
        let mut scratch = Vec::with_capacity(self.config.window);
        for (frame, mut row) in frames.rows().into_iter().zip(out.rows_mut()) {
            scratch.clear();
            scratch.extend(frame.iter());
            let cmnd = self.cmnd_frame(&scratch, plan);
            self.resample_to_grid(&cmnd, &mut row);
        }
        Ok(out)
    }

    /// Difference function and cumulative normalization for one frame.
    ///
    /// d[tau] = sum_j (x[j] - x[j + tau])^2 expands into two energy terms
    /// and a cross term served by the circular autocorrelation:
    /// d[tau] = c[W - 1 - tau] - 2 a[tau] + c[W] - c[tau], with
    /// c[k] the cumulative sum of squares.
    fn cmnd_frame(&self, frame: &[f32], plan: &RealFftPlan) -> Vec<f32> {
        let w = self.config.window;
        let lag_max = self.config.lag_max;

        let corr = power_autocorrelate(plan, frame, lag_max);

        let mut cumsum = vec![0.0f32; w + 1];
        for (k, &x) in frame.iter().enumerate() {
            cumsum[k + 1] = cumsum[k] + x * x;
        }

        let mut diff = vec![0.0f32; lag_max];
        for (tau, d) in diff.iter_mut().enumerate() {
            *d = cumsum[w - 1 - tau] - 2.0 * corr[tau] + cumsum[w] - cumsum[tau];
        }

        // Normalize by the running cumulative sum (inclusive of the current
        // lag), then re-weight linearly by the lag. Index 0 is defined as
        // 1.0, not computed.
        let mut cmnd = vec![1.0f32; lag_max];
        let mut running = 0.0f32;
        for (tau, (c, &d)) in cmnd.iter_mut().zip(diff.iter()).enumerate().skip(1) {
            running += d;
            *c = d * tau as f32 / (running + CMND_EPS);
        }
        cmnd
    }

    /// Linear interpolation of the CMND onto the precomputed fractional
    /// lags. Integer lags take the sample value directly.
    fn resample_to_grid(&self, cmnd: &[f32], out: &mut ArrayViewMut1<'_, f32>) {
        for (dst, &lag) in out.iter_mut().zip(&self.lags) {
            let floor = lag.floor() as usize;
            let ceil = lag.ceil() as usize;
            *dst = if ceil == floor {
                cmnd[floor]
            } else {
                cmnd[floor]
                    + (cmnd[ceil] - cmnd[floor]) * (lag - floor as f32) / (ceil - floor) as f32
            };
        }
    }
}
