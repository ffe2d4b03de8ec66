//! Conversions between time-lag (in samples) and MIDI pitch.

pub(crate) const A4_HZ: f64 = 440.0;
pub(crate) const MIDI_A4: f64 = 69.0;

/// Convert a time-lag (in samples) to a MIDI note value.
///
/// A lag of `tau` samples corresponds to a period of `tau / sr` seconds,
/// i.e. a frequency of `sr / tau` Hz, placed on the equal-tempered scale
/// with A4 = 440 Hz = MIDI 69:
/// `m = 12 * log2(sr / (440 * tau)) + 69`.
///
/// # Example
/// ```
/// use yingram::convert::{lag_to_midi, midi_to_lag};
///
/// let lag = 64.0;
/// let midi = lag_to_midi(lag, 28160);
/// assert!((midi_to_lag(midi, 28160) - lag).abs() / lag < 1e-6);
/// ```
pub fn lag_to_midi(lag: f64, sr: u32) -> f64 {
    12.0 * (sr as f64 / (A4_HZ * lag)).log2() + MIDI_A4
}

/// Convert a MIDI note value to a fractional time-lag (in samples).
///
/// Inverse of [`lag_to_midi`]: `tau = sr / (440 * 2^((m - 69) / 12))`.
pub fn midi_to_lag(midi: f64, sr: u32) -> f64 {
    sr as f64 / (A4_HZ * 2.0f64.powf((midi - MIDI_A4) / 12.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_reference_point() {
        // At 440 * 64 Hz sampling, MIDI 69 sits exactly at lag 64.
        let lag = midi_to_lag(69.0, 28160);
        assert!((lag - 64.0).abs() < 1e-9);
        assert!((lag_to_midi(64.0, 28160) - 69.0).abs() < 1e-9);
    }

    #[test]
    fn octave_doubles_lag() {
        let sr = 16000;
        let lag = midi_to_lag(57.0, sr);
        assert!((midi_to_lag(45.0, sr) - 2.0 * lag).abs() < 1e-6);
    }

    #[test]
    fn mutual_inverse_over_lag_range() {
        let sr = 16000;
        for lag in [1.0f64, 7.0, 22.0, 100.0, 511.5, 2048.0] {
            let round = midi_to_lag(lag_to_midi(lag, sr), sr);
            assert!(
                ((round - lag) / lag).abs() < 1e-6,
                "lag {} came back as {}",
                lag,
                round
            );
        }
    }

    #[test]
    fn midi_decreases_with_lag() {
        let sr = 16000;
        let mut prev = lag_to_midi(1.0, sr);
        for tau in 2..64 {
            let m = lag_to_midi(tau as f64, sr);
            assert!(m < prev);
            prev = m;
        }
    }
}
