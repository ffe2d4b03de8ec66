//! WAV I/O and signal generation helpers for dataset readers and tests.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("hound error: {0}")]
    Hound(#[from] hound::Error),
    #[error("wav file contains no channels")]
    NoChannels,
}

/// Load a WAV file as a mono `f32` signal.
///
/// Integer samples are scaled to `[-1, 1]` by their bit depth; multichannel
/// files are mixed down by averaging across channels.
///
/// # Returns
/// `(samples, sample_rate)`
///
/// # Errors
/// Returns `crate::Error::Audio` if the file cannot be read or is invalid.
pub fn load_wav<P: AsRef<Path>>(path: P) -> crate::Result<(Vec<f32>, u32)> {
    let mut reader = WavReader::open(path).map_err(AudioError::Hound)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(AudioError::NoChannels.into());
    }

    let mut samples: Vec<f32> = Vec::new();
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => {
            for s in reader.samples::<f32>() {
                samples.push(s.map_err(AudioError::Hound)?);
            }
        }
        (SampleFormat::Int, bits) if bits <= 16 => {
            let scale = (1i32 << (bits - 1)) as f32;
            for s in reader.samples::<i16>() {
                samples.push(s.map_err(AudioError::Hound)? as f32 / scale);
            }
        }
        (SampleFormat::Int, bits) => {
            let scale = (1i64 << (bits - 1)) as f32;
            for s in reader.samples::<i32>() {
                samples.push(s.map_err(AudioError::Hound)? as f32 / scale);
            }
        }
    }

    if channels == 1 {
        return Ok((samples, spec.sample_rate));
    }

    let frames = samples.len() / channels;
    let mut mono = Vec::with_capacity(frames);
    for frame in 0..frames {
        let sum: f32 = samples[frame * channels..(frame + 1) * channels].iter().sum();
        mono.push(sum / channels as f32);
    }
    Ok((mono, spec.sample_rate))
}

/// Write a mono `f32` signal as 16-bit PCM WAV.
///
/// Samples are clamped to `[-1, 1]` before quantization.
pub fn save_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> crate::Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).map_err(AudioError::Hound)?;
    for &sample in samples {
        let s = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(s).map_err(AudioError::Hound)?;
    }
    writer.finalize().map_err(AudioError::Hound)?;
    Ok(())
}

/// Generate a pure sine tone.
///
/// # Example
/// ```
/// use yingram::io::tone;
///
/// let signal = tone(440.0, 16000, 0.5);
/// assert_eq!(signal.len(), 8000);
/// ```
pub fn tone(frequency: f32, sr: u32, duration: f32) -> Vec<f32> {
    let n_samples = (duration * sr as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sr as f32;
    (0..n_samples)
        .map(|i| (angular_freq * i as f32).sin())
        .collect()
}
