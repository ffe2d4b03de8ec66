//! Yingram extraction and paired-speaker dataset preparation.
//!
//! Yingram is the cumulative mean-normalized difference function of the YIN
//! pitch algorithm resampled onto the MIDI (semitone) scale: a time-pitch
//! feature map built from periodicity rather than spectral energy, used as
//! a training signal for speech-representation models. This crate provides
//! the batched extractor plus the utilities that prepare paired-speaker
//! audio batches for it.
//!
//! # Quick Start
//!
//! ```rust
//! use yingram::{io, YingramConfig};
//!
//! // A 220 Hz tone, half a second at 16 kHz.
//! let signal = io::tone(220.0, 16000, 0.5);
//!
//! let extractor = YingramConfig::new(16000).build().unwrap();
//! let gram = extractor.compute_single(&signal).unwrap();
//! assert_eq!(gram.shape(), &[signal.len() / 256 + 1, extractor.n_bins()]);
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`yingram`] | The batched Yingram extractor |
//! | [`convert`] | Time-lag / MIDI pitch conversions |
//! | [`frame`] | Signal framing utilities |
//! | [`fft`] | Real FFT plans and circular autocorrelation |
//! | [`dataset`] | Speaker grouping, seeded pairing, batch collation |
//! | [`io`] | WAV I/O and signal generators |
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. The [`Error`] enum covers invalid
//! configuration, shape mismatches, empty audio, and I/O failures.
//!
//! # Safety
//!
//! This crate uses `#![forbid(unsafe_code)]` — no unsafe Rust anywhere.
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `parallel` | Fan extraction out across the batch axis with rayon |

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod convert;
pub mod dataset;
pub mod fft;
pub mod frame;
pub mod io;
pub mod yingram;

pub use yingram::{Yingram, YingramConfig};
