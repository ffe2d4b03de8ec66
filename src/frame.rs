use ndarray::Array2;

/// Number of analysis frames for a signal of `len` samples.
///
/// The signal is right-padded with `window` zeros before framing, so every
/// stride position up to and including `len` starts a frame:
/// `len / strides + 1` (integer division).
pub fn frame_count(len: usize, strides: usize) -> usize {
    len / strides + 1
}

/// Slice a signal into overlapping frames, right-padding with zeros.
///
/// The signal is extended by `window` zeros on the right, then frames of
/// `window` samples are taken every `strides` samples. The output has shape
/// `(frame_count(len, strides), window)` with one row per frame.
///
/// # Errors
/// Returns `Error::InvalidSize` if `window` or `strides` is zero.
///
/// # Example
/// ```
/// use yingram::frame::frame_signal;
///
/// let signal = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let frames = frame_signal(&signal, 4, 2).unwrap();
/// assert_eq!(frames.shape(), &[4, 4]);
/// assert_eq!(frames.row(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
/// // The last frame starts at the end of the signal and is all padding.
/// assert_eq!(frames.row(3).to_vec(), vec![0.0, 0.0, 0.0, 0.0]);
/// ```
pub fn frame_signal(y: &[f32], window: usize, strides: usize) -> crate::Result<Array2<f32>> {
    if window == 0 {
        return Err(crate::Error::InvalidSize {
            name: "window",
            value: 0,
            reason: "must be > 0",
        });
    }
    if strides == 0 {
        return Err(crate::Error::InvalidSize {
            name: "strides",
            value: 0,
            reason: "must be > 0",
        });
    }

    let mut padded = vec![0.0f32; y.len() + window];
    padded[..y.len()].copy_from_slice(y);

    let n_frames = frame_count(y.len(), strides);
    let mut frames = Array2::<f32>::zeros((n_frames, window));
    for (idx, mut row) in frames.rows_mut().into_iter().enumerate() {
        let start = idx * strides;
        for (dst, &src) in row.iter_mut().zip(&padded[start..start + window]) {
            *dst = src;
        }
    }

    Ok(frames)
}
