//! Windowed magnitude spectrum for voice analysis.

use std::f32::consts::PI;

/// Window applied to the analysis frame before the FFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FftWindow {
    #[default]
    Rectangular,
    Triangle,
    Hamming,
    Hanning,
    Blackman,
    BlackmanHarris,
}

impl FftWindow {
    /// Coefficient for sample `index` of an `len`-sample frame.
    pub fn coefficient(self, index: usize, len: usize) -> f32 {
        if len <= 1 {
            return 1.0;
        }
        let x = index as f32 / (len - 1) as f32;
        match self {
            FftWindow::Rectangular => 1.0,
            FftWindow::Triangle => 1.0 - (2.0 * x - 1.0).abs(),
            FftWindow::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
            FftWindow::Hanning => 0.5 - 0.5 * (2.0 * PI * x).cos(),
            FftWindow::Blackman => {
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            }
            FftWindow::BlackmanHarris => {
                0.35875 - 0.48829 * (2.0 * PI * x).cos() + 0.14128 * (4.0 * PI * x).cos()
                    - 0.01168 * (6.0 * PI * x).cos()
            }
        }
    }
}

/// Write `|X[k]| / N` for the first `spectrum.len()` bins of the FFT of
/// `frame` after windowing. `frame` is expected to hold `2 * spectrum.len()`
/// samples.
pub fn magnitude_spectrum(frame: &[f32], spectrum: &mut [f32], window: FftWindow) {
    spectrum.fill(0.0);
    if frame.is_empty() || spectrum.is_empty() {
        return;
    }
    let len = frame.len();
    let windowed: Vec<f32> = frame
        .iter()
        .enumerate()
        .map(|(i, &s)| s * window.coefficient(i, len))
        .collect();
    fft::magnitudes(windowed, spectrum);
}

#[cfg(feature = "real-fft")]
mod fft {
    use realfft::RealFftPlanner;

    pub(super) fn magnitudes(mut windowed: Vec<f32>, spectrum: &mut [f32]) {
        let len = windowed.len();
        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(len);
        let mut bins = r2c.make_output_vec();
        if let Err(err) = r2c.process(&mut windowed, &mut bins) {
            log::warn!("spectrum fft failed: {}", err);
            return;
        }
        let norm = len as f32;
        for (out, bin) in spectrum.iter_mut().zip(bins.iter()) {
            *out = bin.norm() / norm;
        }
    }
}

#[cfg(all(not(feature = "real-fft"), feature = "complex-fft"))]
mod fft {
    use rustfft::{num_complex::Complex, FftPlanner};

    pub(super) fn magnitudes(windowed: Vec<f32>, spectrum: &mut [f32]) {
        let len = windowed.len();
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(len);
        let mut buffer: Vec<Complex<f32>> = windowed
            .into_iter()
            .map(|re| Complex { re, im: 0.0 })
            .collect();
        fft.process(&mut buffer);
        let norm = len as f32;
        for (out, bin) in spectrum.iter_mut().zip(buffer.iter().take(len / 2 + 1)) {
            *out = bin.norm() / norm;
        }
    }
}

#[cfg(all(not(feature = "real-fft"), not(feature = "complex-fft")))]
mod fft {
    pub(super) fn magnitudes(_windowed: Vec<f32>, _spectrum: &mut [f32]) {
        log::warn!("spectrum analysis needs the real-fft or complex-fft feature");
    }
}
