//! Separable Gaussian blur with a fixed kernel side.

use super::{kernel_sigma, normalize_kernel};
use image::{ImageBuffer, Pixel};

/// Normalized 1-D Gaussian weights, `normalize_kernel(kernel_size)` taps long.
pub fn gaussian_weights(kernel_size: u32) -> Vec<f32> {
    let taps = normalize_kernel(kernel_size) as usize;
    let sigma = kernel_sigma(kernel_size);
    let half = (taps / 2) as f32;
    let scale = -0.5 / (sigma * sigma);

    let mut weights: Vec<f32> = (0..taps)
        .map(|i| {
            let d = i as f32 - half;
            (d * d * scale).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Mirror `index` into `[0, len)` without repeating the edge pixel
/// (`gfedcb|abcdefgh|gfedcba`).
fn reflect_101(mut index: i64, len: usize) -> usize {
    let len = len as i64;
    if len == 1 {
        return 0;
    }
    while index < 0 || index >= len {
        if index < 0 {
            index = -index;
        }
        if index >= len {
            index = 2 * (len - 1) - index;
        }
    }
    index as usize
}

/// Source index for every (output position, tap) pair along one axis
fn tap_table(len: usize, taps: usize) -> Vec<usize> {
    let half = (taps / 2) as i64;
    let mut table = Vec::with_capacity(len * taps);
    for pos in 0..len as i64 {
        for t in 0..taps as i64 {
            table.push(reflect_101(pos + t - half, len));
        }
    }
    table
}

/// Blur `image` with a square Gaussian kernel of side `kernel_size` (after
/// normalization). Every channel, alpha included, is filtered. Pixels past
/// the edge are mirrored, so the result depends only on `image` itself.
pub fn gaussian_blur<P>(image: &ImageBuffer<P, Vec<u8>>, kernel_size: u32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = (image.width() as usize, image.height() as usize);
    if width == 0 || height == 0 {
        return image.clone();
    }

    let channels = usize::from(P::CHANNEL_COUNT);
    let weights = gaussian_weights(kernel_size);
    let taps = weights.len();
    let src = image.as_raw();

    // Horizontal pass into a float buffer
    let columns = tap_table(width, taps);
    let mut horizontal = vec![0f32; width * height * channels];
    for y in 0..height {
        let row = y * width * channels;
        for x in 0..width {
            let sources = &columns[x * taps..(x + 1) * taps];
            for c in 0..channels {
                let mut acc = 0f32;
                for (w, &sx) in weights.iter().zip(sources) {
                    acc += w * f32::from(src[row + sx * channels + c]);
                }
                horizontal[row + x * channels + c] = acc;
            }
        }
    }

    // Vertical pass back to 8-bit
    let rows = tap_table(height, taps);
    let mut out = vec![0u8; width * height * channels];
    for y in 0..height {
        let sources = &rows[y * taps..(y + 1) * taps];
        for x in 0..width {
            for c in 0..channels {
                let offset = x * channels + c;
                let mut acc = 0f32;
                for (w, &sy) in weights.iter().zip(sources) {
                    acc += w * horizontal[sy * width * channels + offset];
                }
                out[y * width * channels + offset] = acc.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    ImageBuffer::from_raw(image.width(), image.height(), out).unwrap_or_else(|| image.clone())
}
