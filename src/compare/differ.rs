//! Per-pixel image differencing.
//!
//! `Pixelmatch` measures colour distance in YIQ space, so small shifts that
//! the eye does not notice stay under the per-pixel threshold, and it can
//! exclude anti-aliased edge pixels from the count. Alongside the count it
//! paints a diff image: faded greyscale for unchanged pixels, red for
//! differences, yellow for anti-aliasing.

use super::codec::{CHANNELS, PixelBuffer};

/// Largest possible YIQ delta between two colours
const MAX_YIQ_DELTA: f64 = 35215.0;

/// Colour painted for counted differences
pub const DIFF_COLOR: [u8; 3] = [255, 0, 0];

/// Colour painted for pixels excluded as anti-aliasing
pub const AA_COLOR: [u8; 3] = [255, 255, 0];

/// Opacity of the unchanged background in the diff image
pub const DEFAULT_ALPHA: f64 = 0.1;

/// Outcome of diffing two equal-sized buffers
#[derive(Debug, Clone)]
pub struct PixelDiff {
    /// Number of pixels counted as different
    pub diff_pixels: u64,
    /// Visual diff image, same dimensions as the inputs
    pub diff_image: PixelBuffer,
}

/// Trait for pixel differs
///
/// Implementations may assume both buffers share dimensions; the caller
/// checks that before calling.
pub trait PixelDiffer {
    fn diff(&self, a: &PixelBuffer, b: &PixelBuffer) -> PixelDiff;
}

/// Perceptual pixel differ
#[derive(Debug, Clone, Copy)]
pub struct Pixelmatch {
    /// Per-pixel colour tolerance in `[0, 1]`; smaller is stricter
    pub threshold: f64,
    /// Count anti-aliased pixels as differences instead of excluding them
    pub include_aa: bool,
    /// Opacity of the unchanged background in the diff image
    pub alpha: f64,
}

impl Default for Pixelmatch {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            include_aa: false,
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl Pixelmatch {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    pub fn include_aa(mut self, include_aa: bool) -> Self {
        self.include_aa = include_aa;
        self
    }

}

impl PixelDiffer for Pixelmatch {
    fn diff(&self, a: &PixelBuffer, b: &PixelBuffer) -> PixelDiff {
        debug_assert!(a.same_dimensions(b), "pixel differ requires equal dimensions");

        let width = a.width();
        let height = a.height();
        let img1 = a.as_bytes();
        let img2 = b.as_bytes();
        let mut output = PixelBuffer::new(width, height);

        if img1 == img2 {
            for pos in (0..img1.len()).step_by(CHANNELS) {
                draw_gray_pixel(img1, pos, self.alpha, output.as_bytes_mut());
            }
            return PixelDiff {
                diff_pixels: 0,
                diff_image: output,
            };
        }

        let max_delta = MAX_YIQ_DELTA * self.threshold * self.threshold;
        let mut diff_pixels = 0u64;

        for y in 0..height {
            for x in 0..width {
                let pos = (y as usize * width as usize + x as usize) * CHANNELS;
                let delta = color_delta(img1, img2, pos, pos, false);

                if delta.abs() > max_delta {
                    let anti_aliased = !self.include_aa
                        && (antialiased(img1, x, y, width, height, img2)
                            || antialiased(img2, x, y, width, height, img1));
                    if anti_aliased {
                        draw_pixel(output.as_bytes_mut(), pos, AA_COLOR);
                    } else {
                        draw_pixel(output.as_bytes_mut(), pos, DIFF_COLOR);
                        diff_pixels += 1;
                    }
                } else {
                    draw_gray_pixel(img1, pos, self.alpha, output.as_bytes_mut());
                }
            }
        }

        PixelDiff {
            diff_pixels,
            diff_image: output,
        }
    }
}

/// 3x3 neighbourhood bounds around (x, y), clamped to the image
fn neighbourhood(x: u32, y: u32, width: u32, height: u32) -> (u32, u32, u32, u32) {
    (
        x.saturating_sub(1),
        y.saturating_sub(1),
        (x + 1).min(width - 1),
        (y + 1).min(height - 1),
    )
}

/// Whether the pixel at (x1, y1) looks like an anti-aliased edge.
///
/// The pixel must have at most two identical neighbours and both a darker
/// and a brighter neighbour; the extreme neighbour must sit inside a flat
/// region in both images.
fn antialiased(img: &[u8], x1: u32, y1: u32, width: u32, height: u32, img2: &[u8]) -> bool {
    let (x0, y0, x2, y2) = neighbourhood(x1, y1, width, height);
    let pos = (y1 as usize * width as usize + x1 as usize) * CHANNELS;
    let mut zeroes = u32::from(x1 == x0 || x1 == x2 || y1 == y0 || y1 == y2);

    let mut min = 0.0;
    let mut max = 0.0;
    let mut min_xy = (0, 0);
    let mut max_xy = (0, 0);

    for x in x0..=x2 {
        for y in y0..=y2 {
            if x == x1 && y == y1 {
                continue;
            }
            let other = (y as usize * width as usize + x as usize) * CHANNELS;
            let delta = color_delta(img, img, pos, other, true);

            if delta == 0.0 {
                zeroes += 1;
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_xy = (x, y);
            } else if delta > max {
                max = delta;
                max_xy = (x, y);
            }
        }
    }

    if min == 0.0 || max == 0.0 {
        return false;
    }

    (has_many_siblings(img, min_xy.0, min_xy.1, width, height)
        && has_many_siblings(img2, min_xy.0, min_xy.1, width, height))
        || (has_many_siblings(img, max_xy.0, max_xy.1, width, height)
            && has_many_siblings(img2, max_xy.0, max_xy.1, width, height))
}

/// Whether the pixel at (x1, y1) has more than two identical neighbours
fn has_many_siblings(img: &[u8], x1: u32, y1: u32, width: u32, height: u32) -> bool {
    let (x0, y0, x2, y2) = neighbourhood(x1, y1, width, height);
    let pos = (y1 as usize * width as usize + x1 as usize) * CHANNELS;
    let mut zeroes = u32::from(x1 == x0 || x1 == x2 || y1 == y0 || y1 == y2);

    for x in x0..=x2 {
        for y in y0..=y2 {
            if x == x1 && y == y1 {
                continue;
            }
            let other = (y as usize * width as usize + x as usize) * CHANNELS;
            if img[pos..pos + CHANNELS] == img[other..other + CHANNELS] {
                zeroes += 1;
            }
            if zeroes > 2 {
                return true;
            }
        }
    }

    false
}

/// Squared YIQ distance between two pixels, signed by brightness.
///
/// Negative when the first pixel is brighter. With `y_only` the signed
/// luma difference is returned instead.
fn color_delta(img1: &[u8], img2: &[u8], k: usize, m: usize, y_only: bool) -> f64 {
    let p1 = &img1[k..k + CHANNELS];
    let p2 = &img2[m..m + CHANNELS];
    if p1 == p2 {
        return 0.0;
    }

    let (r1, g1, b1) = blend_over_white(p1);
    let (r2, g2, b2) = blend_over_white(p2);

    let y1 = rgb2y(r1, g1, b1);
    let y2 = rgb2y(r2, g2, b2);
    let y = y1 - y2;

    if y_only {
        return y;
    }

    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);
    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    if y1 > y2 { -delta } else { delta }
}

fn blend_over_white(pixel: &[u8]) -> (f64, f64, f64) {
    let (r, g, b, a) = (
        f64::from(pixel[0]),
        f64::from(pixel[1]),
        f64::from(pixel[2]),
        pixel[3],
    );
    if a == 255 {
        return (r, g, b);
    }
    let a = f64::from(a) / 255.0;
    (blend(r, a), blend(g, a), blend(b, a))
}

fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}

/// Blend a channel value toward white with opacity `a`
fn blend(c: f64, a: f64) -> f64 {
    255.0 + (c - 255.0) * a
}

fn draw_pixel(output: &mut [u8], pos: usize, color: [u8; 3]) {
    output[pos..pos + 3].copy_from_slice(&color);
    output[pos + 3] = 255;
}

fn draw_gray_pixel(img: &[u8], pos: usize, alpha: f64, output: &mut [u8]) {
    let luma = rgb2y(
        f64::from(img[pos]),
        f64::from(img[pos + 1]),
        f64::from(img[pos + 2]),
    );
    let value = blend(luma, alpha * f64::from(img[pos + 3]) / 255.0)
        .floor()
        .clamp(0.0, 255.0) as u8;
    draw_pixel(output, pos, [value, value, value]);
}
