//! CSS-like `blur()` and `contrast()` on premultiplied pixmaps.

use tiny_skia::{Pixmap, PremultipliedColorU8};

fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma.abs() * 3.0).ceil() as usize;
    if radius == 0 {
        return Vec::new();
    }

    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=radius * 2)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

fn to_pixel(c: [f32; 4]) -> PremultipliedColorU8 {
    let a = c[3].round().clamp(0.0, 255.0) as u8;
    let channel = |v: f32| (v.round().clamp(0.0, 255.0) as u8).min(a);
    PremultipliedColorU8::from_rgba(channel(c[0]), channel(c[1]), channel(c[2]), a)
        .unwrap_or(PremultipliedColorU8::TRANSPARENT)
}

/// Separable gaussian blur with edge clamping.
pub fn gaussian_blur(pixmap: &mut Pixmap, sigma: f32) {
    let kernel = gaussian_kernel(sigma);
    if kernel.is_empty() {
        return;
    }
    let radius = (kernel.len() / 2) as isize;
    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;

    let src: Vec<[f32; 4]> = pixmap
        .pixels()
        .iter()
        .map(|p| [p.red() as f32, p.green() as f32, p.blue() as f32, p.alpha() as f32])
        .collect();

    let mut horizontal = vec![[0.0f32; 4]; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f32; 4];
            for (i, weight) in kernel.iter().enumerate() {
                let cx = (x as isize + i as isize - radius).clamp(0, width as isize - 1) as usize;
                let sample = src[y * width + cx];
                for c in 0..4 {
                    acc[c] += sample[c] * weight;
                }
            }
            horizontal[y * width + x] = acc;
        }
    }

    let pixels = pixmap.pixels_mut();
    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f32; 4];
            for (i, weight) in kernel.iter().enumerate() {
                let cy = (y as isize + i as isize - radius).clamp(0, height as isize - 1) as usize;
                let sample = horizontal[cy * width + x];
                for c in 0..4 {
                    acc[c] += sample[c] * weight;
                }
            }
            pixels[y * width + x] = to_pixel(acc);
        }
    }
}

/// `contrast(amount)`: scales each unpremultiplied channel around 0.5.
pub fn contrast(pixmap: &mut Pixmap, amount: f32) {
    if (amount - 1.0).abs() < f32::EPSILON {
        return;
    }
    for pixel in pixmap.pixels_mut() {
        let a = pixel.alpha();
        if a == 0 {
            continue;
        }
        let alpha = a as f32 / 255.0;
        let adjust = |v: u8| {
            let straight = v as f32 / 255.0 / alpha;
            let adjusted = ((straight - 0.5) * amount + 0.5).clamp(0.0, 1.0);
            adjusted * alpha * 255.0
        };
        *pixel = to_pixel([
            adjust(pixel.red()),
            adjust(pixel.green()),
            adjust(pixel.blue()),
            a as f32,
        ]);
    }
}
