//! Grayscale tone adjustments for printed photos.
//!
//! All functions work in place on 8-bit luminance buffers and clamp to
//! `[0, 255]`.

/// Lower percentile used as the black point when normalising.
pub const NORMALISE_LOWER: f32 = 0.01;

/// Upper percentile used as the white point when normalising.
pub const NORMALISE_UPPER: f32 = 0.99;

#[inline]
fn clamp8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Stretch luminance so the 1st percentile maps to 0 and the 99th to 255.
///
/// Flat images (black point == white point) are left untouched.
pub fn normalise(data: &mut [u8]) {
    if data.is_empty() {
        return;
    }

    let mut histogram = [0usize; 256];
    for &v in data.iter() {
        histogram[v as usize] += 1;
    }

    let total = data.len() as f32;
    let percentile = |fraction: f32| -> u8 {
        let target = (total * fraction).floor() as usize;
        let mut seen = 0usize;
        for (value, &count) in histogram.iter().enumerate() {
            seen += count;
            if seen > target {
                return value as u8;
            }
        }
        255
    };

    let low = percentile(NORMALISE_LOWER);
    let high = percentile(NORMALISE_UPPER);
    if high <= low {
        return;
    }

    let scale = 255.0 / (high - low) as f32;
    for v in data.iter_mut() {
        *v = clamp8((*v as f32 - low as f32) * scale);
    }
}

/// Multiply brightness by `factor` (1.0 = unchanged).
pub fn modulate_brightness(data: &mut [u8], factor: f32) {
    for v in data.iter_mut() {
        *v = clamp8(*v as f32 * factor);
    }
}

/// Linear transform `v * a + b`.
pub fn linear(data: &mut [u8], a: f32, b: f32) {
    for v in data.iter_mut() {
        *v = clamp8(*v as f32 * a + b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_stretches_range() {
        let mut data: Vec<u8> = (0..200).map(|i| 50 + (i % 101) as u8).collect();
        normalise(&mut data);
        assert_eq!(*data.iter().min().unwrap(), 0);
        assert_eq!(*data.iter().max().unwrap(), 255);
    }

    #[test]
    fn test_normalise_keeps_binary_image() {
        let mut data: Vec<u8> = (0..100).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect();
        let original = data.clone();
        normalise(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn test_normalise_flat_image_unchanged() {
        let mut data = vec![90u8; 64];
        normalise(&mut data);
        assert!(data.iter().all(|&v| v == 90));
    }

    #[test]
    fn test_normalise_empty() {
        let mut data: Vec<u8> = vec![];
        normalise(&mut data);
        assert!(data.is_empty());
    }

    #[test]
    fn test_modulate_brightness() {
        let mut data = vec![0u8, 100, 200];
        modulate_brightness(&mut data, 1.4);
        assert_eq!(data, vec![0, 140, 255]);
    }

    #[test]
    fn test_linear() {
        let mut data = vec![0u8, 100, 255];
        linear(&mut data, 1.2, -10.0);
        assert_eq!(data, vec![0, 110, 255]);
    }
}
