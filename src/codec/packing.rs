//! Texture layouts for one level of detail.
//!
//! Amplitude keeps its interleaved `(min, max)` order and maps onto a
//! two-channel texel per column. Band energies are transposed from
//! interleaved-by-pixel into one row per band so a band is a single
//! texture row.

use super::half::f32_to_f16;
use crate::waveform::WaveformLod;

/// Width of a level's textures; never zero.
pub fn texture_width(lod: &WaveformLod) -> u32 {
    lod.length_in_pixels.clamp(1, u32::MAX as usize) as u32
}

/// `[min0, max0, min1, max1, ...]` as binary16, `width * 2` values.
///
/// A zero-length level packs as one silent texel. Missing source values
/// pack as zero, so callers should validate shapes first.
pub fn pack_amplitude(lod: &WaveformLod) -> Vec<u16> {
    let width = texture_width(lod) as usize;
    let mut packed = vec![0u16; width * 2];
    for (dst, &src) in packed.iter_mut().zip(lod.amplitude.iter()) {
        *dst = f32_to_f16(src);
    }
    packed
}

/// Row-major band texture: `dst[band * width + pixel] = f16(src[pixel * band_count + band])`.
pub fn pack_bands(lod: &WaveformLod, band_count: usize) -> Vec<u16> {
    transpose_bands(&lod.band_energies, lod.length_in_pixels, band_count)
}

/// Transpose interleaved band energies into one binary16 row per band.
pub fn transpose_bands(band_energies: &[f32], length_in_pixels: usize, band_count: usize) -> Vec<u16> {
    let width = length_in_pixels.max(1);
    let band_count = band_count.max(1);
    let mut packed = vec![0u16; width * band_count];

    for band in 0..band_count {
        let row = &mut packed[band * width..(band + 1) * width];
        for (pixel, dst) in row.iter_mut().enumerate().take(length_in_pixels) {
            if let Some(&src) = band_energies.get(pixel * band_count + band) {
                *dst = f32_to_f16(src);
            }
        }
    }

    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::half::f16_to_f32;

    #[test]
    fn test_band_transpose() {
        // 2 pixels, 3 bands
        let src = [0.0, 0.25, 0.5, 0.75, 1.0, 0.125];
        let packed: Vec<f32> = transpose_bands(&src, 2, 3)
            .into_iter()
            .map(f16_to_f32)
            .collect();
        assert_eq!(packed, vec![0.0, 0.75, 0.25, 1.0, 0.5, 0.125]);
    }

    #[test]
    fn test_amplitude_keeps_pairs() {
        let lod = WaveformLod {
            samples_per_pixel: 64,
            length_in_pixels: 2,
            amplitude: vec![0.5, 1.0, 0.25, 0.75],
            band_energies: vec![0.0; 6],
        };
        let packed: Vec<f32> = pack_amplitude(&lod).into_iter().map(f16_to_f32).collect();
        assert_eq!(packed, lod.amplitude);
    }

    #[test]
    fn test_zero_length_level_packs_one_texel() {
        let lod = WaveformLod {
            samples_per_pixel: 64,
            length_in_pixels: 0,
            amplitude: vec![],
            band_energies: vec![],
        };
        assert_eq!(texture_width(&lod), 1);
        assert_eq!(pack_amplitude(&lod), vec![0, 0]);
        assert_eq!(pack_bands(&lod, 3), vec![0, 0, 0]);
    }
}
