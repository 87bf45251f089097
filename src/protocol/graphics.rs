//! # Raster Graphics Framing (GS v 0)
//!
//! Packs a monochrome ticket raster into `GS v 0` raster bit-image commands,
//! one command per chunk of rows.
//!
//! ## Bit Packing
//!
//! Each byte holds 8 horizontal dots:
//! - Bit 7 (MSB) = leftmost dot
//! - 1 = ink (source pixel value 0), 0 = paper
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```
//!
//! Rows whose width is not a multiple of 8 are padded with paper bits.
//!
//! ## Command Layout
//!
//! | Format  | Bytes |
//! |---------|-------|
//! | ASCII   | GS v 0 m xL xH yL yH d1...dk |
//! | Hex     | 1D 76 30 00 xL xH yL yH d1...dk |
//!
//! - `m`: 0 (normal density)
//! - `xL, xH`: width in bytes, `ceil(width / 8)`
//! - `yL, yH`: rows in this chunk
//! - `k = width_bytes × rows`
//!
//! ## Chunking
//!
//! Long tickets are split so the device buffer is never flooded:
//!
//! ```text
//! 500 rows, 192 per chunk → 192 + 192 + 116
//! ```

use super::commands::{GS, u16_le};
use crate::render::dither::BLACK;

/// Default rows per raster command.
pub const DEFAULT_CHUNK_ROWS: usize = 192;

/// Size of the `GS v 0` header.
pub const HEADER_LEN: usize = 8;

/// Pack one row of pixels (0 = ink) into MSB-first bytes.
///
/// ```
/// use ticketera::protocol::graphics::pack_row;
///
/// assert_eq!(pack_row(&[0, 0, 0, 0, 255, 255, 255, 255]), vec![0xF0]);
/// // 12 pixels pack into 2 bytes (4 bits padding)
/// assert_eq!(pack_row(&[0; 12]), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len().div_ceil(8)];
    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel == BLACK {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }
    bytes
}

/// `GS v 0` header for a block of `width_bytes` × `rows`.
pub fn raster_header(width_bytes: u16, rows: u16) -> [u8; HEADER_LEN] {
    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(rows);
    [GS, b'v', b'0', 0, xl, xh, yl, yh]
}

/// Frame `rows` rows of `data` starting at row `y0` as one raster command.
pub fn raster_segment(data: &[u8], width: usize, y0: usize, rows: usize) -> Vec<u8> {
    let width_bytes = width.div_ceil(8);
    debug_assert!(
        data.len() >= (y0 + rows) * width,
        "Raster data too short for rows {}..{}",
        y0,
        y0 + rows
    );

    let mut cmd = Vec::with_capacity(HEADER_LEN + width_bytes * rows);
    cmd.extend_from_slice(&raster_header(width_bytes as u16, rows as u16));
    for row in data[y0 * width..(y0 + rows) * width].chunks_exact(width.max(1)) {
        cmd.extend(pack_row(row));
    }
    cmd
}

/// Split a full raster into framed chunks of at most `chunk_rows` rows.
///
/// ```
/// use ticketera::protocol::graphics;
///
/// let raster = vec![255u8; 384 * 500];
/// let chunks = graphics::frame_raster(&raster, 384, 500, 192);
///
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(&chunks[2][..8], &[0x1D, 0x76, 0x30, 0x00, 48, 0, 116, 0]);
/// assert_eq!(chunks[2].len(), 8 + 48 * 116);
/// ```
pub fn frame_raster(data: &[u8], width: usize, height: usize, chunk_rows: usize) -> Vec<Vec<u8>> {
    let chunk_rows = chunk_rows.max(1);
    (0..height)
        .step_by(chunk_rows)
        .map(|y0| {
            let rows = chunk_rows.min(height - y0);
            let segment = raster_segment(data, width, y0, rows);
            tracing::debug!(y0, rows, bytes = segment.len(), "raster chunk framed");
            segment
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::dither::WHITE;

    #[test]
    fn test_pack_row_8_pixels() {
        assert_eq!(pack_row(&[BLACK; 8]), vec![0xFF]);
        assert_eq!(pack_row(&[WHITE; 8]), vec![0x00]);
        assert_eq!(
            pack_row(&[BLACK, WHITE, BLACK, WHITE, BLACK, WHITE, BLACK, WHITE]),
            vec![0xAA]
        );
    }

    #[test]
    fn test_pack_row_padding() {
        let packed = pack_row(&[BLACK; 9]);
        assert_eq!(packed, vec![0xFF, 0x80]);
        assert_eq!(pack_row(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_header() {
        assert_eq!(
            raster_header(48, 192),
            [0x1D, 0x76, 0x30, 0x00, 48, 0, 192, 0]
        );
        // 300 rows = 0x012C
        assert_eq!(
            raster_header(0x0102, 300),
            [0x1D, 0x76, 0x30, 0x00, 0x02, 0x01, 0x2C, 0x01]
        );
    }

    #[test]
    fn test_chunk_sizes() {
        let (w, h) = (20, 450);
        let data = vec![WHITE; w * h];
        let chunks = frame_raster(&data, w, h, 192);
        let rows: Vec<usize> = chunks.iter().map(|c| c[6] as usize | (c[7] as usize) << 8).collect();
        assert_eq!(rows, vec![192, 192, 66]);
        for (chunk, rows) in chunks.iter().zip(rows) {
            // ceil(20 / 8) = 3 bytes per row
            assert_eq!(chunk[4], 3);
            assert_eq!(chunk.len(), HEADER_LEN + 3 * rows);
        }
    }

    #[test]
    fn test_all_white_packs_to_zero() {
        let data = vec![WHITE; 64 * 10];
        for chunk in frame_raster(&data, 64, 10, 4) {
            assert!(chunk[HEADER_LEN..].iter().all(|&b| b == 0x00));
        }
    }

    #[test]
    fn test_all_black_packs_to_ff() {
        let data = vec![BLACK; 64 * 10];
        for chunk in frame_raster(&data, 64, 10, 4) {
            assert!(chunk[HEADER_LEN..].iter().all(|&b| b == 0xFF));
        }
    }

    #[test]
    fn test_segment_offsets_rows() {
        // Row 0 white, row 1 black
        let mut data = vec![WHITE; 8 * 2];
        data[8..].fill(BLACK);
        let seg = raster_segment(&data, 8, 1, 1);
        assert_eq!(seg, vec![0x1D, 0x76, 0x30, 0x00, 1, 0, 1, 0, 0xFF]);
    }

    #[test]
    fn test_empty_raster_has_no_chunks() {
        assert!(frame_raster(&[], 384, 0, 192).is_empty());
    }
}
