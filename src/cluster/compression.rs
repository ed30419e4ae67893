use serde::{Deserialize, Serialize};

use crate::util::{Result, Status};

/// Compression applied to snapshot payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompressionType {
    None = 0,
    Snappy = 1,
    Lz4 = 2,
}

impl CompressionType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Snappy),
            2 => Some(CompressionType::Lz4),
            _ => None,
        }
    }
}

/// Compress data using the specified compression type
pub fn compress(compression: CompressionType, data: &[u8]) -> Result<Vec<u8>> {
    match compression {
        CompressionType::None => Ok(data.to_vec()),
        CompressionType::Snappy => compress_snappy(data),
        CompressionType::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
    }
}

/// Decompress data using the specified compression type
pub fn decompress(compression: CompressionType, data: &[u8]) -> Result<Vec<u8>> {
    match compression {
        CompressionType::None => Ok(data.to_vec()),
        CompressionType::Snappy => decompress_snappy(data),
        CompressionType::Lz4 => lz4_flex::decompress_size_prepended(data)
            .map_err(|e| Status::corruption(format!("LZ4 decompression failed: {e:?}"))),
    }
}

fn compress_snappy(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = snap::raw::Encoder::new();
    encoder
        .compress_vec(data)
        .map_err(|e| Status::io_error(format!("Snappy compression failed: {e}")))
}

fn decompress_snappy(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = snap::raw::Decoder::new();
    decoder
        .decompress_vec(data)
        .map_err(|e| Status::corruption(format!("Snappy decompression failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressors_shrink_repetitive_data() {
        let data = b"student,grade,math,100;".repeat(50);

        for compression in [CompressionType::Snappy, CompressionType::Lz4] {
            let compressed = compress(compression, &data).unwrap();
            assert!(compressed.len() < data.len(), "{compression:?}");
            assert_eq!(decompress(compression, &compressed).unwrap(), data);
        }
    }

    #[test]
    fn test_garbage_is_corruption() {
        let garbage = [0xffu8; 16];
        assert!(
            decompress(CompressionType::Snappy, &garbage)
                .unwrap_err()
                .is_corruption()
        );
        assert!(
            decompress(CompressionType::Lz4, &garbage)
                .unwrap_err()
                .is_corruption()
        );
    }

    #[test]
    fn test_from_u8() {
        assert_eq!(CompressionType::from_u8(2), Some(CompressionType::Lz4));
        assert_eq!(CompressionType::from_u8(9), None);
    }
}
