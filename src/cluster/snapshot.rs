/// Snapshot file of a local cluster
///
/// File layout:
/// - Magic Number (8 bytes)
/// - Compression Type (1 byte)
/// - CRC32 of the payload (4 bytes)
/// - Payload Length (8 bytes)
/// - Payload (JSON list of tables, compressed)
///
/// All integers are little-endian. The checksum covers the payload as
/// stored, so corruption is detected before decompression.
use std::{fs, io::Write as _, path::Path};

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::{
    cluster::compression::{self, CompressionType},
    schema::TableDescriptor,
    util::{Result, Slice, Status},
};

/// Magic number for snapshot files
pub const SNAPSHOT_MAGIC: u64 = 0x5743_4f4c_534e_4150;

/// Header size (magic + compression + crc + length)
pub const HEADER_SIZE: usize = 8 + 1 + 4 + 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SnapshotCell {
    pub(crate) row: Slice,
    pub(crate) family: String,
    pub(crate) qualifier: Slice,
    pub(crate) value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SnapshotTable {
    pub(crate) descriptor: TableDescriptor,
    pub(crate) enabled: bool,
    pub(crate) cells: Vec<SnapshotCell>,
}

/// Summary of a written snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub tables: usize,
    pub cells: usize,
    pub file_size: u64,
}

pub(crate) fn encode(tables: &[SnapshotTable], compression: CompressionType) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(tables)?;
    let payload = compression::compress(compression, &json)?;

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&payload);
    let crc = hasher.finalize();

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u64_le(SNAPSHOT_MAGIC);
    buf.put_u8(compression as u8);
    buf.put_u32_le(crc);
    buf.put_u64_le(payload.len() as u64);
    buf.put_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode(data: &[u8]) -> Result<Vec<SnapshotTable>> {
    if data.len() < HEADER_SIZE {
        return Err(Status::corruption("snapshot too short"));
    }

    let mut buf = data;
    if buf.get_u64_le() != SNAPSHOT_MAGIC {
        return Err(Status::corruption("bad snapshot magic number"));
    }
    let compression = CompressionType::from_u8(buf.get_u8())
        .ok_or_else(|| Status::corruption("unknown snapshot compression type"))?;
    let expected_crc = buf.get_u32_le();
    let len = buf.get_u64_le() as usize;
    if buf.remaining() != len {
        return Err(Status::corruption(format!(
            "snapshot payload length mismatch: header says {len}, found {}",
            buf.remaining()
        )));
    }

    let payload = buf.chunk();
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(payload);
    if hasher.finalize() != expected_crc {
        return Err(Status::corruption("snapshot checksum mismatch"));
    }

    let json = compression::decompress(compression, payload)?;
    let tables = serde_json::from_slice(&json)?;
    Ok(tables)
}

/// Writes the snapshot through a temporary file in the target directory and
/// renames it into place, so a crash never leaves a truncated snapshot.
pub(crate) fn write_file(
    path: &Path,
    tables: &[SnapshotTable],
    compression: CompressionType,
) -> Result<SnapshotInfo> {
    let data = encode(tables, compression)?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| Status::io_error(format!("failed to persist snapshot: {e}")))?;

    Ok(SnapshotInfo {
        tables: tables.len(),
        cells: tables.iter().map(|t| t.cells.len()).sum(),
        file_size: data.len() as u64,
    })
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<SnapshotTable>> {
    let data = fs::read(path)?;
    decode(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<SnapshotTable> {
        vec![SnapshotTable {
            descriptor: TableDescriptor::builder("student")
                .column_families(["grade", "info"])
                .build()
                .unwrap(),
            enabled: false,
            cells: vec![SnapshotCell {
                row: Slice::from("hr"),
                family: "grade".to_string(),
                qualifier: Slice::from("math"),
                value: b"100".to_vec(),
            }],
        }]
    }

    #[test]
    fn test_encode_decode_each_compression() {
        let tables = sample();
        for compression in [
            CompressionType::None,
            CompressionType::Snappy,
            CompressionType::Lz4,
        ] {
            let data = encode(&tables, compression).unwrap();
            assert_eq!(decode(&data).unwrap(), tables);
        }
    }

    #[test]
    fn test_flipped_payload_byte_is_detected() {
        let mut data = encode(&sample(), CompressionType::None).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0xff;
        let err = decode(&data).unwrap_err();
        assert!(err.is_corruption());
        assert!(err.message().unwrap().contains("checksum"));
    }

    #[test]
    fn test_truncated_and_bad_magic() {
        let data = encode(&sample(), CompressionType::Snappy).unwrap();
        assert!(decode(&data[..HEADER_SIZE - 1]).unwrap_err().is_corruption());
        assert!(decode(&data[..data.len() - 1]).unwrap_err().is_corruption());

        let mut bad = data.clone();
        bad[0] ^= 0x01;
        assert!(decode(&bad).unwrap_err().is_corruption());
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cluster.snap");

        let info = write_file(&path, &sample(), CompressionType::Lz4).unwrap();
        assert_eq!(info.tables, 1);
        assert_eq!(info.cells, 1);
        assert_eq!(info.file_size, fs::metadata(&path).unwrap().len());

        assert_eq!(read_file(&path).unwrap(), sample());
    }
}
