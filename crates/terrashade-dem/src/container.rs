//! Tile container detection and unpacking.
//!
//! SRTM tiles are distributed either as bare `.hgt` files, as `.hgt.zip`
//! archives holding exactly one member, or as gzip streams. The container is
//! recognised from its leading magic bytes, not from the file extension.

use crate::{DemError, Result};
use flate2::read::GzDecoder;
use std::io::{Read, Seek};

/// Largest payload a supported tile can have (SRTM1, 3601 x 3601 samples).
pub(crate) const MAX_TILE_BYTES: u64 = 2 * 3601 * 3601;

const ZIP_MAGIC: [u8; 4] = [b'P', b'K', 0x03, 0x04];
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// How a tile's sample bytes are wrapped on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Single-member zip archive.
    Zip,
    /// Gzip stream.
    Gzip,
    /// Uncompressed big-endian samples.
    Raw,
}

impl ContainerKind {
    /// Classify a container from the first bytes of the stream.
    pub fn detect(header: &[u8]) -> Self {
        if header.starts_with(&ZIP_MAGIC) {
            ContainerKind::Zip
        } else if header.starts_with(&GZIP_MAGIC) {
            ContainerKind::Gzip
        } else {
            ContainerKind::Raw
        }
    }

    /// Short lowercase name used in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Zip => "zip",
            ContainerKind::Gzip => "gzip",
            ContainerKind::Raw => "raw",
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read at most one byte more than the largest tile, so oversized input is
/// rejected by the size check instead of being buffered whole.
pub(crate) fn read_bounded<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.take(MAX_TILE_BYTES + 1).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Extract the single member of a zip archive.
pub(crate) fn unpack_zip<R: Read + Seek>(reader: R, lat: i32, lon: i32) -> Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(reader)?;
    if archive.len() != 1 {
        return Err(DemError::InvalidTileFormat {
            lat,
            lon,
            reason: format!("archive has {} members, expected exactly 1", archive.len()),
        });
    }
    let member = archive.by_index(0)?;
    tracing::debug!(member = member.name(), size = member.size(), "Unpacking tile archive");
    read_bounded(member)
}

/// Decompress a gzip stream.
pub(crate) fn unpack_gzip<R: Read>(reader: R) -> Result<Vec<u8>> {
    read_bounded(GzDecoder::new(reader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_detect_container() {
        assert_eq!(ContainerKind::detect(b"PK\x03\x04rest"), ContainerKind::Zip);
        assert_eq!(ContainerKind::detect(&[0x1f, 0x8b, 0x08]), ContainerKind::Gzip);
        assert_eq!(ContainerKind::detect(&[0x00, 0x10]), ContainerKind::Raw);
        assert_eq!(ContainerKind::detect(&[]), ContainerKind::Raw);
    }

    #[test]
    fn test_zip_with_two_members_is_rejected() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("a.hgt", options).unwrap();
            writer.write_all(&[0, 1]).unwrap();
            writer.start_file("b.hgt", options).unwrap();
            writer.write_all(&[0, 1]).unwrap();
            writer.finish().unwrap();
        }
        cursor.set_position(0);

        let err = unpack_zip(cursor, 47, 11).unwrap_err();
        assert!(matches!(err, DemError::InvalidTileFormat { lat: 47, lon: 11, .. }));
    }

    #[test]
    fn test_empty_zip_is_rejected() {
        let mut cursor = Cursor::new(Vec::new());
        zip::ZipWriter::new(&mut cursor).finish().unwrap();
        cursor.set_position(0);

        assert!(matches!(
            unpack_zip(cursor, 0, 0),
            Err(DemError::InvalidTileFormat { .. })
        ));
    }

    #[test]
    fn test_read_bounded_stops_past_limit() {
        let big = std::io::repeat(0u8);
        let buf = read_bounded(big).unwrap();
        assert_eq!(buf.len() as u64, MAX_TILE_BYTES + 1);
    }
}
