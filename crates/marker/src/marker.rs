use std::io::{Read, Write};
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::delete_marker::DeleteMarker;
use crate::MarkerError;

/// Wire tag of a delete-marker section.
pub const MARKER_TYPE_DELETE: u8 = 1;

// Refuse to allocate for absurd payload lengths in corrupted files.
const MAX_MARKER_BYTES: usize = 256 * 1024 * 1024;

/// The marker state of one part: typed marker sections plus the part's
/// block count used to validate them.
///
/// The delete marker is published as an `Arc` snapshot. [`Marker::add_delete_marker`]
/// never mutates the published value; it builds a merged copy and swaps
/// the pointer, so readers holding the old snapshot are unaffected.
#[derive(Debug, Default)]
pub struct Marker {
    blocks_count: Option<u64>,
    delete: Option<Arc<DeleteMarker>>,
}

impl Marker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be called with the owning part's block count before any
    /// unmarshal or read.
    pub fn set_blocks_count(&mut self, blocks_count: u64) {
        self.blocks_count = Some(blocks_count);
    }

    /// The current delete-marker snapshot, if any rows are marked.
    pub fn delete_marker(&self) -> Option<Arc<DeleteMarker>> {
        self.delete.clone()
    }

    /// Publishes `dm` merged with the current delete marker.
    pub fn add_delete_marker(&mut self, dm: DeleteMarker) -> Result<(), MarkerError> {
        self.check_blocks(&dm)?;
        let merged = match &self.delete {
            Some(cur) => cur.merge(&dm)?,
            None => dm,
        };
        self.delete = Some(Arc::new(merged));
        Ok(())
    }

    /// Appends all marker sections, each prefixed with its type tag.
    pub fn marshal(&self, dst: &mut Vec<u8>) {
        if let Some(dm) = &self.delete {
            dst.push(MARKER_TYPE_DELETE);
            dm.marshal(dst);
        }
    }

    /// Parses marker sections from `src`. The blocks count must have been
    /// set; every referenced block id is validated against it.
    pub fn unmarshal(&mut self, src: &[u8]) -> Result<(), MarkerError> {
        if self.blocks_count.is_none() {
            return Err(MarkerError::BlocksCountNotSet);
        }
        let mut pos = 0;
        while pos < src.len() {
            let marker_type = src[pos];
            pos += 1;
            match marker_type {
                MARKER_TYPE_DELETE => {
                    if self.delete.is_some() {
                        return Err(MarkerError::DuplicateDeleteMarker);
                    }
                    let (dm, n) = DeleteMarker::unmarshal(&src[pos..])?;
                    pos += n;
                    self.check_blocks(&dm)?;
                    self.delete = Some(Arc::new(dm));
                }
                other => return Err(MarkerError::UnknownMarkerType(other)),
            }
        }
        Ok(())
    }

    /// Writes the marker as one CRC32-framed record:
    /// `[payload_len u32 LE][crc32 u32 LE][payload]`.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), MarkerError> {
        let mut payload = Vec::new();
        self.marshal(&mut payload);
        w.write_u32::<LittleEndian>(payload.len() as u32)?;
        w.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
        w.write_all(&payload)?;
        Ok(())
    }

    /// Reads one framed record and parses it into `self`, verifying the
    /// checksum first.
    pub fn read_from<R: Read>(&mut self, r: &mut R) -> Result<(), MarkerError> {
        if self.blocks_count.is_none() {
            return Err(MarkerError::BlocksCountNotSet);
        }
        let payload_len = r.read_u32::<LittleEndian>()? as usize;
        if payload_len > MAX_MARKER_BYTES {
            return Err(MarkerError::Corrupt(format!(
                "marker payload of {payload_len} bytes exceeds the {MAX_MARKER_BYTES} byte cap"
            )));
        }
        let crc = r.read_u32::<LittleEndian>()?;
        let mut payload = vec![0u8; payload_len];
        r.read_exact(&mut payload)?;
        let got = crc32fast::hash(&payload);
        if got != crc {
            return Err(MarkerError::Corrupt(format!(
                "checksum mismatch: got {got:#010x}, want {crc:#010x}"
            )));
        }
        self.unmarshal(&payload)
    }

    fn check_blocks(&self, dm: &DeleteMarker) -> Result<(), MarkerError> {
        let blocks_count = self.blocks_count.ok_or(MarkerError::BlocksCountNotSet)?;
        if let Some(max) = dm.max_block_id() {
            if u64::from(max) >= blocks_count {
                return Err(MarkerError::BlockIdOutOfRange {
                    block_id: max,
                    blocks_count,
                });
            }
        }
        Ok(())
    }
}
