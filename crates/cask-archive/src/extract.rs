use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::{ArchiveError, Result};

/// Pulls a single file out of a gzip-compressed tarball.
///
/// Entries are matched by exact path, so `binary_name` must be the name the
/// file was packaged under. Both the declared entry size and the actual
/// decompressed byte count are held to `max_size`; a header that lies about
/// its size does not get around the limit.
pub fn extract_binary(archive: &[u8], binary_name: &str, max_size: u64) -> Result<Vec<u8>> {
    let mut tarball = tar::Archive::new(GzDecoder::new(archive));
    for entry in tarball.entries().map_err(ArchiveError::Corrupted)? {
        let mut entry = entry.map_err(ArchiveError::Corrupted)?;
        // Symlinks, directories and the like never count as the binary.
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path().map_err(ArchiveError::Corrupted)?;
        if path.to_str() != Some(binary_name) {
            continue;
        }

        let declared = entry.header().size().map_err(ArchiveError::Corrupted)?;
        if declared > max_size {
            return Err(ArchiveError::EntryTooLarge {
                name: binary_name.to_string(),
                limit: max_size,
            });
        }

        // The declared size comes from the archive and is not trusted with
        // a large allocation; the buffer grows as real bytes arrive.
        let mut data = Vec::with_capacity(declared.min(64 * 1024) as usize);
        let read = (&mut entry)
            .take(max_size.saturating_add(1))
            .read_to_end(&mut data)?;
        if read as u64 > max_size {
            return Err(ArchiveError::EntryTooLarge {
                name: binary_name.to_string(),
                limit: max_size,
            });
        }
        return Ok(data);
    }
    Err(ArchiveError::MissingEntry {
        name: binary_name.to_string(),
    })
}
