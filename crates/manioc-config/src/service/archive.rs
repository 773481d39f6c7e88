//! Zip archive codec
//!
//! An archive holds at most one metadata item (`.meta` or `.metadata.yml`) and any
//! number of content items named `group/dataId`.

use std::io::{Cursor, Read, Write};

use tracing::debug;
use zip::{ZipArchive, ZipWriter, write::SimpleFileOptions};

use crate::error::TransferResult;
use crate::model::{ArchiveItem, LEGACY_METADATA_NAME, STRUCTURED_METADATA_NAME, UnpackedArchive};

pub struct ArchiveCodec;

impl ArchiveCodec {
    pub fn is_metadata_name(name: &str) -> bool {
        name == LEGACY_METADATA_NAME || name == STRUCTURED_METADATA_NAME
    }

    /// Unpack an archive, keeping content items in physical order
    ///
    /// Directory entries are skipped. Non UTF-8 content is decoded lossily.
    pub fn unpack(data: &[u8]) -> TransferResult<UnpackedArchive> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut unpacked = UnpackedArchive::default();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            // header sizes are untrusted
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)
                .map_err(|e| crate::TransferError::CorruptArchive(format!("{}: {}", name, e)))?;
            let item = ArchiveItem::new(name, String::from_utf8_lossy(&bytes));

            if Self::is_metadata_name(&item.name) {
                unpacked.metadata = Some(item);
            } else {
                unpacked.items.push(item);
            }
        }

        debug!(
            items = unpacked.items.len(),
            metadata = unpacked.metadata.as_ref().map(|m| m.name.as_str()),
            "Unpacked config archive"
        );
        Ok(unpacked)
    }

    /// Pack content items followed by the metadata item
    pub fn pack(metadata: Option<&ArchiveItem>, items: &[ArchiveItem]) -> TransferResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for item in items.iter().chain(metadata) {
            zip.start_file(item.name.as_str(), options)?;
            zip.write_all(item.content.as_bytes())
                .map_err(|e| crate::TransferError::Serialization(e.to_string()))?;
        }
        zip.finish()?;

        Ok(buffer.into_inner())
    }
}
