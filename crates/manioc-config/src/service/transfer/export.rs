use tracing::{info, warn};

use manioc_common::is_blank;
use manioc_persistence::ExportFilter;

use crate::error::{TransferError, TransferResult};
use crate::model::{
    ArchiveFormat, ArchiveItem, CanonicalMetadataEntry, ExportArchive, FailureKind, Outcome,
    infer_config_type, item_name,
};
use crate::service::archive::ArchiveCodec;
use crate::service::metadata::{render_legacy, render_structured};

use super::ConfigTransferService;

/// Export file name for the given local time
pub fn export_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("config_export_{}.zip", now.format("%Y%m%d%H%M%S"))
}

impl ConfigTransferService {
    /// Pack the configs selected by `filter` into an archive
    ///
    /// Content is decrypted before packing, so an archive never carries data keys.
    pub async fn export_configs(
        &self,
        filter: &ExportFilter,
        format: ArchiveFormat,
    ) -> TransferResult<Outcome<ExportArchive>> {
        let configs = self
            .persistence
            .config_find_for_export(filter)
            .await
            .map_err(TransferError::Persistence)?;
        if configs.is_empty() {
            warn!(namespace = %filter.namespace_id, "Export found no config");
            return Ok(Outcome::fail(FailureKind::ExportNoData));
        }

        let mut items = Vec::with_capacity(configs.len());
        let mut metadata = Vec::with_capacity(configs.len());
        for config in configs {
            let content = self
                .encryption
                .decrypt(&config.data_id, &config.encrypted_data_key, &config.content)
                .await
                .map_err(|e| TransferError::encryption(&config.data_id, e))?;

            items.push(ArchiveItem::new(item_name(&config.group, &config.data_id), content));
            metadata.push(CanonicalMetadataEntry {
                config_type: if is_blank(&config.config_type) {
                    infer_config_type(&config.data_id)
                } else {
                    config.config_type
                },
                data_id: config.data_id,
                group: config.group,
                desc: config.desc,
                app_name: config.app_name,
            });
        }

        let metadata_item = match format {
            ArchiveFormat::Structured => Some(render_structured(&metadata)?),
            ArchiveFormat::Legacy => Some(render_legacy(&metadata)).filter(|m| !m.content.is_empty()),
        };
        let data = ArchiveCodec::pack(metadata_item.as_ref(), &items)?;
        let file_name = export_file_name(chrono::Local::now());

        info!(
            namespace = %filter.namespace_id,
            %format,
            configs = items.len(),
            bytes = data.len(),
            %file_name,
            "Exported configs"
        );
        Ok(Outcome::Success(ExportArchive { file_name, data }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_export_file_name() {
        let now = chrono::Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(export_file_name(now), "config_export_20240305070809.zip");
    }
}
