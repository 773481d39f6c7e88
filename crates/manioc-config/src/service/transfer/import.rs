use tracing::{info, warn};

use manioc_persistence::SameConfigPolicy;

use crate::error::TransferResult;
use crate::model::{Failure, FailureKind, ImportResult, Outcome};
use crate::service::archive::ArchiveCodec;
use crate::service::metadata::MetadataDocument;
use crate::service::reconcile::ReconciliationEngine;

use super::ConfigTransferService;

impl ConfigTransferService {
    /// Import a config archive into `namespace`
    ///
    /// A missing or zero length file is [`FailureKind::ArchiveEmpty`]. Validation failures
    /// come back as [`Outcome::Failure`] before anything is written.
    /// A corrupt archive, an encryption error or a persistence error is a fault.
    pub async fn import_archive(
        &self,
        file: Option<&[u8]>,
        namespace: &str,
        policy: SameConfigPolicy,
        src_user: &str,
        src_ip: &str,
        request_ip_app: Option<&str>,
    ) -> TransferResult<Outcome<ImportResult>> {
        let Some(file) = file.filter(|f| !f.is_empty()) else {
            return Ok(Outcome::fail(FailureKind::ArchiveEmpty));
        };
        if self.namespace_missing(namespace).await? {
            warn!(namespace, "Import rejected, namespace does not exist");
            return Ok(Outcome::fail(FailureKind::NamespaceNotFound));
        }

        let unpacked = ArchiveCodec::unpack(file)?;
        let document = match MetadataDocument::from_item(unpacked.metadata.as_ref()) {
            Ok(document) => document,
            Err(e) => {
                warn!(namespace, error = %e, "Import rejected, illegal metadata");
                return Ok(Outcome::Failure(Failure::with_message(
                    FailureKind::MetadataIllegal,
                    e.to_string(),
                )));
            }
        };

        let reconciliation = ReconciliationEngine::new(self.encryption.as_ref(), namespace, src_user)
            .reconcile(&document, unpacked.items)
            .await?;
        if reconciliation.entries.is_empty() {
            warn!(
                namespace,
                unrecognized = reconciliation.unrecognized.len(),
                "Import rejected, no config recognized in archive"
            );
            return Ok(Outcome::fail(FailureKind::DataEmpty));
        }

        let outcome = self
            .persist_and_notify(&reconciliation.entries, src_user, src_ip, request_ip_app, policy)
            .await?;
        let result = ImportResult::new(outcome, reconciliation.unrecognized);

        info!(
            namespace,
            structured = document.is_structured(),
            succ = result.succ_count,
            unrecognized = result.unrecognized_count,
            "Imported config archive"
        );
        Ok(Outcome::Success(result))
    }
}
