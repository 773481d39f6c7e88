use std::collections::HashMap;

use tracing::{info, warn};

use manioc_common::is_blank;
use manioc_persistence::SameConfigPolicy;

use crate::error::{TransferError, TransferResult};
use crate::model::{CloneConfigBean, CloneResult, ConfigEntry, FailureKind, Outcome};

use super::ConfigTransferService;

/// Non blank override, else the original value
fn pick(override_value: Option<&String>, original: &str) -> String {
    match override_value {
        Some(v) if !is_blank(v) => v.clone(),
        _ => original.to_string(),
    }
}

impl ConfigTransferService {
    /// Copy stored configs into `namespace`, renaming per selection
    ///
    /// When one id is selected twice the first selection's renames apply.
    pub async fn clone_configs(
        &self,
        beans: &[CloneConfigBean],
        namespace: &str,
        policy: SameConfigPolicy,
        src_user: &str,
        src_ip: &str,
        request_ip_app: Option<&str>,
    ) -> TransferResult<Outcome<CloneResult>> {
        if beans.is_empty() {
            return Ok(Outcome::fail(FailureKind::NoSelection));
        }
        if self.namespace_missing(namespace).await? {
            warn!(namespace, "Clone rejected, namespace does not exist");
            return Ok(Outcome::fail(FailureKind::NamespaceNotFound));
        }

        let mut selections: HashMap<i64, &CloneConfigBean> = HashMap::with_capacity(beans.len());
        let mut ids = Vec::with_capacity(beans.len());
        for bean in beans {
            if !selections.contains_key(&bean.cfg_id) {
                selections.insert(bean.cfg_id, bean);
                ids.push(bean.cfg_id);
            }
        }

        let sources = self
            .persistence
            .config_find_by_ids(&ids)
            .await
            .map_err(TransferError::Persistence)?;
        if sources.is_empty() {
            warn!(?ids, "Clone rejected, no selected config exists");
            return Ok(Outcome::fail(FailureKind::DataEmpty));
        }

        let entries: Vec<ConfigEntry> = sources
            .into_iter()
            .map(|source| {
                let selection = selections.get(&source.id);
                ConfigEntry {
                    data_id: pick(selection.and_then(|s| s.data_id.as_ref()), &source.data_id),
                    group: pick(selection.and_then(|s| s.group.as_ref()), &source.group),
                    namespace: namespace.to_string(),
                    content: source.content,
                    encrypted_data_key: source.encrypted_data_key,
                    config_type: source.config_type,
                    desc: source.desc,
                    app_name: if is_blank(&source.app_name) {
                        String::new()
                    } else {
                        source.app_name
                    },
                    created_by: src_user.to_string(),
                }
            })
            .collect();

        let outcome = self
            .persist_and_notify(&entries, src_user, src_ip, request_ip_app, policy)
            .await?;
        let result = CloneResult::from(outcome);

        info!(namespace, selected = ids.len(), succ = result.succ_count, "Cloned configs");
        Ok(Outcome::Success(result))
    }
}
