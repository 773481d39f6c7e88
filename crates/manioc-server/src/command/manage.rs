//! delete, detail, publish and namespace commands

use manioc_common::is_blank;
use manioc_config::{ConfigEntry, infer_config_type};
use manioc_persistence::NamespacePersistence;

use super::{DeleteArgs, DetailArgs, NamespaceCommand, PublishArgs, Rendered};
use crate::model::AppState;

pub async fn delete(args: DeleteArgs, state: &AppState) -> anyhow::Result<Rendered> {
    let client_ip = args
        .client_ip
        .unwrap_or_else(|| state.configuration.server_ip());

    match state
        .transfer
        .delete_configs(&args.ids, &client_ip, &args.src_user)
        .await
    {
        Ok(deleted) => Rendered::success(deleted),
        Err(e) => Rendered::fault(&e),
    }
}

pub async fn detail(args: DetailArgs, state: &AppState) -> anyhow::Result<Rendered> {
    match state
        .transfer
        .detail_config(&args.data_id, &args.group, &args.namespace)
        .await
    {
        Ok(detail) => Rendered::success(detail),
        Err(e) => Rendered::fault(&e),
    }
}

pub async fn publish(args: PublishArgs, state: &AppState) -> anyhow::Result<Rendered> {
    let content = match (args.content, &args.file) {
        (Some(content), _) => content,
        (None, Some(file)) => tokio::fs::read_to_string(file).await?,
        (None, None) => String::new(),
    };
    let config_type = args
        .config_type
        .filter(|t| !is_blank(t))
        .unwrap_or_else(|| infer_config_type(&args.data_id));
    let src_ip = args
        .actor
        .src_ip
        .clone()
        .unwrap_or_else(|| state.configuration.server_ip());

    let entry = ConfigEntry {
        data_id: args.data_id,
        group: args.group,
        namespace: args.namespace,
        content,
        config_type,
        desc: args.desc,
        app_name: args.app_name,
        created_by: args.actor.src_user,
        ..Default::default()
    };

    match state
        .transfer
        .publish_config(entry, &src_ip, args.actor.request_ip_app.as_deref())
        .await
    {
        Ok(published) => Rendered::success(published),
        Err(e) => Rendered::fault(&e),
    }
}

pub async fn namespace(command: NamespaceCommand, state: &AppState) -> anyhow::Result<Rendered> {
    match command {
        NamespaceCommand::Create { id, name, desc } => {
            state.persistence.namespace_create(&id, &name, &desc).await?;
            Rendered::success(true)
        }
        NamespaceCommand::List => Rendered::success(state.persistence.namespace_find_all().await?),
    }
}
