//! export, import and clone commands

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use manioc_config::{ArchiveFormat, Outcome};
use manioc_persistence::ExportFilter;

use super::{Actor, CloneArgs, ExportArgs, ImportArgs, Rendered};
use crate::model::AppState;

/// What `export` reports after writing the archive
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub file_name: String,
    pub path: String,
    pub format: ArchiveFormat,
    pub bytes: usize,
}

/// A directory target receives the generated file name, anything else is the file itself
fn export_target(output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

fn source_ip(actor: &Actor, state: &AppState) -> String {
    actor
        .src_ip
        .clone()
        .unwrap_or_else(|| state.configuration.server_ip())
}

pub async fn export(args: ExportArgs, state: &AppState) -> anyhow::Result<Rendered> {
    let filter = ExportFilter {
        namespace_id: args.namespace,
        group: args.group,
        data_ids: (!args.data_ids.is_empty()).then_some(args.data_ids),
        app_name: args.app_name,
        ids: args.ids,
    };
    let format = args
        .format
        .unwrap_or_else(|| state.configuration.export_format());

    let archive = match state.transfer.export_configs(&filter, format).await {
        Ok(Outcome::Success(archive)) => archive,
        Ok(Outcome::Failure(failure)) => return Rendered::outcome::<()>(Outcome::Failure(failure)),
        Err(e) => return Rendered::fault(&e),
    };

    let target = export_target(args.output.as_deref(), &archive.file_name);
    tokio::fs::write(&target, &archive.data).await?;
    info!(path = %target.display(), bytes = archive.data.len(), "Wrote export archive");

    Rendered::success(ExportSummary {
        file_name: archive.file_name,
        path: target.display().to_string(),
        format,
        bytes: archive.data.len(),
    })
}

pub async fn import(args: ImportArgs, state: &AppState) -> anyhow::Result<Rendered> {
    let data = tokio::fs::read(&args.file).await?;
    let src_ip = source_ip(&args.actor, state);

    match state
        .transfer
        .import_archive(
            Some(data.as_slice()),
            &args.namespace,
            args.policy,
            &args.actor.src_user,
            &src_ip,
            args.actor.request_ip_app.as_deref(),
        )
        .await
    {
        Ok(outcome) => Rendered::outcome(outcome),
        Err(e) => Rendered::fault(&e),
    }
}

pub async fn clone(args: CloneArgs, state: &AppState) -> anyhow::Result<Rendered> {
    let src_ip = source_ip(&args.actor, state);

    match state
        .transfer
        .clone_configs(
            &args.selections,
            &args.namespace,
            args.policy,
            &args.actor.src_user,
            &src_ip,
            args.actor.request_ip_app.as_deref(),
        )
        .await
    {
        Ok(outcome) => Rendered::outcome(outcome),
        Err(e) => Rendered::fault(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_target() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            export_target(Some(dir.path()), "config_export_1.zip"),
            dir.path().join("config_export_1.zip")
        );
        assert_eq!(
            export_target(Some(Path::new("/tmp/out.zip")), "config_export_1.zip"),
            PathBuf::from("/tmp/out.zip")
        );
        assert_eq!(
            export_target(None, "config_export_1.zip"),
            PathBuf::from("config_export_1.zip")
        );
    }
}
