//! Command line front end
//!
//! Every command prints one JSON result payload on stdout.

mod manage;
mod transfer;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use manioc_common::DEFAULT_GROUP;
use manioc_config::{
    ArchiveFormat, CloneConfigBean, Outcome, TransferError, split_item_name,
};
use manioc_persistence::SameConfigPolicy;

use crate::model::response::{self, Result as Payload};
use crate::model::{AppState, ConfigOverrides};

#[derive(Debug, Parser)]
#[command(name = "manioc", version, about = "Config archive import, export and clone")]
pub struct Cli {
    /// Configuration file (default: conf/application.yml)
    #[arg(long, global = true, env = "MANIOC_CONF")]
    pub conf: Option<PathBuf>,
    /// Directory holding the config snapshot
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            conf: self.conf.clone(),
            data_dir: self.data_dir.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pack configs into a zip archive
    Export(ExportArgs),
    /// Import a zip archive into a namespace
    Import(ImportArgs),
    /// Copy configs into another namespace
    Clone(CloneArgs),
    /// Remove configs by id
    Delete(DeleteArgs),
    /// Show one config with its content decrypted
    Detail(DetailArgs),
    /// Create or update one config
    Publish(PublishArgs),
    #[command(subcommand)]
    Namespace(NamespaceCommand),
}

/// Who performs a write
#[derive(Debug, Clone, Args)]
pub struct Actor {
    #[arg(long = "src-user", default_value = "manioc")]
    pub src_user: String,
    /// Source ip recorded on written configs (default: manioc.server.ip)
    #[arg(long = "src-ip")]
    pub src_ip: Option<String>,
    /// Requesting application recorded in trace logs
    #[arg(long = "app")]
    pub request_ip_app: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(long, default_value = "")]
    pub namespace: String,
    #[arg(long)]
    pub group: Option<String>,
    #[arg(long = "data-id")]
    pub data_ids: Vec<String>,
    #[arg(long = "app-name")]
    pub app_name: Option<String>,
    /// Config ids, overriding every other filter
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<i64>,
    /// structured or legacy (default: manioc.config.export.format)
    #[arg(long)]
    pub format: Option<ArchiveFormat>,
    /// Target file or directory (default: current directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub file: PathBuf,
    #[arg(long, default_value = "")]
    pub namespace: String,
    #[arg(long, default_value_t = SameConfigPolicy::Abort)]
    pub policy: SameConfigPolicy,
    #[command(flatten)]
    pub actor: Actor,
}

#[derive(Debug, Args)]
pub struct CloneArgs {
    /// Target namespace
    #[arg(long)]
    pub namespace: String,
    /// `ID` or `ID=GROUP/DATA_ID`
    #[arg(long = "select", required = true, value_parser = parse_selection)]
    pub selections: Vec<CloneConfigBean>,
    #[arg(long, default_value_t = SameConfigPolicy::Abort)]
    pub policy: SameConfigPolicy,
    #[command(flatten)]
    pub actor: Actor,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[arg(long, required = true, value_delimiter = ',')]
    pub ids: Vec<i64>,
    /// Client ip recorded in trace logs (default: manioc.server.ip)
    #[arg(long = "client-ip")]
    pub client_ip: Option<String>,
    #[arg(long = "src-user", default_value = "manioc")]
    pub src_user: String,
}

#[derive(Debug, Args)]
pub struct DetailArgs {
    #[arg(long = "data-id")]
    pub data_id: String,
    #[arg(long, default_value = DEFAULT_GROUP)]
    pub group: String,
    #[arg(long, default_value = "")]
    pub namespace: String,
}

#[derive(Debug, Args)]
pub struct PublishArgs {
    #[arg(long = "data-id")]
    pub data_id: String,
    #[arg(long, default_value = DEFAULT_GROUP)]
    pub group: String,
    #[arg(long, default_value = "")]
    pub namespace: String,
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub content: Option<String>,
    /// Read the content from a file
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Config type (default: inferred from the data id extension)
    #[arg(long = "type")]
    pub config_type: Option<String>,
    #[arg(long, default_value = "")]
    pub desc: String,
    #[arg(long = "app-name", default_value = "")]
    pub app_name: String,
    #[command(flatten)]
    pub actor: Actor,
}

#[derive(Debug, Subcommand)]
pub enum NamespaceCommand {
    /// Register a namespace
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        desc: String,
    },
    /// List registered namespaces
    List,
}

/// Parse a clone selection: `12` keeps the names, `12=GROUP/new-id` renames
pub fn parse_selection(value: &str) -> Result<CloneConfigBean, String> {
    let (id, rename) = match value.split_once('=') {
        Some((id, rename)) => (id, Some(rename)),
        None => (value, None),
    };
    let cfg_id = id
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid config id '{}': {}", id, e))?;

    match rename {
        None => Ok(CloneConfigBean::new(cfg_id)),
        Some(rename) => split_item_name(rename)
            .map(|(group, data_id)| CloneConfigBean::rename(cfg_id, group, data_id))
            .ok_or_else(|| format!("rename '{}' is not GROUP/DATA_ID", rename)),
    }
}

/// A printed command result
#[derive(Debug, Clone)]
pub struct Rendered {
    pub success: bool,
    pub json: String,
}

impl Rendered {
    fn success<T: Serialize>(data: T) -> anyhow::Result<Self> {
        Ok(Self {
            success: true,
            json: serde_json::to_string_pretty(&Payload::success(data))?,
        })
    }

    fn fault(e: &TransferError) -> anyhow::Result<Self> {
        tracing::error!(error = %e, "Command failed");
        Ok(Self {
            success: false,
            json: serde_json::to_string_pretty(&Payload::fault(e))?,
        })
    }

    fn outcome<T: Serialize>(outcome: Outcome<T>) -> anyhow::Result<Self> {
        let (success, json) = response::outcome_json(outcome)?;
        Ok(Self { success, json })
    }
}

/// Run one command against the shared services
pub async fn execute(command: Command, state: &AppState) -> anyhow::Result<Rendered> {
    match command {
        Command::Export(args) => transfer::export(args, state).await,
        Command::Import(args) => transfer::import(args, state).await,
        Command::Clone(args) => transfer::clone(args, state).await,
        Command::Delete(args) => manage::delete(args, state).await,
        Command::Detail(args) => manage::detail(args, state).await,
        Command::Publish(args) => manage::publish(args, state).await,
        Command::Namespace(command) => manage::namespace(command, state).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("12").unwrap(), CloneConfigBean::new(12));
        assert_eq!(
            parse_selection("7=COPY/app.yaml").unwrap(),
            CloneConfigBean::rename(7, "COPY", "app.yaml")
        );
        assert!(parse_selection("x").is_err());
        assert!(parse_selection("7=no-group").is_err());
    }

    #[test]
    fn test_parse_import_command() {
        let cli = Cli::parse_from([
            "manioc",
            "--data-dir",
            "/tmp/manioc",
            "import",
            "configs.zip",
            "--namespace",
            "dev",
            "--policy",
            "overwrite",
        ]);
        assert_eq!(cli.overrides().data_dir, Some(PathBuf::from("/tmp/manioc")));
        match cli.command {
            Command::Import(args) => {
                assert_eq!(args.file, PathBuf::from("configs.zip"));
                assert_eq!(args.namespace, "dev");
                assert_eq!(args.policy, SameConfigPolicy::Overwrite);
                assert_eq!(args.actor.src_user, "manioc");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_export_ids() {
        let cli = Cli::parse_from(["manioc", "export", "--ids", "3,1,2", "--format", "legacy"]);
        match cli.command {
            Command::Export(args) => {
                assert_eq!(args.ids, vec![3, 1, 2]);
                assert_eq!(args.format, Some(ArchiveFormat::Legacy));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
