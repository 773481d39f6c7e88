//! Typed outcomes of transfer operations

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use manioc_common::error::{self, ErrorCode};
use manioc_persistence::{BatchWriteOutcome, ConfigKey};

/// Why an archive item did not become a config entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnrecognizedReason {
    /// The item name is not `group/dataId`
    MalformedName,
    /// The item has no entry in the structured metadata
    NotInMetadata,
    /// A structured metadata entry has no content item
    MissingFile,
}

impl Display for UnrecognizedReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UnrecognizedReason::MalformedName => write!(f, "malformed-name"),
            UnrecognizedReason::NotInMetadata => write!(f, "not-in-metadata"),
            UnrecognizedReason::MissingFile => write!(f, "missing-file"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnrecognizedItem {
    pub item_name: String,
    pub reason: UnrecognizedReason,
}

impl UnrecognizedItem {
    pub fn new(item_name: impl Into<String>, reason: UnrecognizedReason) -> Self {
        Self {
            item_name: item_name.into(),
            reason,
        }
    }
}

/// Result payload of a successful import
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub succ_count: u32,
    pub skip_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fail_data: Vec<ConfigKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_data: Vec<ConfigKey>,
    pub unrecognized_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unrecognized_data: Vec<UnrecognizedItem>,
}

impl ImportResult {
    pub fn new(outcome: BatchWriteOutcome, unrecognized: Vec<UnrecognizedItem>) -> Self {
        let clone = CloneResult::from(outcome);
        Self {
            succ_count: clone.succ_count,
            skip_count: clone.skip_count,
            fail_count: clone.fail_count,
            fail_data: clone.fail_data,
            skip_data: clone.skip_data,
            unrecognized_count: unrecognized.len() as u32,
            unrecognized_data: unrecognized,
        }
    }
}

/// Result payload of a successful clone
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneResult {
    pub succ_count: u32,
    pub skip_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fail_data: Vec<ConfigKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_data: Vec<ConfigKey>,
}

impl From<BatchWriteOutcome> for CloneResult {
    fn from(outcome: BatchWriteOutcome) -> Self {
        let fail_count = outcome.fail_count();
        Self {
            succ_count: outcome.succ_count,
            skip_count: outcome.skip_count,
            fail_count: (fail_count > 0).then_some(fail_count),
            fail_data: outcome.fail_data,
            skip_data: outcome.skip_data,
        }
    }
}

/// One selected config for a clone, with optional renames
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneConfigBean {
    pub cfg_id: i64,
    #[serde(default)]
    pub data_id: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

impl CloneConfigBean {
    pub fn new(cfg_id: i64) -> Self {
        Self {
            cfg_id,
            ..Default::default()
        }
    }

    pub fn rename(cfg_id: i64, group: &str, data_id: &str) -> Self {
        Self {
            cfg_id,
            data_id: Some(data_id.to_string()),
            group: Some(group.to_string()),
        }
    }
}

/// Validation failures reported without touching persistence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    ArchiveEmpty,
    MetadataIllegal,
    DataEmpty,
    NamespaceNotFound,
    NoSelection,
    ExportNoData,
}

impl FailureKind {
    pub fn error_code(&self) -> ErrorCode<'static> {
        match self {
            FailureKind::ArchiveEmpty => error::IMPORT_FILE_EMPTY,
            FailureKind::MetadataIllegal => error::METADATA_ILLEGAL,
            FailureKind::DataEmpty => error::DATA_EMPTY,
            FailureKind::NamespaceNotFound => error::NAMESPACE_NOT_EXIST,
            FailureKind::NoSelection => error::NO_SELECTED_CONFIG,
            FailureKind::ExportNoData => error::EXPORT_NO_DATA,
        }
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error_code().message)
    }
}

/// A typed failure, always with zero successes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub kind: FailureKind,
    pub succ_count: u32,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind) -> Self {
        Self {
            kind,
            succ_count: 0,
            message: kind.to_string(),
        }
    }

    pub fn with_message(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            succ_count: 0,
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> ErrorCode<'static> {
        self.kind.error_code()
    }
}

/// Success payload or typed validation failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn fail(kind: FailureKind) -> Self {
        Outcome::Failure(Failure::new(kind))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(data) => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(failure),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure().map(|f| f.kind)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(data) => Outcome::Success(f(data)),
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }
}
