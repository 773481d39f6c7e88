//! Faults raised by the transfer engine
//!
//! Validation problems are reported through [`crate::model::Outcome`]; only
//! conditions the caller cannot fix by changing its input end up here.

use manioc_common::crypto::CryptoError;
use manioc_common::error::{self, ErrorCode};

#[derive(thiserror::Error, Debug)]
pub enum TransferError {
    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("persistence failure: {0}")]
    Persistence(#[source] anyhow::Error),

    #[error("encryption failure for '{data_id}': {source}")]
    Encryption {
        data_id: String,
        #[source]
        source: CryptoError,
    },

    #[error("serialization failure: {0}")]
    Serialization(String),

    #[error("illegal argument: {0}")]
    IllegalArgument(String),
}

impl TransferError {
    pub fn encryption(data_id: &str, source: CryptoError) -> Self {
        TransferError::Encryption {
            data_id: data_id.to_string(),
            source,
        }
    }

    pub fn error_code(&self) -> ErrorCode<'static> {
        match self {
            TransferError::CorruptArchive(_) => error::PARSING_DATA_FAILED,
            TransferError::Persistence(_) => error::DATA_ACCESS_ERROR,
            TransferError::IllegalArgument(_) => error::PARAMETER_MISSING,
            TransferError::Encryption { .. } | TransferError::Serialization(_) => {
                error::SERVER_ERROR
            }
        }
    }
}

impl From<zip::result::ZipError> for TransferError {
    fn from(e: zip::result::ZipError) -> Self {
        TransferError::CorruptArchive(e.to_string())
    }
}

impl From<serde_yaml::Error> for TransferError {
    fn from(e: serde_yaml::Error) -> Self {
        TransferError::Serialization(e.to_string())
    }
}

pub type TransferResult<T> = Result<T, TransferError>;
