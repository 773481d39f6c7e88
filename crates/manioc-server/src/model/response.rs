//! Result payloads printed by the command line front end

use serde::{Deserialize, Serialize};

use manioc_common::error::{self, ErrorCode};
use manioc_config::{Failure, Outcome, TransferError};

/// Generic result wrapper, the same shape the HTTP API of a config server uses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Result<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> Result<T> {
    pub fn new(code: i32, message: String, data: T) -> Self {
        Result::<T> {
            code,
            message,
            data,
        }
    }

    pub fn success(data: T) -> Result<T> {
        Result::<T> {
            code: error::SUCCESS.code,
            message: error::SUCCESS.message.to_string(),
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == error::SUCCESS.code
    }
}

impl Result<Option<Failure>> {
    /// Typed validation failure, carrying its zero success count
    pub fn failure(failure: Failure) -> Self {
        Result::new(failure.error_code().code, failure.message.clone(), Some(failure))
    }
}

impl Result<()> {
    pub fn error(code: ErrorCode<'_>, message: String) -> Self {
        Result::new(code.code, message, ())
    }

    pub fn fault(e: &TransferError) -> Self {
        Result::error(e.error_code(), format!("caused: {}", e))
    }
}

/// Outcome of a transfer call rendered as a JSON payload
pub fn outcome_json<T: Serialize>(outcome: Outcome<T>) -> serde_json::Result<(bool, String)> {
    match outcome {
        Outcome::Success(data) => Ok((true, serde_json::to_string_pretty(&Result::success(data))?)),
        Outcome::Failure(failure) => Ok((
            false,
            serde_json::to_string_pretty(&Result::failure(failure))?,
        )),
    }
}

#[cfg(test)]
mod tests {
    use manioc_config::{FailureKind, ImportResult};

    use super::*;

    #[test]
    fn test_success_payload() {
        let result = Result::success(ImportResult {
            succ_count: 2,
            ..Default::default()
        });
        assert!(result.is_success());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["message"], "success");
        assert_eq!(json["data"]["succCount"], 2);
        assert_eq!(json["data"]["unrecognizedCount"], 0);
    }

    #[test]
    fn test_failure_payload() {
        let (ok, json) =
            outcome_json::<ImportResult>(Outcome::fail(FailureKind::NamespaceNotFound)).unwrap();
        assert!(!ok);

        let json: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(json["code"], 22001);
        assert_eq!(json["data"]["succCount"], 0);
        assert_eq!(json["data"]["kind"], "NAMESPACE_NOT_FOUND");
    }

    #[test]
    fn test_fault_payload() {
        let result = Result::fault(&TransferError::CorruptArchive("bad zip".to_string()));
        assert_eq!(result.code, 100004);
        assert!(!result.is_success());
        assert!(result.message.contains("bad zip"));
    }
}
