//! Backend credential files
//!
//! Each backend has its own JSON file holding `{"user": ..., "pass": ...}`.

use crate::error::{CliError, CliResult};
use mdmsync_connector::Credentials;
use std::path::Path;

/// Read a `{user, pass}` credential file.
pub fn load_credentials(path: &Path) -> CliResult<Credentials> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CliError::CredentialsMissing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let credentials: Credentials =
        serde_json::from_str(&contents).map_err(|e| CliError::CredentialsInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if credentials.user.trim().is_empty() {
        return Err(CliError::CredentialsInvalid {
            path: path.to_path_buf(),
            message: "user is empty".to_string(),
        });
    }

    tracing::debug!(path = %path.display(), user = %credentials.user, "Loaded credentials");
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_credentials() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("mdm_credentials.json");
        std::fs::write(&path, r#"{"user": "svc-mdm", "pass": "hunter2"}"#).unwrap();

        let credentials = load_credentials(&path).unwrap();
        assert_eq!(credentials, Credentials::new("svc-mdm", "hunter2"));
    }

    #[test]
    fn test_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("absent.json");

        let err = load_credentials(&path).unwrap_err();
        assert!(matches!(err, CliError::CredentialsMissing { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("mdm_credentials.json");
        std::fs::write(&path, r#"{"username": "svc-mdm"}"#).unwrap();

        let err = load_credentials(&path).unwrap_err();
        assert!(matches!(err, CliError::CredentialsInvalid { .. }));
    }

    #[test]
    fn test_empty_user_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("mdm_credentials.json");
        std::fs::write(&path, r#"{"user": " ", "pass": "x"}"#).unwrap();

        assert!(matches!(
            load_credentials(&path),
            Err(CliError::CredentialsInvalid { .. })
        ));
    }
}
