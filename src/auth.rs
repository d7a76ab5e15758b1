//! Sign-up and login against the credential store.
//!
//! Passwords are stored and compared as plain text, matching the existing
//! `users.json` format.

use tracing::info;

use crate::{
    error::{Result, ValidationError},
    store::CredentialStore,
};

/// Registers a new user. Nothing is written unless every check passes.
pub fn sign_up(store: &CredentialStore, username: &str, password: &str) -> Result<()> {
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields.into());
    }

    let mut users = store.load_all()?;
    if users.contains_key(username) {
        info!(username, "sign-up rejected, username taken");
        return Err(ValidationError::DuplicateUsername.into());
    }

    users.insert(username.to_string(), password.to_string());
    store.save_all(&users)?;
    info!(username, "user registered");
    Ok(())
}

/// Succeeds iff `username` exists and its password matches exactly.
pub fn log_in(store: &CredentialStore, username: &str, password: &str) -> Result<()> {
    let users = store.load_all()?;
    match users.get(username) {
        Some(stored) if stored == password => {
            info!(username, "logged in");
            Ok(())
        }
        _ => {
            info!(username, "login rejected");
            Err(ValidationError::InvalidCredentials.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CorruptFilePolicy,
        error::AppError,
        store::{Credentials, JsonStore},
    };
    use std::fs;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> CredentialStore {
        JsonStore::new(dir.path().join("users.json"), CorruptFilePolicy::Fail)
    }

    fn validation(result: Result<()>) -> ValidationError {
        match result {
            Err(AppError::Validation(err)) => err,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn sign_up_rejects_empty_fields_without_writing() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert_eq!(validation(sign_up(&store, "", "pw")), ValidationError::MissingFields);
        assert_eq!(validation(sign_up(&store, "alice", "")), ValidationError::MissingFields);
        assert!(!store.path().exists());
    }

    #[test]
    fn duplicate_sign_up_keeps_the_original_password() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        sign_up(&store, "alice", "pw1").unwrap();
        assert_eq!(
            validation(sign_up(&store, "alice", "other")),
            ValidationError::DuplicateUsername
        );
        assert_eq!(
            store.load_all().unwrap(),
            Credentials::from([("alice".to_string(), "pw1".to_string())])
        );
    }

    #[test]
    fn login_requires_an_exact_match() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        sign_up(&store, "alice", "pw1").unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(log_in(&store, "alice", "pw1").is_ok());
        assert_eq!(
            validation(log_in(&store, "alice", "WRONG")),
            ValidationError::InvalidCredentials
        );
        assert_eq!(
            validation(log_in(&store, "Alice", "pw1")),
            ValidationError::InvalidCredentials
        );
        assert_eq!(validation(log_in(&store, "bob", "x")), ValidationError::InvalidCredentials);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn login_with_no_users_file_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            validation(log_in(&store(&dir), "alice", "pw1")),
            ValidationError::InvalidCredentials
        );
    }

    #[test]
    fn corrupt_users_file_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.path(), "not json").unwrap();

        assert!(matches!(
            sign_up(&store, "alice", "pw1"),
            Err(AppError::Storage(_))
        ));
    }
}
