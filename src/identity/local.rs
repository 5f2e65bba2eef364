use std::path::PathBuf;

use anyhow::Context as _;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{Identity, IdentityProvider, normalize_email, validate_email, validate_password};
use crate::error::IdentityError;
use crate::store::local_fs::{read_json, write_json_atomic};

/// Accounts kept in `<base_dir>/users.json` with argon2 password hashes.
#[derive(Debug)]
pub struct LocalIdentityProvider {
    path: PathBuf,
    // Serializes read-modify-write of users.json across concurrent sign-ups.
    write_lock: Mutex<()>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserFile {
    users: Vec<UserRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    uid: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn identity(&self) -> Identity {
        Identity {
            uid: self.uid.clone(),
            email: self.email.clone(),
            credentials: None,
        }
    }
}

impl LocalIdentityProvider {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: base_dir.into().join("users.json"),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> anyhow::Result<UserFile> {
        Ok(read_json(&self.path)
            .await
            .with_context(|| format!("read: {}", self.path.display()))?
            .unwrap_or_default())
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let email = normalize_email(email);
        let users = self.load().await?;
        let Some(record) = users.users.into_iter().find(|u| u.email == email) else {
            tracing::debug!(%email, "sign-in for unknown account");
            return Err(IdentityError::InvalidCredentials);
        };

        let password = password.to_owned();
        let stored_hash = record.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .context("join password verification")??;
        if !verified {
            return Err(IdentityError::InvalidCredentials);
        }

        tracing::info!(uid = %record.uid, "signed in");
        Ok(record.identity())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password)?;

        let _guard = self.write_lock.lock().await;
        let mut users = self.load().await?;
        if users.users.iter().any(|u| u.email == email) {
            return Err(IdentityError::EmailExists(email));
        }

        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .context("join password hashing")??;
        let record = UserRecord {
            uid: uuid::Uuid::new_v4().simple().to_string(),
            email,
            password_hash,
            created_at: Utc::now(),
        };
        users.users.push(record.clone());
        write_json_atomic(&self.path, &users)
            .await
            .context("write users.json")?;

        tracing::info!(uid = %record.uid, "account created");
        Ok(record.identity())
    }

    async fn sign_out(&self, identity: &Identity) -> Result<(), IdentityError> {
        tracing::info!(uid = %identity.uid, "signed out");
        Ok(())
    }
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("hash password: {err}"))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|err| anyhow::anyhow!("parse password hash: {err}"))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(anyhow::anyhow!("verify password: {err}")),
    }
}
