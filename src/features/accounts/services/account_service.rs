use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::accounts::dtos::{Registration, UploadedPicture};
use crate::features::accounts::models::User;
use crate::modules::storage::MediaStorage;
use crate::shared::constants::PROFILE_IMAGE_DIR;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_active, date_joined, last_login";

/// Result of a registration attempt
#[derive(Debug)]
pub enum RegisterOutcome {
    Registered(User),
    UsernameTaken,
}

/// Result of checking a username/password pair
#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated(User),
    /// Password matched but the account is disabled
    Inactive,
    InvalidCredentials,
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    // PostgreSQL error code 23505
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

async fn verify_password(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// Decide the login outcome for the account found under the submitted username
pub async fn check_credentials(user: Option<User>, password: &str) -> LoginOutcome {
    let Some(user) = user else {
        return LoginOutcome::InvalidCredentials;
    };

    if !verify_password(password.to_string(), user.password_hash.clone()).await {
        return LoginOutcome::InvalidCredentials;
    }

    if !user.is_active {
        return LoginOutcome::Inactive;
    }

    LoginOutcome::Authenticated(user)
}

/// Service for accounts and their profiles
pub struct AccountService {
    pool: PgPool,
    storage: Arc<dyn MediaStorage>,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(pool: PgPool, storage: Arc<dyn MediaStorage>, bcrypt_cost: u32) -> Self {
        Self {
            pool,
            storage,
            bcrypt_cost,
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user by username: {:?}", e);
            AppError::Database(e)
        })
    }

    #[cfg(any(test, feature = "test-helpers"))]
    pub async fn get_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<crate::features::accounts::models::UserProfile>> {
        sqlx::query_as::<_, crate::features::accounts::models::UserProfile>(
            "SELECT id, user_id, website, picture FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user profile: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Enable or disable an account
    #[cfg(any(test, feature = "test-helpers"))]
    pub async fn set_active(&self, user_id: Uuid, is_active: bool) -> Result<()> {
        sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(user_id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Create the account and its profile together.
    ///
    /// The picture is stored before the transaction starts and removed again
    /// when the account cannot be written.
    pub async fn register(&self, registration: Registration) -> Result<RegisterOutcome> {
        let Registration { user, profile } = registration;

        if self.find_by_username(&user.username).await?.is_some() {
            return Ok(RegisterOutcome::UsernameTaken);
        }

        let password_hash = hash_password(user.password.clone(), self.bcrypt_cost).await?;

        let uploaded = match profile.picture {
            Some(picture) => Some(self.upload_picture(picture).await?),
            None => None,
        };

        let result = self
            .insert_account(
                &user.username,
                user.email.as_deref().unwrap_or(""),
                &password_hash,
                profile.website.as_deref().unwrap_or(""),
                uploaded.as_ref().map(|(_, url)| url.as_str()),
            )
            .await;

        if !matches!(result, Ok(RegisterOutcome::Registered(_))) {
            if let Some((key, _)) = &uploaded {
                if let Err(e) = self.storage.delete(key).await {
                    tracing::warn!("Failed to remove orphaned picture {}: {}", key, e);
                }
            }
        }

        result
    }

    async fn upload_picture(&self, picture: UploadedPicture) -> Result<(String, String)> {
        let key = format!(
            "{}/{}.{}",
            PROFILE_IMAGE_DIR,
            Uuid::now_v7(),
            picture.extension()
        );
        tracing::debug!(
            "Uploading profile picture '{}' as {}",
            picture.file_name,
            key
        );
        let url = self
            .storage
            .upload(&key, picture.data, &picture.content_type)
            .await?;
        Ok((key, url))
    }

    async fn insert_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        website: &str,
        picture: Option<&str>,
    ) -> Result<RegisterOutcome> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await;

        let user = match inserted {
            Ok(user) => user,
            // Lost a race with a concurrent registration of the same name
            Err(e) if is_unique_violation(&e) => return Ok(RegisterOutcome::UsernameTaken),
            Err(e) => {
                tracing::error!("Failed to insert user: {:?}", e);
                return Err(AppError::Database(e));
            }
        };

        sqlx::query(
            "INSERT INTO user_profiles (id, user_id, website, picture) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::now_v7())
        .bind(user.id)
        .bind(website)
        .bind(picture)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert user profile: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        tracing::info!("Registered user {}", user.username);
        Ok(RegisterOutcome::Registered(user))
    }

    /// Check the credentials and record the login time on success
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let user = self.find_by_username(username).await?;

        match check_credentials(user, password).await {
            LoginOutcome::Authenticated(user) => {
                let user = sqlx::query_as::<_, User>(&format!(
                    "UPDATE users SET last_login = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
                ))
                .bind(user.id)
                .fetch_one(&self.pool)
                .await?;
                Ok(LoginOutcome::Authenticated(user))
            }
            outcome => Ok(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(password: &str, is_active: bool) -> User {
        User {
            id: Uuid::now_v7(),
            username: "leifos".to_string(),
            email: String::new(),
            password_hash: bcrypt::hash(password, 4).unwrap(),
            is_active,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    #[tokio::test]
    async fn test_check_credentials() {
        assert!(matches!(
            check_credentials(None, "tango").await,
            LoginOutcome::InvalidCredentials
        ));
        assert!(matches!(
            check_credentials(Some(user("tango", true)), "wrong").await,
            LoginOutcome::InvalidCredentials
        ));
        assert!(matches!(
            check_credentials(Some(user("tango", true)), "tango").await,
            LoginOutcome::Authenticated(_)
        ));
    }

    #[tokio::test]
    async fn test_inactive_account_is_reported_only_with_correct_password() {
        assert!(matches!(
            check_credentials(Some(user("tango", false)), "tango").await,
            LoginOutcome::Inactive
        ));
        assert!(matches!(
            check_credentials(Some(user("tango", false)), "wrong").await,
            LoginOutcome::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_hash_password_round_trip() {
        let hash = hash_password("tango".to_string(), 4).await.unwrap();
        assert!(verify_password("tango".to_string(), hash.clone()).await);
        assert!(!verify_password("django".to_string(), hash).await);
    }
}
