//! Database module - AppState and repository traits
//!
//! Handlers talk to the repository traits declared here; the Postgres
//! implementation lives in the submodules:
//! - `bill` - bill documents (JSONB)
//! - `user` - user accounts
//! - `otp` - one-time passcodes

mod bill;
mod otp;
mod user;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::model::{NewUser, Role, User};
use crate::bill::Bill;
use crate::config::AppConfig;
use crate::dispatch::{ChromeRasterizer, Dispatcher, Rasterizer};
use crate::document::DocumentContext;
use crate::mail::{Mailer, SmtpMailer};
use crate::otp::OtpRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Conflict(String),
}

#[async_trait]
pub trait BillRepository: Send + Sync {
    async fn insert_bill(&self, bill: &Bill) -> Result<(), StoreError>;
    async fn get_bill(&self, id: Uuid) -> Result<Option<Bill>, StoreError>;
    /// Newest first. `owner` restricts the listing to one user's bills.
    async fn list_bills(&self, owner: Option<Uuid>) -> Result<Vec<Bill>, StoreError>;
    /// Returns false when no bill with that id exists.
    async fn replace_bill(&self, bill: &Bill) -> Result<bool, StoreError>;
    /// Returns false when no bill with that id exists.
    async fn delete_bill(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email or mobile number is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_mobile(&self, mobile_number: &str) -> Result<Option<User>, StoreError>;
    /// Newest first.
    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError>;
    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        mobile_number: &str,
    ) -> Result<Option<User>, StoreError>;
    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Insert or replace the live code for `record.email`.
    async fn upsert_otp(&self, record: &OtpRecord) -> Result<(), StoreError>;
    async fn find_otp(&self, email: &str) -> Result<Option<OtpRecord>, StoreError>;
    async fn delete_otp(&self, email: &str) -> Result<(), StoreError>;
    /// Remove every record that expired before `now`; returns how many went.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Postgres-backed implementation of every repository trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub bills: Arc<dyn BillRepository>,
    pub users: Arc<dyn UserRepository>,
    pub otps: Arc<dyn OtpRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub dispatcher: Dispatcher,
    pub documents: DocumentContext,
}

impl AppState {
    pub async fn new_with_config(config: AppConfig) -> anyhow::Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(900))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("Database migrations applied");

        let store = Arc::new(PgStore::new(pool));
        let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(&config.smtp)?);
        let rasterizer: Arc<dyn Rasterizer> =
            Arc::new(ChromeRasterizer::new(config.chrome_bin.clone()));

        let state = Self::from_parts(
            config,
            store.clone(),
            store.clone(),
            store,
            rasterizer,
            mailer,
        );

        // Background sweeper for expired one-time passcodes
        crate::otp::spawn_sweeper(
            state.otps.clone(),
            Duration::from_secs(state.config.otp_sweep_interval_secs),
        );

        Ok(state)
    }

    /// Assemble state from already-built collaborators. No background tasks
    /// are started.
    pub fn from_parts(
        config: AppConfig,
        bills: Arc<dyn BillRepository>,
        users: Arc<dyn UserRepository>,
        otps: Arc<dyn OtpRepository>,
        rasterizer: Arc<dyn Rasterizer>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let documents = DocumentContext::new(config.document_utc_offset);
        Self {
            config: Arc::new(config),
            bills,
            users,
            otps,
            dispatcher: Dispatcher::new(rasterizer, mailer.clone()),
            mailer,
            documents,
        }
    }
}
