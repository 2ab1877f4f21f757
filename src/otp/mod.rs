//! One-time passcodes for login and password reset.
//!
//! One live code per email. Codes expire after [`OTP_TTL_MINUTES`]; a
//! background sweeper purges stale rows and every read re-checks expiry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::auth::model::User;
use crate::db::{OtpRepository, StoreError};
use crate::error::ApiError;
use crate::mail::{Mailer, OutgoingMail};

pub const OTP_TTL_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OtpRecord {
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn new(email: &str, now: DateTime<Utc>) -> Self {
        Self {
            email: email.to_string(),
            code: generate_code(),
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Six decimal digits, never starting with zero.
pub fn generate_code() -> String {
    let n = Uuid::new_v4().as_u128() % 900_000 + 100_000;
    n.to_string()
}

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("OTP not found. Request again.")]
    NotFound,
    #[error("OTP expired. Request new OTP.")]
    Expired,
    #[error("Invalid OTP")]
    Mismatch,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Store a fresh code for `user` and mail it. If the mail cannot be sent the
/// stored code is removed again so no undeliverable code stays live.
pub async fn issue(
    otps: &dyn OtpRepository,
    mailer: &dyn Mailer,
    user: &User,
    compose: fn(&User, &str) -> OutgoingMail,
) -> Result<(), ApiError> {
    let record = OtpRecord::new(&user.email, Utc::now());
    otps.upsert_otp(&record).await?;

    if let Err(e) = mailer.send(compose(user, &record.code)).await {
        log::error!("Failed to send OTP email to {}: {}", user.email, e);
        if let Err(cleanup) = otps.delete_otp(&user.email).await {
            log::error!("Failed to remove undelivered OTP for {}: {}", user.email, cleanup);
        }
        return Err(ApiError::internal(
            "Failed to send OTP email. Please try again.",
        ));
    }

    log::info!("OTP issued for {}", user.email);
    Ok(())
}

/// Check `code` against the live record for `email` and consume it on
/// success. Expired records are deleted when encountered.
pub async fn verify(
    otps: &dyn OtpRepository,
    email: &str,
    code: &str,
    now: DateTime<Utc>,
) -> Result<(), OtpError> {
    let record = otps.find_otp(email).await?.ok_or(OtpError::NotFound)?;

    if record.is_expired(now) {
        otps.delete_otp(email).await?;
        return Err(OtpError::Expired);
    }

    if record.code != code.trim() {
        return Err(OtpError::Mismatch);
    }

    otps.delete_otp(email).await?;
    Ok(())
}

/// One sweep pass; returns how many records were purged.
pub async fn sweep_expired(otps: &dyn OtpRepository, now: DateTime<Utc>) -> Result<u64, StoreError> {
    let purged = otps.purge_expired(now).await?;
    if purged > 0 {
        log::debug!("Purged {} expired OTP record(s)", purged);
    }
    Ok(purged)
}

/// Run [`sweep_expired`] every `every` until the runtime shuts down.
pub fn spawn_sweeper(otps: Arc<dyn OtpRepository>, every: std::time::Duration) -> JoinHandle<()> {
    // tokio panics on a zero period
    let every = every.max(std::time::Duration::from_secs(1));
    log::info!("OTP sweeper started (interval {:?})", every);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_expired(otps.as_ref(), Utc::now()).await {
                log::error!("OTP sweep failed: {}", e);
            }
        }
    })
}
