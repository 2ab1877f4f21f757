#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use exam_remuneration_server::auth::jwt::generate_token;
use exam_remuneration_server::auth::model::NewUser;
use exam_remuneration_server::auth::{Role, User};
use exam_remuneration_server::bill::Bill;
use exam_remuneration_server::config::AppConfig;
use exam_remuneration_server::db::{BillRepository, OtpRepository, StoreError, UserRepository};
use exam_remuneration_server::dispatch::{RasterizeError, Rasterizer};
use exam_remuneration_server::mail::{MailError, Mailer, OutgoingMail};
use exam_remuneration_server::otp::OtpRecord;
use exam_remuneration_server::AppState;

pub const FAKE_PDF: &[u8] = b"%PDF-fake";
pub const PASSWORD: &str = "secret123";

/// In-memory stand-in for every repository.
#[derive(Default)]
pub struct MemoryStore {
    bills: Mutex<Vec<Bill>>,
    users: Mutex<Vec<User>>,
    otps: Mutex<HashMap<String, OtpRecord>>,
}

impl MemoryStore {
    pub async fn bill_count(&self) -> usize {
        self.bills.lock().await.len()
    }
}

#[async_trait]
impl BillRepository for MemoryStore {
    async fn insert_bill(&self, bill: &Bill) -> Result<(), StoreError> {
        self.bills.lock().await.push(bill.clone());
        Ok(())
    }

    async fn get_bill(&self, id: Uuid) -> Result<Option<Bill>, StoreError> {
        Ok(self.bills.lock().await.iter().find(|b| b.id == id).cloned())
    }

    async fn list_bills(&self, owner: Option<Uuid>) -> Result<Vec<Bill>, StoreError> {
        let mut bills: Vec<Bill> = self
            .bills
            .lock()
            .await
            .iter()
            .filter(|b| owner.map_or(true, |owner| b.user_id == owner))
            .cloned()
            .collect();
        bills.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bills)
    }

    async fn replace_bill(&self, bill: &Bill) -> Result<bool, StoreError> {
        let mut bills = self.bills.lock().await;
        match bills.iter_mut().find(|b| b.id == bill.id) {
            Some(slot) => {
                *slot = bill.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_bill(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut bills = self.bills.lock().await;
        let before = bills.len();
        bills.retain(|b| b.id != id);
        Ok(bills.len() != before)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("Email already in use".to_string()));
        }
        if users.iter().any(|u| u.mobile_number == user.mobile_number) {
            return Err(StoreError::Conflict("Mobile number already in use".to_string()));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            role: user.role,
            name: user.name,
            email: user.email,
            mobile_number: user.mobile_number,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_mobile(&self, mobile_number: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| u.mobile_number == mobile_number)
            .cloned())
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self
            .users
            .lock()
            .await
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        mobile_number: &str,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().await;
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.name = name.to_string();
            user.email = email.to_string();
            user.mobile_number = mobile_number.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, StoreError> {
        let mut users = self.users.lock().await;
        match users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl OtpRepository for MemoryStore {
    async fn upsert_otp(&self, record: &OtpRecord) -> Result<(), StoreError> {
        self.otps
            .lock()
            .await
            .insert(record.email.clone(), record.clone());
        Ok(())
    }

    async fn find_otp(&self, email: &str) -> Result<Option<OtpRecord>, StoreError> {
        Ok(self.otps.lock().await.get(email).cloned())
    }

    async fn delete_otp(&self, email: &str) -> Result<(), StoreError> {
        self.otps.lock().await.remove(email);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut otps = self.otps.lock().await;
        let before = otps.len();
        otps.retain(|_, record| !record.is_expired(now));
        Ok((before - otps.len()) as u64)
    }
}

/// Returns a fixed PDF, or fails on demand.
#[derive(Default)]
pub struct FakeRasterizer {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl Rasterizer for FakeRasterizer {
    async fn rasterize(&self, _html: &str) -> Result<Vec<u8>, RasterizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RasterizeError::Exit(1));
        }
        Ok(FAKE_PDF.to_vec())
    }
}

/// Keeps every mail it is asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    pub fail: AtomicBool,
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().await.clone()
    }

    /// The six-digit code in the most recent mail.
    pub async fn last_code(&self) -> Option<String> {
        let sent = self.sent.lock().await;
        let mail = sent.last()?;
        mail.text
            .split(|c: char| !c.is_ascii_digit())
            .find(|part| part.len() == 6)
            .map(str::to_string)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Transport("connection refused".to_string()));
        }
        self.sent.lock().await.push(mail);
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    let vars: HashMap<&str, &str> = [
        ("DATABASE_URL", "postgres://unused@localhost/unused"),
        ("JWT_SECRET", "integration-test-secret"),
        ("MAIL_FROM", "exam.cell@moderncollege.edu.in"),
        ("DOCUMENT_UTC_OFFSET_MINUTES", "330"),
    ]
    .into_iter()
    .collect();
    AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test config should be valid")
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub rasterizer: Arc<FakeRasterizer>,
    pub mailer: Arc<RecordingMailer>,
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let rasterizer = Arc::new(FakeRasterizer::default());
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::from_parts(
            test_config(),
            store.clone(),
            store.clone(),
            store.clone(),
            rasterizer.clone(),
            mailer.clone(),
        );
        Self {
            store,
            rasterizer,
            mailer,
            state: web::Data::new(state),
        }
    }

    /// Insert an account directly. Uses a low bcrypt cost to keep tests fast.
    pub async fn seed_user(&self, role: Role, name: &str, email: &str, mobile: &str) -> User {
        let password_hash = bcrypt::hash(PASSWORD, 4).expect("hash");
        self.store
            .create_user(NewUser {
                role,
                name: name.to_string(),
                email: email.to_string(),
                mobile_number: mobile.to_string(),
                password_hash,
            })
            .await
            .expect("seed user")
    }

    pub async fn admin(&self) -> User {
        self.seed_user(Role::Admin, "Exam Cell", "admin@college.in", "9000000001")
            .await
    }

    pub async fn teacher(&self) -> User {
        self.seed_user(Role::Teacher, "Asha Patil", "asha@college.in", "9000000002")
            .await
    }

    pub fn bearer(&self, user: &User) -> (&'static str, String) {
        let token = generate_token(user, &self.state.config.jwt_secret).expect("token");
        ("Authorization", format!("Bearer {}", token))
    }
}

/// A practical exam with two batches (20 + 15 present) and one examiner at
/// 50 per student plus a 100 allowance: 35 x 50 + 100 = 1850.
pub fn bill_request() -> Value {
    json!({
        "department": "Computer Science",
        "className": "T.Y. B.Sc. (Comp Sci)",
        "subject": "Data Structures",
        "semester": 5,
        "programLevel": "UG",
        "examSession": "March/April 2025",
        "examType": "Practical",
        "examStartTime": "2025-03-01T04:30:00Z",
        "examEndTime": "2025-03-01T07:30:00Z",
        "totalStudents": 40,
        "durationPerBatch": 3,
        "batches": [
            { "batchNo": "B1", "studentsPresent": 20 },
            { "batchNo": "B2", "studentsPresent": 15 }
        ],
        "staffPayments": [
            {
                "role": "External Examiner",
                "persons": [
                    {
                        "name": "Dr. A. Kulkarni",
                        "mobile": "9876543210",
                        "rate": "50",
                        "extraAllowance": 100
                    }
                ]
            }
        ]
    })
}
