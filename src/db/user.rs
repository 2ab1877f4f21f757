//! User account operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{PgStore, StoreError, UserRepository};
use crate::auth::model::{NewUser, Role, User};

const USER_COLUMNS: &str =
    "id, role, name, email, mobile_number, password_hash, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    role: String,
    name: String,
    email: String,
    mobile_number: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| StoreError::Database(sqlx::Error::Decode(e.into())))?;
        Ok(User {
            id: row.id,
            role,
            name: row.name,
            email: row.email,
            mobile_number: row.mobile_number,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Unique violations become a [`StoreError::Conflict`] naming the clashing field.
fn map_unique_violation(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            let message = match db_error.constraint() {
                Some("users_email_key") => "Email already in use",
                Some("users_mobile_number_key") => "Mobile number already in use",
                _ => "Email or mobile number already in use",
            };
            return StoreError::Conflict(message.to_string());
        }
    }
    StoreError::Database(error)
}

fn into_user(row: Option<UserRow>) -> Result<Option<User>, StoreError> {
    row.map(User::try_from).transpose()
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (role, name, email, mobile_number, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.role.as_str())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.mobile_number)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        row.try_into()
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        into_user(row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        into_user(row)
    }

    async fn find_user_by_mobile(&self, mobile_number: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE mobile_number = $1",
            USER_COLUMNS
        ))
        .bind(mobile_number)
        .fetch_optional(&self.pool)
        .await?;
        into_user(row)
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE role = $1 ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        mobile_number: &str,
    ) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET name = $2, email = $3, mobile_number = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(mobile_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        into_user(row)
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
