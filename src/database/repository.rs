use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User, UserChanges};

/// Persistence boundary for user records.
///
/// `update` and `destroy` report the number of affected rows; callers decide
/// what a zero means.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError>;

    /// All users ordered by id.
    async fn find_all(&self) -> Result<Vec<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn update(&self, id: i32, changes: UserChanges) -> Result<u64, DatabaseError>;

    async fn destroy(&self, id: i32) -> Result<u64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

const USER_COLUMNS: &str = "id, name, email, password, created_at, updated_at";

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let query = format!(
            "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let email = new_user.email.clone();

        sqlx::query_as::<_, User>(&query)
            .bind(new_user.name)
            .bind(new_user.email)
            .bind(new_user.password)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_violation(e, email))
    }

    async fn find_all(&self) -> Result<Vec<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query).fetch_all(&self.pool).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<u64, DatabaseError> {
        let email = changes.email.clone().unwrap_or_default();

        // updated_at is always touched so an empty change set still matches the row
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = NOW()");
        if let Some(name) = changes.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(email) = changes.email {
            builder.push(", email = ").push_bind(email);
        }
        if let Some(password) = changes.password {
            builder.push(", password = ").push_bind(password);
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| unique_violation(e, email))?;
        Ok(result.rows_affected())
    }

    async fn destroy(&self, id: i32) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn unique_violation(err: sqlx::Error, email: String) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DatabaseError::DuplicateEmail(email),
        _ => DatabaseError::Sqlx(err),
    }
}
