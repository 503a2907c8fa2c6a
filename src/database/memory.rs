use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User, UserChanges};
use crate::database::repository::UserStore;

/// Process-local user table. Used for tests and for running without Postgres
/// (`USER_STORE=memory`); contents are lost on exit.
#[derive(Default)]
pub struct MemoryUserStore {
    table: RwLock<Table>,
}

#[derive(Default)]
struct Table {
    last_id: i32,
    rows: Vec<User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Table {
    fn email_taken(&self, email: &str, except_id: Option<i32>) -> bool {
        self.rows
            .iter()
            .any(|u| u.email == email && Some(u.id) != except_id)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut table = self.table.write().await;
        if table.email_taken(&new_user.email, None) {
            return Err(DatabaseError::DuplicateEmail(new_user.email));
        }

        table.last_id += 1;
        let now = Utc::now();
        let user = User {
            id: table.last_id,
            name: new_user.name,
            email: new_user.email,
            password: new_user.password,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, DatabaseError> {
        // rows are appended with increasing ids, so insertion order is id order
        Ok(self.table.read().await.rows.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<u64, DatabaseError> {
        let mut table = self.table.write().await;
        // a missing row matches nothing, same as the UPDATE in Postgres
        let Some(index) = table.rows.iter().position(|u| u.id == id) else {
            return Ok(0);
        };
        if let Some(email) = &changes.email {
            if table.email_taken(email, Some(id)) {
                return Err(DatabaseError::DuplicateEmail(email.clone()));
            }
        }

        let user = &mut table.rows[index];
        changes.apply_to(user);
        user.updated_at = Utc::now();
        Ok(1)
    }

    async fn destroy(&self, id: i32) -> Result<u64, DatabaseError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|u| u.id != id);
        Ok((before - table.rows.len()) as u64)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
