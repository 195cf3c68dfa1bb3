//! In-process user store.
//!
//! Used for local runs without a database (`DATABASE_URL=memory`) and in
//! tests. Contents are lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::UserStore;
use crate::error::{CoreError, CoreResult};
use crate::user::{NewUser, User, UserChanges};

#[derive(Default)]
struct Inner {
    last_id: i32,
    users: BTreeMap<i32, User>,
}

#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> CoreResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(CoreError::EmailTaken);
        }

        inner.last_id += 1;
        let now = Utc::now();
        let created = User {
            id: inner.last_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(created.id, created.clone());
        tracing::debug!("User created in memory store: id={}", created.id);
        Ok(created)
    }

    async fn find_by_id(&self, id: i32) -> CoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> CoreResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn update(&self, id: i32, changes: UserChanges) -> CoreResult<Option<User>> {
        let mut inner = self.inner.write().await;

        if let Some(email) = &changes.email {
            let taken = inner
                .users
                .values()
                .any(|u| u.id != id && &u.email == email);
            if taken {
                return Err(CoreError::EmailTaken);
            }
        }

        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(user, Utc::now());
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i32) -> CoreResult<Option<User>> {
        Ok(self.inner.write().await.users.remove(&id))
    }
}
