//! Persistence for user accounts.
//!
//! Handlers talk to a [`UserStore`] trait object so that the same routes run
//! against Postgres ([`PgUserStore`]) or the in-process [`MemoryUserStore`].
//! Email uniqueness is the store's responsibility: `create` and `update`
//! return [`CoreError::EmailTaken`](crate::CoreError::EmailTaken) on conflict.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::user::{NewUser, User, UserChanges};

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> CoreResult<User>;

    async fn find_by_id(&self, id: i32) -> CoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    /// All accounts ordered by id.
    async fn list(&self) -> CoreResult<Vec<User>>;

    /// Returns `None` when no account has `id`.
    async fn update(&self, id: i32, changes: UserChanges) -> CoreResult<Option<User>>;

    /// Removes the account and returns it, or `None` when absent.
    async fn delete(&self, id: i32) -> CoreResult<Option<User>>;
}
