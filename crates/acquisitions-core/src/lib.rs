//! Acquisitions core library: accounts without HTTP.
//!
//! `acquisitions-core` holds everything about user accounts that does not
//! depend on the web framework, so the server and the admin tooling share it.
//!
//! # Modules
//!
//! - [`user`] — The [`User`] entity, [`Role`], inserts and partial updates.
//! - [`validation`] — Request-body rules for sign-up, sign-in and updates.
//! - [`password`] — Argon2 hashing and verification.
//! - [`store`] — The [`UserStore`] trait with Postgres and in-memory backends.
//! - [`error`] — Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod error;
pub mod password;
pub mod store;
pub mod user;
pub mod validation;

pub use error::{CoreError, CoreResult};
pub use store::{MemoryUserStore, PgUserStore, UserStore};
pub use user::{NewUser, Role, User, UserChanges};
pub use validation::{
    parse_user_id, SignIn, SignInRequest, SignUp, SignUpRequest, UpdateUserRequest, UserUpdate,
    ValidationError,
};
