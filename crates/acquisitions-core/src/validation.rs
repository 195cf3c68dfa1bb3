//! Request-body validation for account operations.
//!
//! Raw request types keep every field optional so that a missing field is
//! reported as a validation issue rather than a deserialization failure.
//! Each `validate` collects all issues before returning.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::user::Role;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 255;
const EMAIL_MAX: usize = 255;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 128;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// One or more rule violations found in a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<String>,
}

impl ValidationError {
    pub fn single(issue: impl Into<String>) -> Self {
        Self {
            issues: vec![issue.into()],
        }
    }

    /// All issue messages joined into one human-readable line.
    pub fn details(&self) -> String {
        self.issues.join(", ")
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.details())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Default)]
struct Issues(Vec<String>);

impl Issues {
    fn push(&mut self, issue: &str) {
        self.0.push(issue.to_string());
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError { issues: self.0 })
        }
    }
}

fn check_name(raw: &str, issues: &mut Issues) -> String {
    let name = raw.trim();
    let len = name.chars().count();
    if len < NAME_MIN {
        issues.push("Name must be at least 2 characters");
    } else if len > NAME_MAX {
        issues.push("Name must be at most 255 characters");
    }
    name.to_string()
}

fn check_email(raw: &str, issues: &mut Issues) -> String {
    let email = raw.trim().to_lowercase();
    if email.chars().count() > EMAIL_MAX {
        issues.push("Email must be at most 255 characters");
    } else if !EMAIL_RE.is_match(&email) {
        issues.push("Invalid email address");
    }
    email
}

fn check_password(raw: &str, issues: &mut Issues) {
    let len = raw.chars().count();
    if len < PASSWORD_MIN {
        issues.push("Password must be at least 6 characters");
    } else if len > PASSWORD_MAX {
        issues.push("Password must be at most 128 characters");
    }
}

fn check_role(raw: &str, issues: &mut Issues) -> Option<Role> {
    match raw.parse::<Role>() {
        Ok(role) => Some(role),
        Err(_) => {
            issues.push("Role must be one of: user, admin");
            None
        }
    }
}

/// Body of `POST /api/auth/sign-up`.
#[derive(Debug, Default, Deserialize)]
pub struct SignUpRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl SignUpRequest {
    pub fn validate(self) -> Result<SignUp, ValidationError> {
        let mut issues = Issues::default();

        let name = match self.name.as_deref() {
            Some(raw) => check_name(raw, &mut issues),
            None => {
                issues.push("Name is required");
                String::new()
            }
        };
        let email = match self.email.as_deref() {
            Some(raw) => check_email(raw, &mut issues),
            None => {
                issues.push("Email is required");
                String::new()
            }
        };
        let password = match self.password {
            Some(raw) => {
                check_password(&raw, &mut issues);
                raw
            }
            None => {
                issues.push("Password is required");
                String::new()
            }
        };
        let role = match self.role.as_deref() {
            Some(raw) => check_role(raw, &mut issues).unwrap_or_default(),
            None => Role::User,
        };

        issues.finish(SignUp {
            name,
            email,
            password,
            role,
        })
    }
}

/// Body of `POST /api/auth/sign-in`.
#[derive(Debug, Default, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

impl SignInRequest {
    pub fn validate(self) -> Result<SignIn, ValidationError> {
        let mut issues = Issues::default();

        let email = match self.email.as_deref() {
            Some(raw) => check_email(raw, &mut issues),
            None => {
                issues.push("Email is required");
                String::new()
            }
        };
        let password = match self.password {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                issues.push("Password is required");
                String::new()
            }
        };

        issues.finish(SignIn { email, password })
    }
}

/// Body of `PUT /api/users/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// A validated update. The password is still plaintext here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn validate(self) -> Result<UserUpdate, ValidationError> {
        let mut issues = Issues::default();

        if self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.role.is_none()
        {
            issues.push("At least one field must be provided for update");
            return issues.finish(UserUpdate::default());
        }

        let name = self.name.as_deref().map(|raw| check_name(raw, &mut issues));
        let email = self.email.as_deref().map(|raw| check_email(raw, &mut issues));
        if let Some(raw) = &self.password {
            check_password(raw, &mut issues);
        }
        let role = self
            .role
            .as_deref()
            .and_then(|raw| check_role(raw, &mut issues));

        issues.finish(UserUpdate {
            name,
            email,
            password: self.password,
            role,
        })
    }
}

/// Parses a `{id}` path segment into a positive user id.
pub fn parse_user_id(raw: &str) -> Result<i32, ValidationError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::single("User id must be a positive integer")),
    }
}
