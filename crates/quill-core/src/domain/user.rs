use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of an account. Admins may edit any post; authors only their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Author,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Author => "author",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "author" => Ok(Role::Author),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// User entity - an author of the blog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: Role,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new author named after the local part of their email.
    pub fn new(email: &str, role: Role) -> Self {
        let email = email.to_lowercase();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: email.split('@').next().unwrap_or_default().to_string(),
            email,
            image: None,
            role,
            title: None,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Decides which email addresses may sign in and which of them are admins.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    domain: String,
    admins: Vec<String>,
}

impl AccessPolicy {
    pub fn new(domain: &str, admins: impl IntoIterator<Item = String>) -> Self {
        Self {
            domain: domain.trim_start_matches('@').to_lowercase(),
            admins: admins.into_iter().map(|e| e.trim().to_lowercase()).collect(),
        }
    }

    /// Only addresses of the organization's domain may authenticate.
    pub fn permits(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        match email.rsplit_once('@') {
            Some((local, domain)) => !local.is_empty() && domain == self.domain,
            None => false,
        }
    }

    /// Role granted to an account created on first sign-in.
    pub fn initial_role(&self, email: &str) -> Role {
        let email = email.trim().to_lowercase();
        if self.admins.iter().any(|a| *a == email) {
            Role::Admin
        } else {
            Role::Author
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}
