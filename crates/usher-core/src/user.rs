use crate::UtcTimestamp;
use serde::{Deserialize, Serialize};

/// A provisioned user record as persisted by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub job: String,
    #[serde(rename = "createdAt")]
    pub created_at: UtcTimestamp,
}

/// Input for user creation. The record store assigns `id` and `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub job: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job: job.into(),
        }
    }
}

/// A validated signup request. The email addresses the welcome
/// notification and is never persisted on the user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signup {
    pub name: String,
    pub job: String,
    pub email: String,
}

impl Signup {
    pub fn new(
        name: impl Into<String>,
        job: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            job: job.into(),
            email: email.into(),
        }
    }
}

impl From<&Signup> for NewUser {
    fn from(signup: &Signup) -> Self {
        Self {
            name: signup.name.clone(),
            job: signup.job.clone(),
        }
    }
}
