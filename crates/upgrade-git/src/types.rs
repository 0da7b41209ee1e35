use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
}

/// Hash of a git tree. Two change sets with equal fingerprints have identical content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeFingerprint(String);

impl TreeFingerprint {
    pub(crate) fn from_oid(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TreeFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TreeFingerprint {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Name and email recorded on a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signer {
    pub name: String,
    pub email: String,
}

impl Signer {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// HTTPS credentials for the remote.
#[derive(Clone)]
pub struct Credentials {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl Credentials {
    /// Token authentication as accepted by GitHub for HTTPS remotes.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            username: "x-access-token".to_string(),
            password: token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
