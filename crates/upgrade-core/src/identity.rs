use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::IdentityError;

static IDENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<name>[^<>]*?)\s*<(?P<email>[^<>]*)>\s*$").expect("valid identity regex")
});

// Local parts may carry `+` and `[bot]`, as in
// `41898282+github-actions[bot]@users.noreply.github.com`.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9._%+\-\[\]]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$",
    )
    .expect("valid email regex")
});

/// A git author or committer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    name: String,
    email: String,
}

impl Identity {
    /// # Errors
    ///
    /// Returns an error if the name is empty or the email is not a valid address.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, IdentityError> {
        let name = name.into();
        let email = email.into();

        if name.trim().is_empty() {
            return Err(IdentityError::EmptyName {
                input: format!("{name} <{email}>"),
            });
        }

        if !EMAIL_PATTERN.is_match(&email) {
            return Err(IdentityError::InvalidEmail { email });
        }

        Ok(Self {
            name: name.trim().to_string(),
            email,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let captures = IDENTITY_PATTERN
            .captures(input)
            .ok_or_else(|| IdentityError::Malformed {
                input: input.to_string(),
            })?;

        let name = &captures["name"];
        if name.is_empty() {
            return Err(IdentityError::EmptyName {
                input: input.to_string(),
            });
        }

        Self::new(name, &captures["email"])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
