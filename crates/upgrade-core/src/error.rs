use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity '{input}' is not of the form 'Name <email>'")]
    Malformed { input: String },

    #[error("identity '{input}' has an empty name")]
    EmptyName { input: String },

    #[error("'{email}' is not a valid email address")]
    InvalidEmail { email: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("repository '{input}' is not of the form 'owner/name'")]
    InvalidRepositorySlug { input: String },

    #[error("failed to parse repository URL '{url}'")]
    RepositoryUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid version '{version}'")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_identity_error_includes_input() {
        let err = IdentityError::Malformed {
            input: "just a name".to_string(),
        };

        assert!(err.to_string().contains("just a name"));
    }

    #[test]
    fn identity_error_converts_via_from() {
        let err: CoreError = IdentityError::InvalidEmail {
            email: "nope".to_string(),
        }
        .into();

        assert!(matches!(err, CoreError::Identity(_)));
        assert!(err.to_string().contains("nope"));
    }
}
