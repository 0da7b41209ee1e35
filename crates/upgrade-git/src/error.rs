use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git operation failed")]
    Git(#[from] git2::Error),

    #[error("not a git repository: '{path}'")]
    NotARepository { path: PathBuf },

    #[error("failed to resolve reference '{refspec}'")]
    RefNotFound { refspec: String },

    #[error("remote '{name}' is not configured")]
    RemoteNotFound { name: String },

    #[error("HEAD is detached, not on a branch")]
    DetachedHead,

    #[error(
        "push to '{branch}' rejected: remote head is {actual} but {} was expected",
        expected.as_deref().unwrap_or("no branch")
    )]
    LeaseRejected {
        branch: String,
        expected: Option<String>,
        actual: String,
    },

    #[error("remote rejected update of '{refname}': {message}")]
    PushRejected { refname: String, message: String },
}
