mod gate;
mod migration;
mod oracle;
mod pipeline;
mod pull_request;

pub use gate::VerificationGate;
pub use migration::{MigrationInput, MigrationOperation, MigrationReport};
pub use oracle::OracleOperation;
pub use pipeline::{Pipeline, PipelineOutcome, PipelineState};
pub use pull_request::{PublishRequest, PullRequestManager, major_update_comment, render_body};
