use std::cell::{Cell, RefCell};

use tracing::debug;

use crate::{Credentials, GitError, Repository, Result};

fn remote_callbacks(credentials: Option<&Credentials>) -> git2::RemoteCallbacks<'_> {
    let mut callbacks = git2::RemoteCallbacks::new();
    if let Some(credentials) = credentials {
        let attempted = Cell::new(false);
        callbacks.credentials(move |_url, _username, _allowed| {
            // libgit2 keeps asking while the remote refuses; fail after one try.
            if attempted.replace(true) {
                return Err(git2::Error::from_str("remote rejected the supplied credentials"));
            }
            git2::Cred::userpass_plaintext(&credentials.username, &credentials.password)
        });
    }
    callbacks
}

fn remote_tracking_ref(remote: &str, branch: &str) -> String {
    format!("refs/remotes/{remote}/{branch}")
}

impl Repository {
    /// # Errors
    ///
    /// Returns an error if the remote lookup fails.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>> {
        let Ok(remote) = self.inner.find_remote(name) else {
            return Ok(None);
        };

        Ok(remote.url().map(String::from))
    }

    fn find_remote(&self, name: &str) -> Result<git2::Remote<'_>> {
        self.inner
            .find_remote(name)
            .map_err(|_| GitError::RemoteNotFound {
                name: name.to_string(),
            })
    }

    /// Fetches `branch` into its remote-tracking ref and returns the fetched head.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote is unknown, the fetch fails, or the branch
    /// does not exist on the remote.
    pub fn fetch_branch(
        &self,
        remote: &str,
        branch: &str,
        credentials: Option<&Credentials>,
    ) -> Result<String> {
        let mut git_remote = self.find_remote(remote)?;
        let tracking = remote_tracking_ref(remote, branch);
        let refspec = format!("+refs/heads/{branch}:{tracking}");

        let mut options = git2::FetchOptions::new();
        options.remote_callbacks(remote_callbacks(credentials));
        git_remote.fetch(&[refspec.as_str()], Some(&mut options), None)?;

        let head = self.resolve_commit(&tracking)?.id().to_string();
        debug!(remote, branch, head = %head, "fetched branch");
        Ok(head)
    }

    /// Looks up the head of `branch` on the remote without fetching it.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote is unknown or cannot be contacted.
    pub fn remote_branch_head(
        &self,
        remote: &str,
        branch: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Option<String>> {
        let mut git_remote = self.find_remote(remote)?;
        let connection = git_remote.connect_auth(
            git2::Direction::Fetch,
            Some(remote_callbacks(credentials)),
            None,
        )?;

        let target = format!("refs/heads/{branch}");
        let head = connection
            .list()?
            .iter()
            .find(|head| head.name() == target)
            .map(|head| head.oid().to_string());

        Ok(head)
    }

    /// Force-pushes the local `branch`, provided the remote head still equals
    /// `expected_remote_head` (`None` meaning the branch must not exist yet).
    ///
    /// # Errors
    ///
    /// Returns [`GitError::LeaseRejected`] if the remote moved, [`GitError::PushRejected`]
    /// if the remote refused the update, or another error if the push fails.
    pub fn push_branch(
        &self,
        remote: &str,
        branch: &str,
        expected_remote_head: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> Result<()> {
        let expected = expected_remote_head.map(git2::Oid::from_str).transpose()?;
        let refname = format!("refs/heads/{branch}");
        let refspec = format!("+{refname}:{refname}");

        let stale_head: RefCell<Option<String>> = RefCell::new(None);
        let rejection: RefCell<Option<(String, String)>> = RefCell::new(None);

        let mut git_remote = self.find_remote(remote)?;
        let push_result = {
            let mut callbacks = remote_callbacks(credentials);
            callbacks.push_negotiation(|updates| {
                for update in updates {
                    if update.dst_refname() != Some(refname.as_str()) {
                        continue;
                    }
                    let actual = update.src();
                    let holds = match expected {
                        Some(expected) => actual == expected,
                        None => actual.is_zero(),
                    };
                    if !holds {
                        *stale_head.borrow_mut() = Some(actual.to_string());
                        return Err(git2::Error::from_str("stale lease"));
                    }
                }
                Ok(())
            });
            callbacks.push_update_reference(|updated, status| {
                if let Some(message) = status {
                    *rejection.borrow_mut() = Some((updated.to_string(), message.to_string()));
                }
                Ok(())
            });

            let mut options = git2::PushOptions::new();
            options.remote_callbacks(callbacks);
            git_remote.push(&[refspec.as_str()], Some(&mut options))
        };

        if let Some(actual) = stale_head.into_inner() {
            return Err(GitError::LeaseRejected {
                branch: branch.to_string(),
                expected: expected_remote_head.map(String::from),
                actual,
            });
        }
        push_result?;

        if let Some((refname, message)) = rejection.into_inner() {
            return Err(GitError::PushRejected { refname, message });
        }

        debug!(remote, branch, "pushed branch");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the remote is unknown or refuses the deletion.
    pub fn delete_remote_branch(
        &self,
        remote: &str,
        branch: &str,
        credentials: Option<&Credentials>,
    ) -> Result<()> {
        let mut git_remote = self.find_remote(remote)?;
        let refspec = format!(":refs/heads/{branch}");

        let mut options = git2::PushOptions::new();
        options.remote_callbacks(remote_callbacks(credentials));
        git_remote.push(&[refspec.as_str()], Some(&mut options))?;

        debug!(remote, branch, "deleted remote branch");
        Ok(())
    }
}
