//! Credential callbacks for remote operations.
//!
//! HTTPS remotes authenticate with `GH_TOKEN` when it is set, falling back to
//! the configured credential helper. SSH remotes use the agent.

use git2::{Cred, CredentialType, FetchOptions, PushOptions, RemoteCallbacks};

/// Environment variable holding the access token.
pub const TOKEN_ENV: &str = "GH_TOKEN";

const MAX_ATTEMPTS: usize = 3;

pub fn remote_callbacks() -> RemoteCallbacks<'static> {
    let token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
    let mut attempts = 0;
    let mut callbacks = RemoteCallbacks::new();

    callbacks.credentials(move |url, username, allowed| {
        attempts += 1;
        if attempts > MAX_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(token) = &token {
                return Cred::userpass_plaintext("x-access-token", token);
            }
            let config = git2::Config::open_default()?;
            return Cred::credential_helper(&config, url, username);
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username.unwrap_or("git"));
        }
        Cred::default()
    });

    callbacks
}

pub fn fetch_options() -> FetchOptions<'static> {
    let mut options = FetchOptions::new();
    options.remote_callbacks(remote_callbacks());
    options
}

pub fn push_options() -> PushOptions<'static> {
    let mut callbacks = remote_callbacks();
    callbacks.push_update_reference(|refname, status| match status {
        Some(message) => Err(git2::Error::from_str(&format!(
            "{refname} rejected: {message}"
        ))),
        None => Ok(()),
    });
    let mut options = PushOptions::new();
    options.remote_callbacks(callbacks);
    options
}
