//! # Sign-in relay
//!
//! `signin-relay` is a single sign-in page shared by many applications. A
//! calling application sends the user to the relay with two query parameters:
//!
//! - `redirect`: where the authenticated identity should be sent.
//! - `auth`: base URL of the authentication backend that turns a provider
//!   credential into a user record.
//!
//! The user signs in with Google, Facebook or email/password. The relay keeps
//! the resulting identity in one browser cookie, shows it for review and, on
//! request, redirects to `{redirect}?u={name}&m={email}` while wiping the
//! cookie. The relay never shares a server-side session with the caller; all
//! inter-step state rides in the query string or in that cookie.

pub mod api;
pub mod cli;
pub mod relay;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
