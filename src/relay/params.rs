//! Call-site parameters carried through the relay's query string.
//!
//! The calling application provides `redirect` (where the identity goes) and
//! `auth` (the authentication backend base URL). Nothing else is shared with
//! the caller, so both are re-serialized into every relay URL the flow moves
//! through, together with the optional `provider` tag.

use super::error::RelayError;
use url::form_urlencoded;

pub const PARAM_REDIRECT: &str = "redirect";
pub const PARAM_AUTH: &str = "auth";
pub const PARAM_PROVIDER: &str = "provider";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayParameters {
    redirect_target: Option<String>,
    auth_base: Option<String>,
    provider: Option<String>,
}

impl RelayParameters {
    #[must_use]
    pub fn new(redirect_target: Option<String>, auth_base: Option<String>) -> Self {
        Self {
            redirect_target: non_empty(redirect_target),
            auth_base: non_empty(auth_base),
            provider: None,
        }
    }

    /// Read the parameters from a raw query string (without the leading `?`).
    /// Empty values count as absent; the first occurrence of a key wins.
    #[must_use]
    pub fn resolve(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(query) = query else {
            return params;
        };

        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let slot = match key.as_ref() {
                PARAM_REDIRECT => &mut params.redirect_target,
                PARAM_AUTH => &mut params.auth_base,
                PARAM_PROVIDER => &mut params.provider,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }

        params
    }

    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_target.as_deref()
    }

    #[must_use]
    pub fn auth_base(&self) -> Option<&str> {
        self.auth_base.as_deref()
    }

    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// # Errors
    /// `RelayError::Config` when the caller did not supply `auth`.
    pub fn require_auth_base(&self) -> Result<&str, RelayError> {
        self.auth_base().ok_or_else(|| {
            RelayError::Config(
                "The authentication backend is not configured: missing `auth` parameter."
                    .to_string(),
            )
        })
    }

    /// # Errors
    /// `RelayError::Config` when the caller did not supply `redirect`.
    pub fn require_redirect_target(&self) -> Result<&str, RelayError> {
        self.redirect_target().ok_or_else(|| {
            RelayError::Config(
                "No application to return to: missing `redirect` parameter.".to_string(),
            )
        })
    }

    /// Rewrite the parameters to exactly `redirect`, `auth` and the given
    /// provider tag, returning the new query string.
    pub fn persist(&mut self, provider: Option<&str>) -> String {
        self.provider = provider.filter(|tag| !tag.is_empty()).map(ToString::to_string);
        self.to_query()
    }

    /// Drop the provider tag, keeping `redirect` and `auth`.
    pub fn drop_provider(&mut self) -> String {
        self.persist(None)
    }

    /// Serialize into a query string (without the leading `?`).
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(redirect) = &self.redirect_target {
            serializer.append_pair(PARAM_REDIRECT, redirect);
        }
        if let Some(auth) = &self.auth_base {
            serializer.append_pair(PARAM_AUTH, auth);
        }
        if let Some(provider) = &self.provider {
            serializer.append_pair(PARAM_PROVIDER, provider);
        }
        serializer.finish()
    }

    /// A relay path carrying the current parameters, e.g. `/?redirect=...`.
    #[must_use]
    pub fn relay_path(&self, path: &str) -> String {
        let query = self.to_query();
        if query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{query}")
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn resolves_both_parameters() {
        let params = RelayParameters::resolve(Some(
            "redirect=https%3A%2F%2Fapp.example%2Fcb&auth=https://id.example",
        ));
        assert_eq!(params.redirect_target(), Some("https://app.example/cb"));
        assert_eq!(params.auth_base(), Some("https://id.example"));
        assert_eq!(params.provider(), None);
    }

    #[test]
    fn absent_and_empty_parameters() {
        assert_eq!(RelayParameters::resolve(None), RelayParameters::default());

        let params = RelayParameters::resolve(Some("redirect=&auth=&other=1"));
        assert_eq!(params.redirect_target(), None);
        assert_eq!(params.auth_base(), None);
        assert!(matches!(
            params.require_auth_base(),
            Err(RelayError::Config(_))
        ));
        assert!(matches!(
            params.require_redirect_target(),
            Err(RelayError::Config(_))
        ));
    }

    #[test]
    fn persisted_query_survives_reload() {
        let mut params = RelayParameters::new(
            Some("https://app.example/cb".to_string()),
            Some("https://id.example".to_string()),
        );
        let query = params.persist(Some("facebook"));

        let reloaded = RelayParameters::resolve(Some(&query));
        assert_eq!(reloaded.redirect_target(), Some("https://app.example/cb"));
        assert_eq!(reloaded.auth_base(), Some("https://id.example"));
        assert_eq!(reloaded.provider(), Some("facebook"));
        assert_eq!(reloaded, params);
    }

    #[test]
    fn drop_provider_keeps_call_site_parameters() {
        let mut params =
            RelayParameters::resolve(Some("redirect=/cb&auth=https://id.example&provider=facebook"));
        let query = params.drop_provider();
        assert_eq!(query, "redirect=%2Fcb&auth=https%3A%2F%2Fid.example");
        assert_eq!(params.provider(), None);
    }

    #[test]
    fn relay_path_without_parameters() {
        assert_eq!(RelayParameters::default().relay_path("/"), "/");
        let params = RelayParameters::new(None, Some("https://id.example".to_string()));
        assert_eq!(params.relay_path("/"), "/?auth=https%3A%2F%2Fid.example");
    }
}
