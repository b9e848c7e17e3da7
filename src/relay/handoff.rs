//! Transfer of the signed-in identity to the calling application.

use super::{error::RelayError, identity::IdentityRecord, session::SessionStore};
use tracing::{info, warn};
use url::Url;

/// Issues the navigation away from the relay.
pub trait Navigator {
    fn navigate(&mut self, location: &str);
}

/// Records the location so an HTTP handler can answer with a redirect.
#[derive(Debug, Default)]
pub struct RedirectNavigator {
    location: Option<String>,
}

impl RedirectNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl Navigator for RedirectNavigator {
    fn navigate(&mut self, location: &str) {
        self.location = Some(location.to_string());
    }
}

/// Operator allow-list for redirect targets. Empty permits every target.
#[derive(Debug, Clone, Default)]
pub struct RedirectPolicy {
    allowed: Vec<Url>,
}

impl RedirectPolicy {
    /// Anything goes; the caller's `redirect` is trusted.
    #[must_use]
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Build from entries like `https://app.example` or `https://app.example/cb`.
    /// Entries that are not absolute URLs are skipped with a warning.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = entries
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref().trim();
                if entry.is_empty() {
                    return None;
                }
                Url::parse(entry)
                    .map_err(|err| warn!("Ignoring redirect allow-list entry {entry}: {err}"))
                    .ok()
            })
            .collect();
        Self { allowed }
    }

    #[must_use]
    pub fn is_permissive(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Relative targets stay on the relay's origin and are always allowed.
    /// Absolute targets must share an entry's origin and sit at or below its
    /// path, compared segment by segment.
    #[must_use]
    pub fn permits(&self, target: &str) -> bool {
        if self.is_permissive() {
            return true;
        }

        let Ok(target) = Url::parse(target) else {
            return target.starts_with('/') && !target.starts_with("//");
        };

        self.allowed
            .iter()
            .any(|entry| entry.origin() == target.origin() && within_path(entry.path(), target.path()))
    }
}

fn within_path(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Build `{target}?u={name}&m={email}` with both fields percent-encoded.
///
/// The fields join an existing query with `&` and always land before any
/// `#fragment`, so the caller receives them as query parameters.
#[must_use]
pub fn handoff_url(target: &str, record: &IdentityRecord) -> String {
    let (base, fragment) = match target.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (target, None),
    };
    let separator = match base.find('?') {
        None => "?",
        Some(_) if base.ends_with('?') || base.ends_with('&') => "",
        Some(_) => "&",
    };

    let mut location = format!(
        "{base}{separator}u={}&m={}",
        urlencoding::encode(&record.name),
        urlencoding::encode(&record.email)
    );
    if let Some(fragment) = fragment {
        location.push('#');
        location.push_str(fragment);
    }
    location
}

/// Read the stored identity, navigate to the caller, then clear the store.
///
/// The store is only cleared after the navigation has been issued; every
/// failure leaves it untouched.
///
/// # Errors
/// `Config` when the target is absent or not allowed, `Validation` when no
/// identity is stored.
pub fn perform<S, N>(
    store: &mut S,
    target: Option<&str>,
    policy: &RedirectPolicy,
    navigator: &mut N,
) -> Result<String, RelayError>
where
    S: SessionStore,
    N: Navigator,
{
    let target = target.filter(|target| !target.trim().is_empty()).ok_or_else(|| {
        RelayError::Config("No application to return to: missing `redirect` parameter.".to_string())
    })?;

    if !policy.permits(target) {
        warn!("Refusing hand-off to {target}: not in the redirect allow-list");
        return Err(RelayError::Config(format!(
            "Returning to {target} is not allowed."
        )));
    }

    let record = store.load().ok_or_else(|| {
        RelayError::Validation("Sign in before returning to the application.".to_string())
    })?;

    let location = handoff_url(target, &record);
    navigator.navigate(&location);
    store.clear();

    info!("Handed off identity to {target}");

    Ok(location)
}
