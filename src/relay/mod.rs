//! Handshake protocol of the sign-in relay.
//!
//! The relay carries the caller's `redirect`/`auth` parameters across the
//! provider login, keeps the resulting identity in a single local entry, and
//! finally transfers `name` and `email` to the caller through a redirect.

pub mod error;
pub mod handoff;
pub mod identity;
pub mod machine;
pub mod params;
pub mod providers;
pub mod session;

pub use self::error::RelayError;
pub use self::handoff::{handoff_url, Navigator, RedirectNavigator, RedirectPolicy};
pub use self::identity::IdentityRecord;
pub use self::machine::{Relay, SessionState};
pub use self::params::RelayParameters;
pub use self::providers::{AuthBackend, Exchange, LoginMethod};
pub use self::session::{CookieSessionStore, MemorySessionStore, SessionStore};
