//! Edge gateway for Propex. Every inbound request crosses the trust
//! boundary here: public prefixes pass through untouched, everything else
//! must present a verifiable bearer token before it is forwarded to the
//! backend resolved for its path.

pub mod auth;
pub mod proxy;
pub mod state;

pub use state::GatewayState;
