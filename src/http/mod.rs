//! Resilient HTTP Module
//!
//! Outbound request plumbing for the lookup collaborators: a pluggable
//! transport, and a fetcher adding per-attempt timeouts, retries with full
//! jitter backoff, and `Retry-After` compliance.

mod backoff;
mod fetcher;
mod redact;
mod retry_after;
mod transport;
mod types;

pub use backoff::{calculate_backoff, max_backoff, FixedJitter, JitterSource, ThreadRngJitter};
pub use fetcher::{ResilientFetcher, RetryPolicy};
pub use redact::redact_url;
pub use retry_after::{parse_retry_after, parse_retry_after_at};
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::{HttpMethod, HttpRequest, HttpResponse};

/// User agent sent on every outbound request. MusicBrainz rejects anonymous
/// clients and asks for contact info (an email or URL) in parentheses; an
/// empty `contact` leaves it out.
pub fn user_agent(contact: &str) -> String {
    let product = concat!("MoodEnricher/", env!("CARGO_PKG_VERSION"));
    match contact.trim() {
        "" => product.to_string(),
        contact => format!("{product} ( {contact} )"),
    }
}
