use thiserror::Error;

/// Top-level error type for the `rideview-api` crate.
///
/// Covers every failure mode at the wire boundary: transport, HTTP
/// status, schema violations, and the style/config handshake.
/// `rideview-core` maps these into per-cycle sync outcomes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-2xx response from the backend.
    #[error("Backend returned HTTP {status}")]
    Http { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Response body does not match the expected schema, with the raw
    /// body for debugging.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, body: String },

    /// Style config response is missing the `style` field.
    #[error("Style config response has no usable `style` URL")]
    MissingStyle,

    // ── Input ───────────────────────────────────────────────────────
    /// A query region violated the bounding-box invariant.
    #[error("Invalid region: {reason}")]
    InvalidRegion { reason: &'static str },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on a
    /// later poll cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the response body failed schema validation.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. } | Self::MissingStyle)
    }
}
