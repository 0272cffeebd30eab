use thiserror::Error;

/// Why a single lookup ended without a snapshot.
///
/// `Display` is the message shown to the user; provider details are kept as
/// the error source so they can still be logged.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Blank search input, rejected before any network call.
    #[error("Please enter a city name.")]
    EmptyQuery,

    /// Coordinates outside the valid latitude/longitude range.
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180.")]
    InvalidCoordinates,

    /// A city-name lookup failed at transport, HTTP or decoding level.
    #[error("City not found. Please try again.")]
    LookupFailed {
        city: String,
        #[source]
        source: ProviderError,
    },

    /// A coordinate lookup failed at transport, HTTP or decoding level.
    #[error("Unable to fetch location weather.")]
    LocationLookupFailed {
        #[source]
        source: ProviderError,
    },

    /// The position source could not provide a position.
    #[error("Location access denied.")]
    LocationDenied {
        reason: String,
    },
}

impl FetchError {
    pub fn location_denied<S: Into<String>>(reason: S) -> Self {
        Self::LocationDenied {
            reason: reason.into(),
        }
    }
}

/// Low-level failure talking to a remote HTTP service.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    Shape(String),
}

impl ProviderError {
    pub fn shape<S: Into<String>>(message: S) -> Self {
        Self::Shape(message.into())
    }
}
