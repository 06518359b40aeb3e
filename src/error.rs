use thiserror::Error;

/// Errors surfaced by the client.
///
/// Token-lifecycle problems are resolved internally where possible (a stale
/// access token triggers a transparent refresh); only the terminal cases reach
/// the caller. A failed refresh always collapses into `Unauthenticated` after
/// the stored credentials have been cleared.
#[derive(Debug, Error)]
pub enum Error {
    /// No credentials are stored, or the refresh credential was rejected.
    /// The operation was abandoned; the user must authenticate again.
    #[error("not authenticated")]
    Unauthenticated,

    /// Transport-level failure. Retryable by the caller; the client itself
    /// never retries.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("api error ({status}): {message}")]
    Api {
        status: u16,
        /// Machine-readable code from the response body, e.g. "INVALID_CREDENTIALS".
        code: Option<String>,
        message: String,
    },

    /// The credential store could not be read or written.
    #[error("credential storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Status code of an `Api` error, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Maps a non-success response to an `Api` error, using the server's
    /// `{message, code}` body when it provides one.
    pub(crate) async fn from_response(response: reqwest::Response) -> Error {
        #[derive(serde::Deserialize, Default)]
        struct ErrorBody {
            message: Option<String>,
            code: Option<String>,
        }

        let status = response.status().as_u16();
        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        let message = body
            .message
            .unwrap_or_else(|| default_message(status).to_string());
        Error::Api {
            status,
            code: body.code,
            message,
        }
    }
}

fn default_message(status: u16) -> &'static str {
    match status {
        400 => "bad request",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not found",
        _ => "request failed",
    }
}


pub type Result<T> = std::result::Result<T, Error>;
