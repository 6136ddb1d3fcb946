//! Request error taxonomy
//!
//! Every fault raised while handling an upload ends up here and is turned
//! into a JSON error response in one place.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::http;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum DiagnoseError {
    #[error("No image provided")]
    MissingImage,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Field \"image\" must be a file upload")]
    NotAFile,

    #[error("Missing Content-Type header, expected multipart/form-data")]
    MissingContentType,

    #[error("{0}")]
    Multipart(#[from] multer::Error),

    #[error("{0}")]
    Body(String),
}

impl DiagnoseError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingImage => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotAFile | Self::MissingContentType | Self::Multipart(_) | Self::Body(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message for the `error` field; empty messages become a generic one
    pub fn message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        http::build_error_response(self.status(), &self.message())
    }
}
