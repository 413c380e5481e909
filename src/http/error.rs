//! Host default error path.
//!
//! Handler failures reach axum unchanged; this is where they become a
//! generic `500` and get logged. A request body cut off by the body limit
//! while streaming is the client's fault and gets `413` instead.

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;

use crate::portable::HandlerError;

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        if exceeds_body_limit(&self) {
            tracing::debug!(error = %self, "Request body over limit");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
        }
        tracing::error!(error = %self, "Request handler failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

fn exceeds_body_limit(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portable::Body;
    use bytes::Bytes;
    use http_body_util::{Full, Limited};

    #[tokio::test]
    async fn handler_error_is_a_generic_500() {
        let res = HandlerError::other("secret detail").into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Internal Server Error");
    }

    #[tokio::test]
    async fn body_over_limit_is_413() {
        let limited = Limited::new(Full::new(Bytes::from_static(b"far more than four bytes")), 4);
        let host = axum::body::Body::new(limited);
        let err = Body::from_stream(host.into_data_stream()).collect().await.unwrap_err();

        let res = HandlerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn other_stream_failures_stay_500() {
        let broken = futures_util::stream::iter(vec![Err::<Bytes, _>(std::io::Error::other("reset"))]);
        let err = Body::from_stream(broken).collect().await.unwrap_err();

        let res = HandlerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
