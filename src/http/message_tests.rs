//! Tests for HTTP request/response types.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

fn example_url() -> url::Url {
    url::Url::parse("https://example.com/").unwrap()
}

mod http_request {
    use super::*;

    #[test]
    fn new_creates_request_with_method_and_url() {
        let url = url::Url::parse("https://example.com/api").unwrap();
        let req = HttpRequest::new(http::Method::PUT, url.clone());

        assert_eq!(req.method, http::Method::PUT);
        assert_eq!(req.url, url);
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
        assert!(req.timeout.is_none());
    }

    #[test]
    fn get_is_a_bodiless_lookup() {
        let req = HttpRequest::get(example_url());

        assert_eq!(req.method, http::Method::GET);
        assert!(req.body.is_none());
    }

    #[test]
    fn with_body_sets_body() {
        let body = br#"{"content":"hi"}"#.to_vec();
        let req = HttpRequest::new(http::Method::POST, example_url()).with_body(body.clone());

        assert_eq!(req.body, Some(body));
    }

    #[test]
    fn with_timeout_sets_timeout() {
        let req = HttpRequest::get(example_url()).with_timeout(Duration::from_secs(10));

        assert_eq!(req.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn body_is_unbounded_unless_limited() {
        let req = HttpRequest::get(example_url());
        assert!(req.max_body.is_none());

        let req = req.with_max_body(4096);
        assert_eq!(req.max_body, Some(4096));
    }
}

mod http_response {
    use super::*;

    #[test]
    fn is_success_returns_true_for_2xx() {
        for status in [
            http::StatusCode::OK,
            http::StatusCode::CREATED,
            http::StatusCode::NO_CONTENT,
        ] {
            let resp = HttpResponse::new(status, http::HeaderMap::new(), vec![]);
            assert!(resp.is_success(), "Expected {status} to be success");
        }
    }

    #[test]
    fn is_success_returns_false_for_non_2xx() {
        for status in [
            http::StatusCode::BAD_REQUEST,
            http::StatusCode::UNAUTHORIZED,
            http::StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let resp = HttpResponse::new(status, http::HeaderMap::new(), vec![]);
            assert!(!resp.is_success(), "Expected {status} to not be success");
        }
    }

    #[test]
    fn body_text_returns_valid_utf8() {
        let resp = HttpResponse::new(
            http::StatusCode::OK,
            http::HeaderMap::new(),
            b"203.0.113.5\n".to_vec(),
        );

        assert_eq!(resp.body_text(), Some("203.0.113.5\n"));
    }

    #[test]
    fn body_text_returns_none_for_invalid_utf8() {
        let resp = HttpResponse::new(http::StatusCode::OK, http::HeaderMap::new(), vec![0xFF, 0xFE]);

        assert!(resp.body_text().is_none());
    }
}

mod http_error {
    use super::*;
    use std::error::Error;

    #[test]
    fn connection_error_preserves_source() {
        let error = HttpError::Connection(Box::new(std::io::Error::other("network unavailable")));

        assert!(error.to_string().contains("Connection error"));
        assert!(
            error
                .source()
                .unwrap()
                .to_string()
                .contains("network unavailable")
        );
    }

    #[test]
    fn timeout_displays_message() {
        assert_eq!(HttpError::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn invalid_url_displays_message() {
        let error = HttpError::InvalidUrl("missing scheme".to_string());

        assert!(error.to_string().contains("Invalid URL"));
        assert!(error.to_string().contains("missing scheme"));
    }

    #[test]
    fn body_too_large_names_the_limit() {
        assert_eq!(
            HttpError::BodyTooLarge { limit: 4096 }.to_string(),
            "Response body exceeds 4096 bytes"
        );
    }
}

mod http_client_trait {
    use super::*;

    struct CountingClient {
        call_count: AtomicUsize,
    }

    impl HttpClient for CountingClient {
        async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse::new(
                http::StatusCode::OK,
                http::HeaderMap::new(),
                vec![],
            ))
        }
    }

    #[tokio::test]
    async fn arc_client_delegates_to_inner() {
        let inner = Arc::new(CountingClient {
            call_count: AtomicUsize::new(0),
        });
        let shared = Arc::clone(&inner);

        shared.request(HttpRequest::get(example_url())).await.unwrap();
        shared.request(HttpRequest::get(example_url())).await.unwrap();

        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }
}
