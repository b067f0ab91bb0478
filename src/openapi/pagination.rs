//! Paged listing of a whole dataset.
//!
//! A run first probes with a single-row window to learn the total count, then
//! walks full-size windows until every row has been requested. Pages answering
//! with a soft (non-success) result code are re-requested, up to
//! [`PagingPolicy::max_attempts`] times.

use std::time::Duration;

use tokio::time::sleep;
use url::Url;

use super::client::Transport;
use super::error::{OpenApiError, OpenApiResult};
use super::{Page, Source};

/// Upstream services refuse windows larger than this
pub const MAX_PAGE_SIZE: u64 = 1000;

/// A 1-based window of `size` rows, the `index`th of its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub index: u64,
    pub size: u64,
}

impl PageWindow {
    /// Smallest possible request, used to learn the total count
    pub fn probe() -> Self {
        PageWindow { index: 1, size: 1 }
    }

    pub fn first(size: u64) -> Self {
        PageWindow { index: 1, size }
    }

    pub fn next(self) -> Self {
        PageWindow {
            index: self.index + 1,
            ..self
        }
    }

    pub fn start_row(&self) -> u64 {
        (self.index - 1) * self.size + 1
    }

    pub fn end_row(&self) -> u64 {
        self.index * self.size
    }
}

#[derive(Debug, Clone)]
pub struct PagingPolicy {
    /// Rows per window, at least 1
    pub page_size: u64,
    /// Attempts per window while the result code is not a success, at least 1
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for PagingPolicy {
    fn default() -> Self {
        PagingPolicy {
            page_size: MAX_PAGE_SIZE,
            max_attempts: 3,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

/// A paginated open data listing
pub trait PagedSource {
    type Record;

    fn origin(&self) -> Source;

    fn page_url(&self, window: &PageWindow) -> OpenApiResult<Url>;

    fn parse_page(&self, url: &Url, body: &str) -> OpenApiResult<Page<Self::Record>>;
}

/// Fetches one window, re-requesting it while the page carries a soft result code
pub async fn fetch_page<S, T>(
    transport: &T,
    source: &S,
    window: &PageWindow,
    policy: &PagingPolicy,
) -> OpenApiResult<Page<S::Record>>
where
    S: PagedSource,
    T: Transport,
{
    let url = source.page_url(window)?;
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let body = transport
            .get(&url)
            .await
            .map_err(|error| OpenApiError::Transport {
                origin: source.origin(),
                url: url.to_string(),
                error,
            })?;

        let page = source.parse_page(&url, &body)?;
        if page.result.is_success() {
            return Ok(page);
        }

        if attempt >= max_attempts {
            return Err(OpenApiError::TransientResult {
                origin: source.origin(),
                url: url.to_string(),
                code: page.result.code,
                message: page.result.message,
                attempts: attempt,
            });
        }

        log::warn!(
            "[{}] unexpected result code {:?} at {} (attempt {}/{}), retrying",
            source.origin(),
            page.result,
            url,
            attempt,
            max_attempts
        );
        attempt += 1;
        sleep(policy.retry_backoff).await;
    }
}

/// Learns the listing's total row count from a single-row probe
pub async fn resolve_total_count<S, T>(
    transport: &T,
    source: &S,
    policy: &PagingPolicy,
) -> OpenApiResult<u64>
where
    S: PagedSource,
    T: Transport,
{
    let probe = fetch_page(transport, source, &PageWindow::probe(), policy).await?;
    Ok(probe.total_count)
}

/// Collects every row of the listing, in fetch order
pub async fn collect_all<S, T>(
    transport: &T,
    source: &S,
    policy: &PagingPolicy,
) -> OpenApiResult<Vec<S::Record>>
where
    S: PagedSource,
    T: Transport,
{
    let total_count = resolve_total_count(transport, source, policy).await?;
    log::info!("[{}] stations to collect: {}", source.origin(), total_count);

    let mut records = vec![];
    let mut window = PageWindow::first(policy.page_size.max(1));

    while window.start_row() <= total_count {
        let page = fetch_page(transport, source, &window, policy).await?;
        log::debug!(
            "[{}] rows {}..={} returned {} records",
            source.origin(),
            window.start_row(),
            window.end_row(),
            page.rows.len()
        );
        records.extend(page.rows);
        window = window.next();
    }

    log::info!("[{}] stations collected: {}", source.origin(), records.len());

    Ok(records)
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::openapi::client::TransportError;
    use crate::openapi::{decode_body, ResultCode};
    use crate::test_utils::{query_param, StubTransport};

    /// Listing whose rows are the row numbers themselves
    struct NumberedSource;

    #[derive(Deserialize)]
    struct NumberedPage {
        total: u64,
        code: String,
        rows: Vec<u64>,
    }

    impl PagedSource for NumberedSource {
        type Record = u64;

        fn origin(&self) -> Source {
            Source::Seoul
        }

        fn page_url(&self, window: &PageWindow) -> OpenApiResult<Url> {
            let mut url = Url::parse("http://openapi.example/numbers").unwrap();
            url.query_pairs_mut()
                .append_pair("index", &window.index.to_string())
                .append_pair("size", &window.size.to_string());
            Ok(url)
        }

        fn parse_page(&self, url: &Url, body: &str) -> OpenApiResult<Page<u64>> {
            let page: NumberedPage = decode_body(self.origin(), url, body)?;
            Ok(Page {
                total_count: page.total,
                result: ResultCode {
                    code: page.code,
                    message: String::new(),
                },
                rows: page.rows,
            })
        }
    }

    fn numbered_page(url: &Url, total: u64, code: &str) -> String {
        let index: u64 = query_param(url, "index").parse().unwrap();
        let size: u64 = query_param(url, "size").parse().unwrap();
        let window = PageWindow { index, size };
        let rows: Vec<u64> = (window.start_row()..=window.end_row().min(total)).collect();
        json!({ "total": total, "code": code, "rows": rows }).to_string()
    }

    fn policy(page_size: u64) -> PagingPolicy {
        PagingPolicy {
            page_size,
            max_attempts: 3,
            retry_backoff: Duration::ZERO,
        }
    }

    #[test]
    fn test_page_window_rows() {
        let window = PageWindow::first(1000);
        assert_eq!((window.start_row(), window.end_row()), (1, 1000));
        let window = window.next().next();
        assert_eq!((window.start_row(), window.end_row()), (2001, 3000));
        assert_eq!(PageWindow::probe().end_row(), 1);
    }

    #[tokio::test]
    async fn test_collects_every_row_once() {
        for (total, page_size, expected_pages) in [(2500, 1000, 3), (2000, 1000, 2), (7, 3, 3), (1, 1000, 1)] {
            let transport = StubTransport::new(move |url| Ok(numbered_page(url, total, "INFO-000")));

            let rows = collect_all(&transport, &NumberedSource, &policy(page_size))
                .await
                .unwrap();

            assert_eq!(rows, (1..=total).collect::<Vec<_>>());
            // the probe plus one request per page
            assert_eq!(transport.request_count(), 1 + expected_pages);
        }
    }

    #[tokio::test]
    async fn test_zero_page_size_walks_single_rows() {
        let transport = StubTransport::new(|url| Ok(numbered_page(url, 3, "INFO-000")));

        let rows = collect_all(&transport, &NumberedSource, &policy(0))
            .await
            .unwrap();

        assert_eq!(rows, vec![1, 2, 3]);
        assert_eq!(transport.request_count(), 4);
        assert!(transport
            .requests()
            .iter()
            .all(|url| query_param(url, "size") == "1"));
    }

    #[tokio::test]
    async fn test_empty_listing_only_probes() {
        let transport = StubTransport::new(|url| Ok(numbered_page(url, 0, "INFO-000")));

        let rows = collect_all(&transport, &NumberedSource, &policy(1000))
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_soft_result_code_retries_same_window() {
        let calls = AtomicUsize::new(0);
        let transport = StubTransport::new(move |url| {
            // second page request fails once
            let code = if calls.fetch_add(1, Ordering::SeqCst) == 2 {
                "INFO-300"
            } else {
                "INFO-000"
            };
            Ok(numbered_page(url, 4, code))
        });

        let rows = collect_all(&transport, &NumberedSource, &policy(2))
            .await
            .unwrap();

        assert_eq!(rows, vec![1, 2, 3, 4]);
        let requests = transport.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[2], requests[3]);
        assert_eq!(query_param(&requests[3], "index"), "2");
    }

    #[tokio::test]
    async fn test_persistent_soft_result_code_gives_up() {
        let transport = StubTransport::new(|url| Ok(numbered_page(url, 4, "INFO-300")));

        let err = collect_all(&transport, &NumberedSource, &policy(2))
            .await
            .unwrap_err();

        match err {
            OpenApiError::TransientResult { code, attempts, .. } => {
                assert_eq!(code, "INFO-300");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // gave up on the probe
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_probe_api_error_is_fatal() {
        let transport = StubTransport::new(|_| {
            Ok(json!({ "RESULT": { "CODE": "ERROR-290", "MESSAGE": "인증키가 유효하지 않습니다." } })
                .to_string())
        });

        let err = collect_all(&transport, &NumberedSource, &policy(2))
            .await
            .unwrap_err();

        assert!(matches!(err, OpenApiError::Api { ref code, .. } if code == "ERROR-290"));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_is_fatal() {
        let calls = AtomicUsize::new(0);
        let transport = StubTransport::new(move |url| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(numbered_page(url, 4, "INFO-000"))
            } else {
                Err(TransportError::EmptyBody)
            }
        });

        let err = collect_all(&transport, &NumberedSource, &policy(2))
            .await
            .unwrap_err();

        match err {
            OpenApiError::Transport { origin, url, .. } => {
                assert_eq!(origin, Source::Seoul);
                assert!(url.contains("index=1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(transport.request_count(), 2);
    }
}
