// SQL API HTTP client
//
// Wraps `reqwest::Client` with statement submission, positional bindings,
// asynchronous-execution polling, and status-code mapping. Callers get a
// decoded `ResultSet` or a typed `Error`, never a raw response.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};
use url::Url;

use crate::auth::AccessToken;
use crate::error::Error;
use crate::sql::models::{
    Binding, QueryFailure, QueryStatus, ResultSet, StatementContext, StatementRequest,
};
use crate::transport::TransportConfig;

const STATEMENTS_PATH: &str = "api/v2/statements";
const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Outcome of a single HTTP exchange with the statements endpoint.
enum StatementResponse {
    Complete(ResultSet),
    Pending(QueryStatus),
}

/// HTTP client for the SQL API v2.
///
/// One client per session: it carries the bearer token as default headers
/// and the role/warehouse context sent with every statement.
pub struct SqlApiClient {
    http: reqwest::Client,
    base_url: Url,
    context: StatementContext,
    statement_timeout: Duration,
    poll_interval: Duration,
}

impl SqlApiClient {
    /// Create a client for `base_url` (e.g. `https://myorg-myacct.snowflakecomputing.com`).
    pub fn new(
        base_url: Url,
        token: &AccessToken,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_headers(token.headers()?)?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for any auth headers.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            context: StatementContext::default(),
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Role/warehouse/database/schema sent with each statement.
    #[must_use]
    pub fn with_context(mut self, context: StatementContext) -> Self {
        self.context = context;
        self
    }

    /// Server-side statement timeout, also bounding local polling.
    #[must_use]
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/api/v2/statements?requestId={uuid}`
    ///
    /// A fresh request id per submission lets the server deduplicate a
    /// transport-level resend of the same POST.
    fn statements_url(&self) -> Result<Url, Error> {
        let mut url = self.resolve(STATEMENTS_PATH)?;
        url.query_pairs_mut()
            .append_pair("requestId", &uuid::Uuid::new_v4().to_string());
        Ok(url)
    }

    /// Resolve a path (absolute or relative) against the account root.
    fn resolve(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Statements ───────────────────────────────────────────────────

    /// Execute one statement with positional `?` bindings and wait for it.
    ///
    /// The POST is sent exactly once. If the server answers 202 the status
    /// URL is polled until the statement completes or the statement timeout
    /// elapses.
    pub async fn execute(&self, statement: &str, bindings: &[Binding]) -> Result<ResultSet, Error> {
        let url = self.statements_url()?;
        let timeout_secs = self.statement_timeout.as_secs();
        let body = StatementRequest::new(statement, timeout_secs, &self.context, bindings);

        debug!(%url, bindings = bindings.len(), "POST statement");
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        match self.parse_response(resp).await? {
            StatementResponse::Complete(rs) => {
                debug!(handle = ?rs.statement_handle, rows = rs.row_count(), "statement complete");
                Ok(rs)
            }
            StatementResponse::Pending(status) => self.wait_for(status).await,
        }
    }

    /// Poll a running statement until it completes.
    async fn wait_for(&self, mut status: QueryStatus) -> Result<ResultSet, Error> {
        let deadline = Instant::now() + self.statement_timeout;

        loop {
            let status_path = match (&status.statement_status_url, &status.statement_handle) {
                (Some(url), _) => url.clone(),
                (None, Some(handle)) => format!("{STATEMENTS_PATH}/{handle}"),
                (None, None) => {
                    return Err(Error::UnexpectedResult(
                        "statement accepted without a handle".into(),
                    ));
                }
            };
            debug!(
                handle = ?status.statement_handle,
                message = ?status.message,
                "statement still running"
            );

            if Instant::now() >= deadline {
                return Err(Error::Timeout {
                    timeout_secs: self.statement_timeout.as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;

            let url = self.resolve(&status_path)?;
            trace!(%url, "GET statement status");
            let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

            match self.parse_response(resp).await? {
                StatementResponse::Complete(rs) => return Ok(rs),
                StatementResponse::Pending(next) => status = next,
            }
        }
    }

    /// Map status codes to typed errors and decode the body.
    async fn parse_response(&self, resp: reqwest::Response) -> Result<StatementResponse, Error> {
        let status = resp.status();
        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = resp.text().await.map_err(Error::Transport)?;

        match status.as_u16() {
            200 => serde_json::from_str::<ResultSet>(&body)
                .map(StatementResponse::Complete)
                .map_err(|e| deserialization_error(&e, body)),
            202 => serde_json::from_str::<QueryStatus>(&body)
                .map(StatementResponse::Pending)
                .map_err(|e| deserialization_error(&e, body)),
            401 => Err(Error::Authentication {
                message: failure_message(&body)
                    .unwrap_or_else(|| "access token rejected or expired".into()),
            }),
            403 => Err(Error::PermissionDenied {
                message: failure_message(&body).unwrap_or_else(|| "HTTP 403".into()),
            }),
            408 => Err(Error::Timeout {
                timeout_secs: self.statement_timeout.as_secs(),
            }),
            429 => Err(Error::RateLimited {
                retry_after_secs: retry_after.unwrap_or(0),
            }),
            code => match serde_json::from_str::<QueryFailure>(&body) {
                Ok(QueryFailure {
                    code: Some(api_code),
                    sql_state,
                    message,
                }) => Err(Error::Statement {
                    code: api_code,
                    sql_state,
                    message: message.unwrap_or_default(),
                }),
                _ => Err(Error::Http {
                    status: code,
                    message: preview(&body).to_owned(),
                }),
            },
        }
    }
}

fn failure_message(body: &str) -> Option<String> {
    serde_json::from_str::<QueryFailure>(body)
        .ok()
        .and_then(|f| f.message)
}

fn deserialization_error(e: &serde_json::Error, body: String) -> Error {
    Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    }
}

/// First 200 characters of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
