//! Jira REST client and connector.

use std::time::Duration;

use async_trait::async_trait;
use release::{
    IssueCount, IssueTracker, ProjectKey, Timestamp, TrackerConnector, TrackerCredentials,
    TrackerError, TrackerLocation, TrackerProject, TrackerResult, TrackerVersion, VersionName,
    VersionRef,
};
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::wire::{
    self, NewVersion, ProjectPayload, ReleaseUpdate, UnresolvedCountPayload, VersionPayload,
};

/// Default request timeout when configuration does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds [`JiraClient`]s from fixed credentials.
#[derive(Debug, Clone)]
pub struct JiraConnector {
    credentials: Option<TrackerCredentials>,
    timeout: Duration,
}

impl JiraConnector {
    /// Creates a connector. `credentials` may be absent; connecting then fails
    /// with a configuration error, which only matters when a tracker is
    /// actually configured for the build.
    pub fn new(credentials: Option<TrackerCredentials>, timeout: Duration) -> Self {
        Self {
            credentials,
            timeout,
        }
    }
}

#[async_trait]
impl TrackerConnector for JiraConnector {
    type Client = JiraClient;

    async fn connect(&self, location: &TrackerLocation) -> TrackerResult<JiraClient> {
        let credentials = self.credentials.clone().ok_or_else(|| {
            TrackerError::Configuration(
                "tracker credentials are not configured \
                 (set RELGATE_TRACKER_USERNAME and RELGATE_TRACKER_PASSWORD or [tracker] in the config file)"
                    .to_owned(),
            )
        })?;
        let client = JiraClient::new(&location.base_url, credentials, self.timeout)?;
        client.check_authentication().await?;
        Ok(client)
    }
}

/// Authenticated Jira REST v2 client.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    credentials: TrackerCredentials,
}

impl JiraClient {
    /// Creates a client for the Jira instance at `base_url`.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Configuration`] when `base_url` is not an HTTP(S) URL or
    /// the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        credentials: TrackerCredentials,
        timeout: Duration,
    ) -> TrackerResult<Self> {
        let parsed = reqwest::Url::parse(base_url).map_err(|e| {
            TrackerError::Configuration(format!("invalid tracker base url '{base_url}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TrackerError::Configuration(format!(
                "tracker base url '{base_url}' must use http or https"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("relgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrackerError::Configuration(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            credentials,
        })
    }

    /// Root endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Confirms the credentials are accepted (`GET /rest/api/2/myself`).
    ///
    /// # Errors
    ///
    /// [`TrackerError::Authentication`] when Jira rejects the credentials.
    pub async fn check_authentication(&self) -> TrackerResult<()> {
        let url = api_url(&self.base_url, "myself");
        self.send(self.request(Method::GET, &url)).await?;
        debug!(
            base_url = %self.base_url,
            user = self.credentials.username(),
            "Authenticated against Jira"
        );
        Ok(())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(self.credentials.username(), Some(self.credentials.password()))
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> TrackerResult<String> {
        let response = request.send().await.map_err(transport)?;
        read_body(response).await
    }
}

/// Builds `{base}/rest/api/2/{path}`.
fn api_url(base_url: &str, path: &str) -> String {
    format!("{}/rest/api/2/{path}", base_url.trim_end_matches('/'))
}

fn transport(err: reqwest::Error) -> TrackerError {
    TrackerError::Transport(err.to_string())
}

/// Maps a non-success status onto the adapter error.
fn classify_status(status: StatusCode, body: String) -> TrackerError {
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("no response body").to_owned()
    } else {
        body
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TrackerError::Authentication {
            status: status.as_u16(),
            message,
        },
        _ => TrackerError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

async fn read_body(response: Response) -> TrackerResult<String> {
    let status = response.status();
    let body = response.text().await.map_err(transport)?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(classify_status(status, body))
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn project(&self, key: &ProjectKey) -> TrackerResult<Option<TrackerProject>> {
        let url = api_url(&self.base_url, &format!("project/{key}"));
        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(project = %key, "Jira reports no such project");
            return Ok(None);
        }
        let body = read_body(response).await?;
        wire::decode::<ProjectPayload>(&body)?.into_domain().map(Some)
    }

    async fn unresolved_issue_count(&self, version: &VersionRef) -> TrackerResult<IssueCount> {
        let url = format!("{}/unresolvedIssueCount", version.as_str().trim_end_matches('/'));
        let body = self.send(self.request(Method::GET, &url)).await?;
        Ok(wire::decode::<UnresolvedCountPayload>(&body)?.into_domain())
    }

    async fn release_version(
        &self,
        version: &VersionRef,
        released_at: Timestamp,
    ) -> TrackerResult<()> {
        let update = ReleaseUpdate {
            released: true,
            release_date: released_at.date().to_string(),
        };
        self.send(self.request(Method::PUT, version.as_str()).json(&update))
            .await?;
        Ok(())
    }

    async fn create_version(
        &self,
        project: &ProjectKey,
        name: &VersionName,
    ) -> TrackerResult<TrackerVersion> {
        let url = api_url(&self.base_url, "version");
        let body = NewVersion {
            name: name.as_str(),
            project: project.as_str(),
        };
        let response = self.send(self.request(Method::POST, &url).json(&body)).await?;
        wire::decode::<VersionPayload>(&response)?.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// One HTTP request as received by [`serve_once`].
    struct Received {
        request_line: String,
        head: String,
        body: String,
    }

    /// Accepts a single connection on a local port, answers it with `status`
    /// and `body`, and hands back what the client sent.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<Received>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let base_url = format!("http://{}", listener.local_addr().expect("stub addr"));

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.expect("read request");
                assert!(n > 0, "connection closed before headers were complete");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < header_end + length {
                let n = socket.read(&mut chunk).await.expect("read body");
                assert!(n > 0, "connection closed before body was complete");
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.expect("write response");
            let _ = socket.shutdown().await;

            let raw_head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
            Received {
                request_line: raw_head.lines().next().unwrap_or_default().to_owned(),
                head,
                body: String::from_utf8_lossy(&buf[header_end..header_end + length]).into_owned(),
            }
        });

        (base_url, handle)
    }

    fn client_for(base_url: &str) -> JiraClient {
        JiraClient::new(base_url, creds(), Duration::from_secs(5)).expect("client")
    }

    fn json(body: &str) -> serde_json::Value {
        serde_json::from_str(body).expect("json body")
    }

    fn creds() -> TrackerCredentials {
        TrackerCredentials::new("buildmaster", "secret")
    }

    #[rstest]
    #[case("https://jira.example.com", "https://jira.example.com/rest/api/2/myself")]
    #[case("https://jira.example.com/", "https://jira.example.com/rest/api/2/myself")]
    #[case("https://example.com/jira", "https://example.com/jira/rest/api/2/myself")]
    fn api_urls_keep_context_path(#[case] base: &str, #[case] expected: &str) {
        assert_eq!(api_url(base, "myself"), expected);
    }

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED)]
    #[case(StatusCode::FORBIDDEN)]
    fn auth_statuses_are_authentication_errors(#[case] status: StatusCode) {
        assert!(matches!(
            classify_status(status, String::new()),
            TrackerError::Authentication { .. }
        ));
    }

    #[test]
    fn other_statuses_keep_body() {
        match classify_status(StatusCode::BAD_REQUEST, "{\"errors\":{}}".to_owned()) {
            TrackerError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "{\"errors\":{}}");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn empty_body_falls_back_to_reason() {
        match classify_status(StatusCode::INTERNAL_SERVER_ERROR, " ".to_owned()) {
            TrackerError::Api { message, .. } => assert_eq!(message, "Internal Server Error"),
            other => panic!("unexpected: {other}"),
        }
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://jira.example.com")]
    fn bad_base_urls_are_configuration_errors(#[case] base: &str) {
        assert!(matches!(
            JiraClient::new(base, creds(), Duration::from_secs(1)),
            Err(TrackerError::Configuration(_))
        ));
    }

    #[test]
    fn base_url_is_normalized() {
        let client = JiraClient::new("https://jira.example.com/", creds(), DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "https://jira.example.com");
    }

    #[tokio::test]
    async fn unknown_project_is_absent() {
        let (base, server) =
            serve_once("404 Not Found", r#"{"errorMessages":["No project"]}"#).await;

        let project = client_for(&base)
            .project(&ProjectKey::new("ABC").unwrap())
            .await
            .unwrap();

        assert!(project.is_none());
        let request = server.await.unwrap();
        assert_eq!(request.request_line, "GET /rest/api/2/project/ABC HTTP/1.1");
        assert!(request.head.contains("authorization: basic "));
        assert!(request.head.contains("accept: application/json"));
    }

    #[tokio::test]
    async fn unresolved_count_reads_the_version_endpoint() {
        let (base, server) =
            serve_once("200 OK", r#"{"self":"x","issuesUnresolvedCount":3}"#).await;
        let version = VersionRef::new(format!("{base}/rest/api/2/version/10101")).unwrap();

        let count = client_for(&base).unresolved_issue_count(&version).await.unwrap();

        assert_eq!(count, IssueCount::new(3));
        assert_eq!(
            server.await.unwrap().request_line,
            "GET /rest/api/2/version/10101/unresolvedIssueCount HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn release_puts_released_flag_and_date() {
        let (base, server) = serve_once("200 OK", "").await;
        let version = VersionRef::new(format!("{base}/rest/api/2/version/10101")).unwrap();
        let released_at = Timestamp::from_utc(Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap());

        client_for(&base)
            .release_version(&version, released_at)
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert_eq!(request.request_line, "PUT /rest/api/2/version/10101 HTTP/1.1");
        assert_eq!(
            json(&request.body),
            serde_json::json!({"released": true, "releaseDate": "2024-03-09"})
        );
    }

    #[tokio::test]
    async fn create_posts_name_and_project() {
        let (base, server) = serve_once(
            "201 Created",
            r#"{"self":"https://jira.example.com/rest/api/2/version/10102","id":"10102","name":"2.4.0","released":false}"#,
        )
        .await;

        let created = client_for(&base)
            .create_version(
                &ProjectKey::new("ABC").unwrap(),
                &VersionName::new("2.4.0").unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(created.name.as_str(), "2.4.0");
        assert!(!created.released);
        assert_eq!(
            created.self_ref.as_str(),
            "https://jira.example.com/rest/api/2/version/10102"
        );
        let request = server.await.unwrap();
        assert_eq!(request.request_line, "POST /rest/api/2/version HTTP/1.1");
        assert_eq!(
            json(&request.body),
            serde_json::json!({"name": "2.4.0", "project": "ABC"})
        );
    }

    #[rstest]
    #[case("401 Unauthorized", 401)]
    #[case("403 Forbidden", 403)]
    #[tokio::test]
    async fn rejected_credentials_fail_connect(#[case] status: &'static str, #[case] code: u16) {
        let (base, server) = serve_once(status, "").await;
        let connector = JiraConnector::new(Some(creds()), Duration::from_secs(5));
        let location = TrackerLocation {
            url: format!("{base}/browse/ABC"),
            project_key: ProjectKey::new("ABC").unwrap(),
            base_url: base.clone(),
        };

        match connector.connect(&location).await {
            Err(TrackerError::Authentication { status, .. }) => assert_eq!(status, code),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connect should fail"),
        }
        assert_eq!(
            server.await.unwrap().request_line,
            "GET /rest/api/2/myself HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn connect_without_credentials_fails_before_any_request() {
        let connector = JiraConnector::new(None, DEFAULT_TIMEOUT);
        let location = TrackerLocation {
            url: "https://jira.example.com/browse/ABC".to_owned(),
            project_key: ProjectKey::new("ABC").unwrap(),
            base_url: "https://jira.example.com".to_owned(),
        };
        assert!(matches!(
            connector.connect(&location).await,
            Err(TrackerError::Configuration(_))
        ));
    }
}
