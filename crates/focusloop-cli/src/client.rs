//! HTTP client for a focusloop server, and a session sink that forwards to it.

use chrono::NaiveDate;
use focusloop_core::storage::Database;
use focusloop_core::stats::Insights;
use focusloop_core::{DailyProgress, NewSession, ProgressStore, SessionRecord, SessionSink, SessionStore};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use url::Url;

pub type ClientResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// A named slice of the session log, as exposed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Today,
    Week,
    Month,
    Range(NaiveDate, NaiveDate),
}

/// Client for the `/api` routes of a focusloop server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http_client: Client,
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base)?,
            http_client: Client::new(),
        })
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        let resp = self.http_client.get(url).send().await?;
        decode(resp).await
    }

    pub async fn create_session(&self, session: &NewSession) -> ClientResult<SessionRecord> {
        let resp = self
            .http_client
            .post(self.url("/api/sessions")?)
            .json(session)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn sessions(&self, window: Window) -> ClientResult<Vec<SessionRecord>> {
        let url = match window {
            Window::Today => self.url("/api/sessions/today")?,
            Window::Week => self.url("/api/sessions/week")?,
            Window::Month => self.url("/api/sessions/month")?,
            Window::Range(start, end) => {
                let mut url = self.url("/api/sessions/range")?;
                url.query_pairs_mut()
                    .append_pair("startDate", &start.format("%Y-%m-%d").to_string())
                    .append_pair("endDate", &end.format("%Y-%m-%d").to_string());
                url
            }
        };
        self.get_json(url).await
    }

    pub async fn insights(&self, daily_goal: u32) -> ClientResult<Insights> {
        let mut url = self.url("/api/stats/insights")?;
        url.query_pairs_mut()
            .append_pair("dailyGoal", &daily_goal.to_string());
        self.get_json(url).await
    }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let body: serde_json::Value = resp.json().await.unwrap_or_default();
    let message = body["error"].as_str().unwrap_or("request failed");
    Err(format!("server returned {status}: {message}").into())
}

/// Writes sessions to the local database and, when a server is configured,
/// mirrors each one there in the background.
pub struct RemoteSink {
    db: Database,
    remote: Option<ApiClient>,
    pending: Vec<JoinHandle<()>>,
}

impl RemoteSink {
    pub fn new(db: Database, remote: Option<ApiClient>) -> Self {
        Self {
            db,
            remote,
            pending: Vec::new(),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Wait for background uploads started so far.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!("upload task failed: {e}");
            }
        }
    }
}

impl SessionSink for RemoteSink {
    fn record_session(&mut self, session: NewSession) -> focusloop_core::error::Result<()> {
        let payload = self.remote.is_some().then(|| session.clone());
        self.db.create_session(session)?;
        if let (Some(client), Some(payload)) = (self.remote.clone(), payload) {
            self.pending.push(tokio::spawn(async move {
                if let Err(e) = client.create_session(&payload).await {
                    tracing::warn!("failed to upload session: {e}");
                }
            }));
        }
        Ok(())
    }

    fn record_progress(&mut self, progress: &DailyProgress) -> focusloop_core::error::Result<()> {
        self.db.save_progress(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusloop_core::Phase;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    const RECORD: &str = r#"{
        "id": "5f0c2f9e-0000-4000-8000-000000000001",
        "sessionType": "work",
        "duration": 25,
        "wasCompleted": true,
        "date": "2024-02-01",
        "completedAt": "2024-02-01T09:25:00Z"
    }"#;

    #[tokio::test]
    async fn create_session_posts_camel_case_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/sessions")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"sessionType":"work","duration":25,"wasCompleted":true,"date":"2024-02-01"}"#.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(RECORD)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let record = client
            .create_session(&NewSession::completed(Phase::Work, 25, d(1)))
            .await
            .unwrap();
        assert_eq!(record.duration, 25);
        assert_eq!(record.date, d(1));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn range_sends_date_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/sessions/range")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("startDate".into(), "2024-02-01".into()),
                mockito::Matcher::UrlEncoded("endDate".into(), "2024-02-07".into()),
            ]))
            .with_status(200)
            .with_body(format!("[{RECORD}]"))
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let records = client.sessions(Window::Range(d(1), d(7))).await.unwrap();
        assert_eq!(records.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/sessions")
            .with_status(400)
            .with_body(r#"{"error":"Invalid session data"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client
            .create_session(&NewSession::completed(Phase::Work, 25, d(1)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid session data"));
    }

    #[tokio::test]
    async fn sink_keeps_local_copy_when_upload_fails() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/sessions")
            .with_status(500)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let mut sink = RemoteSink::new(Database::open_memory().unwrap(), Some(client));
        sink.record_session(NewSession::completed(Phase::Work, 25, d(1)))
            .unwrap();
        sink.flush().await;

        mock.assert_async().await;
        assert_eq!(sink.db().sessions_by_date(d(1)).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sink_does_not_upload_locally_rejected_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/sessions")
            .expect(0)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let mut sink = RemoteSink::new(Database::open_memory().unwrap(), Some(client));
        let bad = NewSession {
            duration: 0,
            ..NewSession::completed(Phase::Work, 25, d(1))
        };
        assert!(sink.record_session(bad).is_err());
        sink.flush().await;

        mock.assert_async().await;
        assert!(sink.db().sessions_by_date(d(1)).unwrap().is_empty());
    }
}
