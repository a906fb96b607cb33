#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use reps_api::mailer::Mailer;
use reps_api::session::{COOKIE_NAME, SessionStore};
use reps_api::{AppState, AppStateInner};
use reps_db::Database;
use reps_types::config::Configuration;

#[derive(Debug, Clone)]
pub struct SentMail {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn last(&self) -> Option<SentMail> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(SentMail {
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// Default roster and courses, with mail delivery switched on.
pub fn test_config() -> Configuration {
    let mut config = Configuration::default();
    config.dev_mode = false;
    config.voter_pepper = "test-pepper".into();
    Configuration::from_toml(&config.to_toml().unwrap()).unwrap()
}

pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    router: Router,
    _dir: tempfile::TempDir,
}

/// One browser: carries a session cookie across requests.
pub struct Client<'a> {
    app: &'a TestApp,
    cookie: Option<String>,
    forwarded_for: String,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let config = test_config();
        config.save(&config_path).unwrap();

        let mailer = Arc::new(RecordingMailer::default());
        let state: AppState = Arc::new(AppStateInner::new(
            Database::open_in_memory().unwrap(),
            config,
            config_path,
            SessionStore::new(),
            mailer.clone(),
        ));
        let router = reps_api::router(state.clone());
        Self { state, mailer, router, _dir: dir }
    }

    pub fn client(&self, address: &str) -> Client<'_> {
        Client { app: self, cookie: None, forwarded_for: address.to_string() }
    }
}

impl Client<'_> {
    async fn send(&mut self, request: Request<Body>) -> Reply {
        let response = self.app.router.clone().oneshot(request).await.unwrap();

        if let Some(set) = response.headers().get(header::SET_COOKIE) {
            let set = set.to_str().unwrap();
            let pair = set.split(';').next().unwrap();
            assert!(pair.starts_with(COOKIE_NAME));
            self.cookie = Some(pair.to_string());
        }

        read_reply(response).await
    }

    /// Send the same form `count` times at once on this session.
    pub async fn post_concurrently(&mut self, path: &str, fields: &[(&str, &str)], count: usize) -> Vec<Reply> {
        let token = self.csrf().await;
        let mut all = vec![("_csrf", token.as_str())];
        all.extend_from_slice(fields);
        let body = serde_urlencoded::to_string(&all).unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..count {
            let request = self
                .request("POST", path)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.clone()))
                .unwrap();
            let router = self.app.router.clone();
            tasks.spawn(async move { read_reply(router.oneshot(request).await.unwrap()).await });
        }

        let mut replies = Vec::new();
        while let Some(reply) = tasks.join_next().await {
            replies.push(reply.unwrap());
        }
        replies
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("x-forwarded-for", &self.forwarded_for);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    pub async fn get(&mut self, path: &str) -> Reply {
        let request = self.request("GET", path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// POST a form. The session CSRF token is added automatically.
    pub async fn post(&mut self, path: &str, fields: &[(&str, &str)]) -> Reply {
        let token = self.csrf().await;
        let mut all = vec![("_csrf", token.as_str())];
        all.extend_from_slice(fields);
        self.post_raw(path, &all).await
    }

    pub async fn post_raw(&mut self, path: &str, fields: &[(&str, &str)]) -> Reply {
        let body = serde_urlencoded::to_string(fields).unwrap();
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Read the CSRF token from a rendered page.
    pub async fn csrf(&mut self) -> String {
        let page = self.get("/tickets/new").await;
        csrf_token(&page.body)
    }

    pub async fn login_as(&mut self, local_part: &str) {
        let reply = self.post("/login", &[("email", local_part)]).await;
        assert_eq!(reply.location.as_deref(), Some("/verify"));
        let code = sent_code(&self.app.mailer.last().unwrap().body);
        let reply = self.post("/verify", &[("code", code.as_str())]).await;
        assert_eq!(reply.location.as_deref(), Some("/"));
    }
}

async fn read_reply(response: axum::response::Response) -> Reply {
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    Reply { status, location, body: String::from_utf8(bytes.to_vec()).unwrap() }
}

pub fn csrf_token(html: &str) -> String {
    let marker = "name=\"_csrf\" value=\"";
    let start = html.find(marker).expect("page has a csrf field") + marker.len();
    let end = html[start..].find('"').unwrap();
    html[start..start + end].to_string()
}

pub fn sent_code(body: &str) -> String {
    let start = body.find("code is ").unwrap() + "code is ".len();
    body[start..start + 6].to_string()
}

/// Ticket id from a `/tickets/{id}` redirect.
pub fn ticket_id(reply: &Reply) -> i64 {
    let location = reply.location.as_deref().unwrap();
    location.trim_start_matches("/tickets/").parse().unwrap()
}
