//! In-process transport that replays canned replies and records every request.
//!
//! Replies are queued per (method, URL). The last queued reply for a route is
//! sticky, so a single failure reply covers every retry. Timestamps use the
//! tokio clock, which makes backoff gaps exact under a paused runtime.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::time::Instant;
use wtdl_core::transport::Method;
use wtdl_core::{HttpRequest, HttpResponse, HttpTransport, TransportError};

#[derive(Clone)]
pub enum Reply {
    /// Respond after feeding `ticks` to the request's progress callback.
    Respond {
        response: HttpResponse,
        ticks: Vec<(u64, Option<u64>)>,
    },
    /// Fail with a libcurl error code (7 = couldn't connect, 47 = too many redirects).
    Fail(u32),
    /// Never answer; resolves as cancelled once the request's token fires.
    Hang,
}

impl Reply {
    pub fn status(status: u32, body: impl Into<Vec<u8>>) -> Self {
        Reply::Respond {
            response: HttpResponse {
                status,
                body: body.into(),
                ..Default::default()
            },
            ticks: Vec::new(),
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::status(200, body)
    }

    /// 200 whose effective URL differs from the request URL (redirects followed).
    pub fn landed_at(url: &str) -> Self {
        Reply::Respond {
            response: HttpResponse {
                status: 200,
                effective_url: url.to_string(),
                ..Default::default()
            },
            ticks: Vec::new(),
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::ok(value.to_string())
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Reply::Respond { response, .. } = &mut self {
            response.headers.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn with_ticks(mut self, progress: Vec<(u64, Option<u64>)>) -> Self {
        if let Reply::Respond { ticks, .. } = &mut self {
            *ticks = progress;
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub max_redirects: Option<u32>,
    pub at: Instant,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_slice(self.body.as_deref().unwrap_or_default()).unwrap()
    }
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), Vec<Reply>>>,
    log: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `reply` for `method url`.
    pub fn on(self, method: Method, url: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, url.to_string()))
            .or_default()
            .push(reply);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: Method, url: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.url == url)
            .collect()
    }

    fn next_reply(&self, request: &HttpRequest) -> Reply {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&(request.method, request.url.clone())) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Reply::status(404, "no route"),
        }
    }
}

impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.log.lock().unwrap().push(Recorded {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
            max_redirects: request.max_redirects,
            at: Instant::now(),
        });
        let reply = self.next_reply(&request);

        match reply {
            Reply::Respond {
                mut response,
                ticks,
            } => {
                if let Some(cb) = &request.on_progress {
                    for (loaded, total) in ticks {
                        cb(loaded, total);
                    }
                }
                if response.effective_url.is_empty() {
                    response.effective_url = request.url.clone();
                }
                Ok(response)
            }
            Reply::Fail(code) => Err(TransportError::Curl(curl::Error::new(code))),
            Reply::Hang => {
                match &request.cancel {
                    Some(token) => token.cancelled().await,
                    None => std::future::pending::<()>().await,
                }
                Err(TransportError::Cancelled)
            }
        }
    }
}
