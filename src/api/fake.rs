//! Scripted [`Transport`] for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;

use super::transport::{Params, Transport};

type Reply = Result<Value, ApiError>;

/// A call the fake received.
#[derive(Debug, Clone)]
pub struct Call {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl Call {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Route {
    path: String,
    matcher: Vec<(String, String)>,
    replies: VecDeque<Reply>,
}

impl Route {
    fn matches(&self, path: &str, params: &Params<'_>) -> bool {
        self.path == path
            && self
                .matcher
                .iter()
                .all(|(k, v)| params.iter().any(|(pk, pv)| pk == k && pv == v))
    }

    /// Replies are consumed in order; the last one repeats.
    fn next(&mut self) -> Reply {
        if self.replies.len() > 1 {
            self.replies.pop_front().unwrap_or_else(|| Err(http_error(599)))
        } else {
            self.replies.front().cloned().unwrap_or_else(|| Err(http_error(599)))
        }
    }
}

/// Routes calls by path plus required parameters to queued replies.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for calls to `path` carrying every `matcher` pair.
    pub fn on(&self, path: &str, matcher: &[(&str, &str)], reply: Reply) -> &Self {
        let matcher: Vec<(String, String)> = matcher
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut routes = self.routes.lock().unwrap();
        match routes
            .iter_mut()
            .find(|r| r.path == path && r.matcher == matcher)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                path: path.to_string(),
                matcher,
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str, params: &Params<'_>) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(Call {
            path: path.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });

        let mut routes = self.routes.lock().unwrap();
        routes
            .iter_mut()
            .find(|r| r.matches(path, params))
            .map(Route::next)
            .unwrap_or_else(|| Err(http_error(599)))
    }
}

/// An exhausted-retries error with the given status.
pub fn http_error(status: u16) -> ApiError {
    let mut error = ApiError::new("fake://api").with_response(status, "{}");
    error.attempts = 3;
    error
}
