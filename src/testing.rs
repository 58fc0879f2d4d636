//! In-memory gateway double for unit tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use url::Url;

use crate::gateway::{Method, RestGateway};
use crate::utils::error::RequestError;

type Reply = Result<Value, RequestError>;

/// Replies are queued per (method, path); the last reply of a queue repeats.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<(Method, String)>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn respond_get(&self, path: &str, body: Value) {
        self.push(Method::Get, path, Ok(body));
    }

    pub(crate) fn respond_post(&self, path: &str, body: Value) {
        self.push(Method::Post, path, Ok(body));
    }

    pub(crate) fn fail_get(&self, path: &str, error: RequestError) {
        self.push(Method::Get, path, Err(error));
    }

    pub(crate) fn fail_post(&self, path: &str, error: RequestError) {
        self.push(Method::Post, path, Err(error));
    }

    /// Every request seen so far, as (method, full URL)
    pub(crate) fn requests(&self) -> Vec<(Method, String)> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of requests with this method whose path ends with `suffix`
    pub(crate) fn count(&self, method: Method, suffix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, url)| {
                *m == method
                    && Url::parse(url)
                        .map(|u| u.path().ends_with(suffix))
                        .unwrap_or(false)
            })
            .count()
    }
}

#[async_trait]
impl RestGateway for ScriptedGateway {
    async fn request(&self, method: Method, url: &Url) -> Result<Value, RequestError> {
        self.requests
            .lock()
            .unwrap()
            .push((method, url.to_string()));

        let mut routes = self.routes.lock().unwrap();
        let Some(queue) = routes.get_mut(&(method, url.path().to_string())) else {
            return Err(RequestError::NotFound {
                url: url.to_string(),
            });
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or_else(|| {
                Err(RequestError::NotFound {
                    url: url.to_string(),
                })
            })
        }
    }
}
