//! HTTP access for plugins that call remote APIs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::Result;

const USER_AGENT: &str = concat!("hello-project/", env!("CARGO_PKG_VERSION"));

/// Fetches a JSON document with a GET request.
///
/// Implementations must treat non-2xx responses, timeouts and undecodable
/// bodies as errors.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value>;
}

/// [`JsonFetcher`] backed by a `reqwest` client with a fixed per-request timeout.
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonFetcher for ReqwestFetcher {
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fakes shared by the plugin tests.

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::HelloError;

    /// Returns a canned response and counts calls.
    pub struct FakeFetcher {
        pub calls: Arc<AtomicU32>,
        pub last_query: Arc<Mutex<Vec<(String, String)>>>,
        response: std::result::Result<Value, String>,
    }

    impl FakeFetcher {
        pub fn returning(value: Value) -> Self {
            Self {
                calls: Arc::new(AtomicU32::new(0)),
                last_query: Arc::new(Mutex::new(Vec::new())),
                response: Ok(value),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                calls: Arc::new(AtomicU32::new(0)),
                last_query: Arc::new(Mutex::new(Vec::new())),
                response: Err(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl JsonFetcher for FakeFetcher {
        async fn get_json(&self, _url: &str, query: &[(&str, &str)]) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            match &self.response {
                Ok(value) => Ok(value.clone()),
                Err(message) => Err(HelloError::Plugin(message.clone())),
            }
        }
    }
}
