//! HTTP reachability probe

use std::time::Duration;

use async_trait::async_trait;
use futures::future::select_ok;
use tracing::debug;

use crate::config::ReachabilityConfig;
use crate::traits::Reachability;

/// Online if any configured probe URL answers a `HEAD` request
#[derive(Debug, Clone)]
pub struct HttpReachability {
    client: reqwest::Client,
    probes: Vec<String>,
    timeout: Duration,
}

impl HttpReachability {
    pub fn new(config: &ReachabilityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            probes: config.probes.clone(),
            timeout: config.timeout(),
        }
    }
}

impl Default for HttpReachability {
    fn default() -> Self {
        Self::new(&ReachabilityConfig::default())
    }
}

#[async_trait]
impl Reachability for HttpReachability {
    async fn is_online(&self) -> bool {
        if self.probes.is_empty() {
            return true;
        }

        let requests = self.probes.iter().map(|url| {
            let request = self.client.head(url).timeout(self.timeout).send();
            Box::pin(async move {
                request.await.map_err(|e| {
                    debug!(url = %url, "Reachability probe failed: {}", e);
                    e
                })
            })
        });

        match select_ok(requests).await {
            Ok((response, _)) => {
                debug!(url = %response.url(), status = %response.status(), "Reachability probe answered");
                true
            }
            Err(_) => false,
        }
    }
}
