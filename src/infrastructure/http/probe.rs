// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::shared::error::KubeError;
use reqwest::Client;
use tracing::debug;

/// Single-shot HTTP GET against a service endpoint
#[async_trait::async_trait]
pub trait HttpProbe: Send + Sync {
    /// First line of the body returned by `GET http://<endpoint>/`
    async fn first_line(&self, endpoint: &str) -> Result<String, KubeError>;
}

/// Probe backed by reqwest. No timeout, retry or TLS is configured; a hung
/// endpoint hangs the probe.
pub struct ReqwestProbe {
    client: Client,
}

impl Default for ReqwestProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestProbe {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

pub fn probe_url(endpoint: &str) -> String {
    format!("http://{}/", endpoint)
}

pub fn first_line_of(body: &str) -> String {
    body.lines().next().unwrap_or_default().to_string()
}

#[async_trait::async_trait]
impl HttpProbe for ReqwestProbe {
    async fn first_line(&self, endpoint: &str) -> Result<String, KubeError> {
        let url = probe_url(endpoint);
        debug!("GET {}", url);

        let body = self.client.get(&url).send().await?.text().await?;
        Ok(first_line_of(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_url() {
        assert_eq!(probe_url("10.0.0.7"), "http://10.0.0.7/");
        assert_eq!(
            probe_url("a1b2.elb.amazonaws.com"),
            "http://a1b2.elb.amazonaws.com/"
        );
    }

    #[test]
    fn test_first_line_of() {
        assert_eq!(first_line_of("{\"server\":\"a\"}\nsecond\n"), "{\"server\":\"a\"}");
        assert_eq!(first_line_of(""), "");
        assert_eq!(first_line_of("only\r\n"), "only");
    }
}
