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

use crate::infrastructure::constants::WRK_BIN;
use crate::shared::error::KubeError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// One load-generator invocation against a resolved endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub endpoint: String,
    pub threads: u32,
    pub connections: u32,
    pub duration: Duration,
}

impl LoadRequest {
    pub fn url(&self) -> String {
        format!("http://{}/", self.endpoint)
    }

    /// `wrk -t1 -c45 -d30s http://<endpoint>/`
    pub fn wrk_args(&self) -> Vec<String> {
        vec![
            format!("-t{}", self.threads),
            format!("-c{}", self.connections),
            format!("-d{}s", self.duration.as_secs()),
            self.url(),
        ]
    }
}

#[async_trait::async_trait]
pub trait LoadGenerator: Send + Sync {
    /// Run with the caller's stdio so output streams live
    async fn run_streaming(&self, request: &LoadRequest) -> Result<i32, KubeError>;

    /// Run with stdout and stderr both redirected into `sink`
    async fn run_captured(&self, request: &LoadRequest, sink: &Path) -> Result<i32, KubeError>;
}

#[derive(Debug, Clone, Default)]
pub struct WrkRunner;

impl WrkRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(&self, request: &LoadRequest) -> Command {
        let mut command = Command::new(WRK_BIN);
        command
            .args(request.wrk_args())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[async_trait::async_trait]
impl LoadGenerator for WrkRunner {
    async fn run_streaming(&self, request: &LoadRequest) -> Result<i32, KubeError> {
        debug!("Running {} {:?}", WRK_BIN, request.wrk_args());
        let status = self
            .command(request)
            .status()
            .await
            .map_err(|e| KubeError::Process(format!("Failed to launch {}: {}", WRK_BIN, e)))?;

        Ok(status.code().unwrap_or(1))
    }

    async fn run_captured(&self, request: &LoadRequest, sink: &Path) -> Result<i32, KubeError> {
        let stdout = std::fs::OpenOptions::new().append(true).open(sink)?;
        let stderr = stdout.try_clone()?;

        debug!(
            "Running {} {:?} > {}",
            WRK_BIN,
            request.wrk_args(),
            sink.display()
        );
        let mut child = self
            .command(request)
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|e| KubeError::Process(format!("Failed to launch {}: {}", WRK_BIN, e)))?;

        let status = child.wait().await?;
        Ok(status.code().unwrap_or(1))
    }
}
