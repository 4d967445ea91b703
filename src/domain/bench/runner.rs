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

use crate::domain::arch::Architecture;
use crate::domain::cluster::ServiceResolver;
use crate::domain::config::BenchConf;
use crate::infrastructure::kubernetes::NginxKubeClient;
use crate::infrastructure::process::{LoadGenerator, LoadRequest};
use crate::shared::error::KubeError;
use chrono::{DateTime, Local};
use std::future::Future;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Parameters shared by every run of one benchmark invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchParams {
    pub threads: u32,
    pub connections: u32,
    pub duration: Duration,
}

impl BenchParams {
    /// Positional overrides fall back to the configured defaults. wrk
    /// refuses fewer connections than threads, so that is rejected here.
    pub fn from_conf(
        conf: &BenchConf,
        duration_secs: Option<u64>,
        connections: Option<u32>,
    ) -> Result<Self, KubeError> {
        let params = Self {
            threads: conf.threads,
            connections: connections.unwrap_or(conf.connections),
            duration: Duration::from_secs(duration_secs.unwrap_or(conf.duration_secs)),
        };

        if params.connections < params.threads {
            return Err(KubeError::ValidationError(format!(
                "{} connections is fewer than the {} configured threads",
                params.connections, params.threads
            )));
        }
        Ok(params)
    }

    pub fn request(&self, endpoint: String) -> LoadRequest {
        LoadRequest {
            endpoint,
            threads: self.threads,
            connections: self.connections,
            duration: self.duration,
        }
    }
}

/// Captured output of one run in dual mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkOutput {
    pub arch: Architecture,
    pub endpoint: String,
    pub output: String,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
}

impl BenchmarkOutput {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.exit_code == Some(0)
    }
}

#[derive(Debug, Clone)]
pub struct DualReport {
    pub started_at: DateTime<Local>,
    pub params: BenchParams,
    /// Always in the order the pair was given, never completion order
    pub results: Vec<BenchmarkOutput>,
}

impl DualReport {
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(BenchmarkOutput::succeeded)
    }
}

pub struct BenchmarkRunner<'a> {
    client: &'a dyn NginxKubeClient,
    loadgen: &'a dyn LoadGenerator,
    service_template: &'a str,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new(
        client: &'a dyn NginxKubeClient,
        loadgen: &'a dyn LoadGenerator,
        service_template: &'a str,
    ) -> Self {
        Self {
            client,
            loadgen,
            service_template,
        }
    }

    fn resolver(&self) -> ServiceResolver<'_> {
        ServiceResolver::new(self.client, self.service_template)
    }

    /// Run against one architecture with output streamed to the terminal
    pub async fn run_single(
        &self,
        arch: Architecture,
        params: BenchParams,
    ) -> Result<i32, KubeError> {
        let endpoint = self.resolver().resolve(arch).await?;
        info!(
            "Benchmarking {} at {} ({}s, {} connections)",
            arch,
            endpoint,
            params.duration.as_secs(),
            params.connections
        );
        self.loadgen.run_streaming(&params.request(endpoint)).await
    }

    /// Run against both architectures at once.
    ///
    /// Both endpoints are resolved before anything is launched. Each run
    /// writes into its own temporary file, which is removed when the
    /// `NamedTempFile` drops. Resolving `cancel` drops the in-flight runs
    /// and the files before returning `Cancelled`.
    pub async fn run_dual<C>(
        &self,
        pair: [Architecture; 2],
        params: BenchParams,
        cancel: C,
    ) -> Result<DualReport, KubeError>
    where
        C: Future<Output = ()> + Send,
    {
        let resolver = self.resolver();
        let first_endpoint = resolver.resolve(pair[0]).await?;
        let second_endpoint = resolver.resolve(pair[1]).await?;

        let first_sink = NamedTempFile::new()?;
        let second_sink = NamedTempFile::new()?;

        let first_request = params.request(first_endpoint);
        let second_request = params.request(second_endpoint);

        let started_at = Local::now();
        debug!(
            "Launching concurrent runs for {} and {}",
            pair[0], pair[1]
        );
        let (first_status, second_status) = tokio::select! {
            statuses = async {
                tokio::join!(
                    self.loadgen.run_captured(&first_request, first_sink.path()),
                    self.loadgen.run_captured(&second_request, second_sink.path()),
                )
            } => statuses,
            _ = cancel => {
                warn!("Benchmark interrupted, discarding captured output");
                return Err(KubeError::Cancelled(format!(
                    "Interrupted while benchmarking {} and {}",
                    pair[0], pair[1]
                )));
            }
        };

        let results = vec![
            collect_output(pair[0], first_request, first_status, &first_sink).await,
            collect_output(pair[1], second_request, second_status, &second_sink).await,
        ];

        Ok(DualReport {
            started_at,
            params,
            results,
        })
    }
}

async fn collect_output(
    arch: Architecture,
    request: LoadRequest,
    status: Result<i32, KubeError>,
    sink: &NamedTempFile,
) -> BenchmarkOutput {
    let output = match tokio::fs::read(sink.path()).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("Could not read captured output for {}: {}", arch, e);
            String::new()
        }
    };

    let (exit_code, error) = match status {
        Ok(code) => (Some(code), None),
        Err(e) => {
            warn!("Benchmark run for {} failed: {}", arch, e);
            (None, Some(e.to_string()))
        }
    };

    BenchmarkOutput {
        arch,
        endpoint: request.endpoint,
        output,
        exit_code,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_defaults_and_overrides() {
        let conf = BenchConf::default();
        let defaults = BenchParams::from_conf(&conf, None, None).unwrap();
        assert_eq!(defaults.threads, 1);
        assert_eq!(defaults.connections, 45);
        assert_eq!(defaults.duration, Duration::from_secs(30));

        let custom = BenchParams::from_conf(&conf, Some(10), Some(20)).unwrap();
        assert_eq!(custom.connections, 20);
        assert_eq!(custom.duration, Duration::from_secs(10));
    }

    #[test]
    fn test_params_reject_fewer_connections_than_threads() {
        let conf = BenchConf {
            threads: 4,
            ..Default::default()
        };
        assert!(matches!(
            BenchParams::from_conf(&conf, Some(10), Some(2)),
            Err(KubeError::ValidationError(_))
        ));
        assert!(BenchParams::from_conf(&conf, Some(10), Some(4)).is_ok());
    }

    #[test]
    fn test_output_success() {
        let mut output = BenchmarkOutput {
            arch: Architecture::Arm,
            endpoint: "10.0.0.1".to_string(),
            output: String::new(),
            exit_code: Some(0),
            error: None,
        };
        assert!(output.succeeded());
        output.exit_code = Some(1);
        assert!(!output.succeeded());
    }
}
