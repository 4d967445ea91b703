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

use crate::domain::config::validate_package_name;
use crate::infrastructure::kubernetes::NginxKubeClient;
use crate::shared::error::KubeError;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

/// Outcome of installing packages in a single pod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodInstallOutcome {
    pub pod: String,
    pub success: bool,
    pub detail: String,
}

/// `apt-get update` followed by `apt-get install -y <packages>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    packages: Vec<String>,
}

impl InstallRequest {
    pub fn new(packages: &[String]) -> Result<Self, KubeError> {
        if packages.is_empty() {
            return Err(KubeError::ValidationError(
                "At least one package is required".to_string(),
            ));
        }
        for package in packages {
            validate_package_name(package)?;
        }
        Ok(Self {
            packages: packages.to_vec(),
        })
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    pub fn command(&self) -> Vec<String> {
        vec![
            "sh".to_string(),
            "-c".to_string(),
            format!(
                "apt-get update && DEBIAN_FRONTEND=noninteractive apt-get install -y {}",
                self.packages.join(" ")
            ),
        ]
    }
}

/// Runs an install on every pod behind a label selector. Each pod gets its
/// own outcome; nothing here decides whether partial failure is acceptable.
pub struct PackageInstaller<'a> {
    client: &'a dyn NginxKubeClient,
    concurrency: usize,
}

impl<'a> PackageInstaller<'a> {
    pub fn new(client: &'a dyn NginxKubeClient, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn install(
        &self,
        label_selector: &str,
        request: &InstallRequest,
    ) -> Result<Vec<PodInstallOutcome>, KubeError> {
        let pods = self.client.list_pods(label_selector).await?;
        let names: Vec<String> = pods
            .into_iter()
            .filter_map(|pod| pod.metadata.name)
            .collect();

        debug!(
            "Installing {:?} on {} pods matching {}",
            request.packages(),
            names.len(),
            label_selector
        );

        let command = request.command();
        let outcomes = stream::iter(names)
            .map(|pod| {
                let command = &command;
                async move { self.install_one(pod, command).await }
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(outcomes)
    }

    async fn install_one(&self, pod: String, command: &[String]) -> PodInstallOutcome {
        match self.client.exec_in_pod(&pod, command).await {
            Ok(output) if output.success => PodInstallOutcome {
                pod,
                success: true,
                detail: "installed".to_string(),
            },
            Ok(output) => {
                let detail = output
                    .stderr
                    .lines()
                    .rev()
                    .find(|line| !line.trim().is_empty())
                    .map(|line| line.trim().to_string())
                    .or(output.message)
                    .unwrap_or_else(|| "command failed".to_string());
                warn!("Package install failed in pod {}: {}", pod, detail);
                PodInstallOutcome {
                    pod,
                    success: false,
                    detail,
                }
            }
            Err(e) => {
                warn!("Package install failed in pod {}: {}", pod, e);
                PodInstallOutcome {
                    pod,
                    success: false,
                    detail: e.to_string(),
                }
            }
        }
    }
}
