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

use crate::domain::cluster::install::{InstallRequest, PackageInstaller, PodInstallOutcome};
use crate::domain::config::ToolConf;
use crate::infrastructure::kubernetes::resources::{ConfigMapBuilder, ConfigMountPatch};
use crate::infrastructure::kubernetes::NginxKubeClient;
use crate::shared::error::KubeError;
use backon::{BackoffBuilder, ConstantBuilder};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPatchOutcome {
    pub deployment: String,
    pub success: bool,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct RolloutReport {
    pub configmap: String,
    pub patches: Vec<DeploymentPatchOutcome>,
    /// Set when the readiness wait timed out or was interrupted
    pub wait_error: Option<String>,
    pub installs: Vec<PodInstallOutcome>,
}

impl RolloutReport {
    pub fn patch_failures(&self) -> usize {
        self.patches.iter().filter(|p| !p.success).count()
    }

    /// Install failures are best-effort and do not count here
    pub fn is_success(&self) -> bool {
        self.patch_failures() == 0 && self.wait_error.is_none()
    }
}

/// Pushes nginx.conf as a ConfigMap and mounts it into every matching
/// Deployment, then installs the rollout packages on the nginx pods.
pub struct ConfigRollout<'a> {
    client: &'a dyn NginxKubeClient,
    conf: &'a ToolConf,
}

impl<'a> ConfigRollout<'a> {
    pub fn new(client: &'a dyn NginxKubeClient, conf: &'a ToolConf) -> Self {
        Self { client, conf }
    }

    fn configmap_builder(&self) -> ConfigMapBuilder {
        ConfigMapBuilder::new(
            self.conf.configmap_name.clone(),
            self.client.namespace().to_string(),
        )
    }

    pub fn render(&self) -> ConfigMap {
        self.configmap_builder().build()
    }

    pub fn render_yaml(&self) -> Result<String, KubeError> {
        self.configmap_builder().render_yaml()
    }

    pub async fn run<C>(&self, cancel: C) -> Result<RolloutReport, KubeError>
    where
        C: Future<Output = ()> + Send,
    {
        let request = InstallRequest::new(&self.conf.rollout_packages)?;

        let configmap = self.render();
        self.client.apply_configmap(&configmap).await?;
        info!("Applied ConfigMap {}", self.conf.configmap_name);

        let patches = self.patch_deployments().await?;
        let patched: Vec<String> = patches
            .iter()
            .filter(|p| p.success)
            .map(|p| p.deployment.clone())
            .collect();

        let mut wait_error = None;
        if !patched.is_empty() {
            match self.wait_until_rolled_out(&patched, cancel).await {
                Ok(()) => {}
                Err(e @ KubeError::Cancelled(_)) => {
                    warn!("{}", e);
                    return Ok(RolloutReport {
                        configmap: self.conf.configmap_name.clone(),
                        patches,
                        wait_error: Some(e.to_string()),
                        installs: Vec::new(),
                    });
                }
                Err(e @ KubeError::Timeout(_)) => {
                    // Installs still run on whichever pods are up
                    warn!("{}", e);
                    wait_error = Some(e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        let installs = PackageInstaller::new(self.client, self.conf.install_concurrency)
            .install(&self.conf.pod_selector, &request)
            .await?;

        Ok(RolloutReport {
            configmap: self.conf.configmap_name.clone(),
            patches,
            wait_error,
            installs,
        })
    }

    /// Patch every Deployment whose name contains `deployment_match`. A
    /// failure on one Deployment does not stop the others.
    pub async fn patch_deployments(&self) -> Result<Vec<DeploymentPatchOutcome>, KubeError> {
        let patcher = ConfigMountPatch::new(
            self.conf.configmap_name.clone(),
            self.conf.config_mount_path.clone(),
        );

        let deployments = self.client.list_deployments().await?;
        let mut outcomes = Vec::new();

        for deployment in deployments {
            let Some(name) = deployment.metadata.name.clone() else {
                continue;
            };
            if !name.contains(&self.conf.deployment_match) {
                continue;
            }

            let result = match patcher.operations_for(&deployment) {
                Ok(operations) => self.client.patch_deployment(&name, &operations).await,
                Err(e) => Err(e),
            };

            let outcome = match result {
                Ok(()) => DeploymentPatchOutcome {
                    deployment: name,
                    success: true,
                    detail: "patched".to_string(),
                },
                Err(e) => {
                    warn!("Failed to patch Deployment {}: {}", name, e);
                    DeploymentPatchOutcome {
                        deployment: name,
                        success: false,
                        detail: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        if outcomes.is_empty() {
            warn!(
                "No Deployment in namespace {} matches '{}'",
                self.client.namespace(),
                self.conf.deployment_match
            );
        }

        Ok(outcomes)
    }

    /// Poll the Deployments until their rollout completes, bounded by the
    /// configured timeout. Resolving `cancel` aborts the wait. A timeout
    /// names only the Deployments that had not rolled out.
    pub async fn wait_until_rolled_out<C>(
        &self,
        names: &[String],
        cancel: C,
    ) -> Result<(), KubeError>
    where
        C: Future<Output = ()> + Send,
    {
        let timeout = self.conf.rollout_timeout();
        let interval = self.conf.rollout_poll_interval();
        let mut pending: Vec<String> = names.to_vec();

        let poll = self.poll_rollout(&mut pending, timeout, interval);
        let outcome = tokio::select! {
            result = tokio::time::timeout(timeout, poll) => Some(result),
            _ = cancel => None,
        };

        match outcome {
            Some(Ok(result)) => result,
            Some(Err(_elapsed)) => Err(rollout_timeout(&pending, timeout)),
            None => Err(KubeError::Cancelled(
                "Interrupted while waiting for Deployments to roll out".to_string(),
            )),
        }
    }

    /// Removes each Deployment from `pending` as soon as it is seen rolled out
    async fn poll_rollout(
        &self,
        pending: &mut Vec<String>,
        timeout: Duration,
        interval: Duration,
    ) -> Result<(), KubeError> {
        let attempts = (timeout.as_millis() / interval.as_millis().max(1)).max(1) as usize;
        let mut delays = ConstantBuilder::default()
            .with_delay(interval)
            .with_max_times(attempts)
            .build();

        loop {
            for name in pending.clone() {
                let deployment = self.client.get_deployment(&name).await?;
                if rollout_complete(&deployment) {
                    debug!("Deployment {} rolled out", name);
                    pending.retain(|n| n != &name);
                }
            }

            if pending.is_empty() {
                return Ok(());
            }

            match delays.next() {
                Some(delay) => sleep(delay).await,
                None => return Err(rollout_timeout(&pending[..], timeout)),
            }
        }
    }
}

fn rollout_timeout(names: &[String], timeout: Duration) -> KubeError {
    KubeError::Timeout(format!(
        "Deployments not rolled out after {}s: {}",
        timeout.as_secs(),
        names.join(", ")
    ))
}

/// Same completion rule as `kubectl rollout status`
pub fn rollout_complete(deployment: &Deployment) -> bool {
    let Some(status) = deployment.status.as_ref() else {
        return false;
    };

    let generation = deployment.metadata.generation.unwrap_or(0);
    if status.observed_generation.unwrap_or(0) < generation {
        return false;
    }

    let desired = deployment
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1);
    let updated = status.updated_replicas.unwrap_or(0);
    let replicas = status.replicas.unwrap_or(0);
    let available = status.available_replicas.unwrap_or(0);

    updated >= desired && replicas <= updated && available >= updated
}
