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
use crate::infrastructure::constants::POD_PHASE_RUNNING;
use crate::infrastructure::kubernetes::NginxKubeClient;
use crate::shared::error::KubeError;
use k8s_openapi::api::core::v1::Pod;
use tracing::info;

/// Interactive login into one pod of an architecture
pub struct ShellSession<'a> {
    client: &'a dyn NginxKubeClient,
    arch_label: &'a str,
    shell: &'a str,
}

impl<'a> ShellSession<'a> {
    pub fn new(client: &'a dyn NginxKubeClient, arch_label: &'a str, shell: &'a str) -> Self {
        Self {
            client,
            arch_label,
            shell,
        }
    }

    /// Pick the target pod: the first Running one, else the first listed
    pub async fn select_pod(&self, arch: Architecture) -> Result<String, KubeError> {
        let selector = arch.label_selector(self.arch_label);
        let pods = self.client.list_pods(&selector).await?;

        pick_pod(&pods).ok_or_else(|| {
            KubeError::not_found(
                "Pod",
                format!("label {}", selector),
                self.client.namespace(),
            )
        })
    }

    /// Blocks for the whole session and returns its exit code
    pub async fn login(&self, arch: Architecture) -> Result<i32, KubeError> {
        let pod = self.select_pod(arch).await?;
        info!("Connecting to pod {}", pod);
        self.client.open_shell(&pod, self.shell).await
    }
}

fn pick_pod(pods: &[Pod]) -> Option<String> {
    let is_running = |pod: &&Pod| {
        pod.status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .is_some_and(|phase| phase == POD_PHASE_RUNNING)
    };

    pods.iter()
        .find(is_running)
        .or_else(|| pods.first())
        .and_then(|pod| pod.metadata.name.clone())
}
