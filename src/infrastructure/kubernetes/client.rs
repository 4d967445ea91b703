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

use crate::infrastructure::constants::{FIELD_MANAGER, KUBECTL_BIN};
use crate::infrastructure::kubernetes::resources::PatchOperation;
use crate::shared::error::KubeError;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Service};
use kube::api::{AttachParams, ListParams, Patch, PatchParams, PostParams};
use kube::{Api, Client};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

/// Captured result of a command executed inside a pod
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub success: bool,
    pub stderr: String,
    pub message: Option<String>,
}

#[async_trait::async_trait]
pub trait NginxKubeClient: Send + Sync {
    fn namespace(&self) -> &str;

    async fn get_service(&self, name: &str) -> Result<Service, KubeError>;

    async fn get_deployment(&self, name: &str) -> Result<Deployment, KubeError>;

    async fn list_deployments(&self) -> Result<Vec<Deployment>, KubeError>;

    async fn patch_deployment(
        &self,
        name: &str,
        operations: &[PatchOperation],
    ) -> Result<(), KubeError>;

    async fn apply_configmap(&self, configmap: &ConfigMap) -> Result<(), KubeError>;

    async fn list_pods(&self, label_selector: &str) -> Result<Vec<Pod>, KubeError>;

    async fn exec_in_pod(&self, pod: &str, command: &[String]) -> Result<ExecOutput, KubeError>;

    /// Hand the terminal to an interactive shell in the pod and return the
    /// session's exit code.
    async fn open_shell(&self, pod: &str, shell: &str) -> Result<i32, KubeError>;
}

pub struct NginxKubeClientImpl {
    client: Client,
    namespace: String,
    kubeconfig_path: Option<String>,
    context: Option<String>,
}

impl NginxKubeClientImpl {
    pub async fn new(namespace: String) -> Result<Self, KubeError> {
        let client = Client::try_default().await.map_err(|e| {
            KubeError::KubeError(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self {
            client,
            namespace,
            kubeconfig_path: None,
            context: None,
        })
    }

    pub async fn new_with_config(
        namespace: String,
        kubeconfig_path: Option<String>,
        context: Option<String>,
    ) -> Result<Self, KubeError> {
        use kube::config::{KubeConfigOptions, Kubeconfig};

        if kubeconfig_path.is_none() && context.is_none() {
            return Self::new(namespace).await;
        }

        let kubeconfig = if let Some(path) = kubeconfig_path.as_ref() {
            Kubeconfig::read_from(path)
                .map_err(|e| KubeError::KubeError(format!("Failed to load kubeconfig: {}", e)))?
        } else {
            Kubeconfig::read()
                .map_err(|e| KubeError::KubeError(format!("Failed to load kubeconfig: {}", e)))?
        };

        let config_options = KubeConfigOptions {
            context: context.clone(),
            cluster: None,
            user: None,
        };

        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &config_options)
            .await
            .map_err(|e| {
                KubeError::KubeError(format!("Failed to create Kubernetes config: {}", e))
            })?;

        let client = Client::try_from(config).map_err(|e| {
            KubeError::KubeError(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self {
            client,
            namespace,
            kubeconfig_path,
            context,
        })
    }

    /// `kubectl` arguments selecting the same cluster and namespace as the API client
    fn kubectl_scope_args(&self) -> Vec<String> {
        let mut args = vec!["--namespace".to_string(), self.namespace.clone()];
        if let Some(path) = &self.kubeconfig_path {
            args.push("--kubeconfig".to_string());
            args.push(path.clone());
        }
        if let Some(context) = &self.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }
        args
    }

    fn map_get_error(&self, err: kube::Error, resource_type: &str, name: &str) -> KubeError {
        if let kube::Error::Api(ae) = err {
            if ae.code == 404 {
                KubeError::not_found(resource_type, name, &self.namespace)
            } else {
                KubeError::KubeError(ae.message)
            }
        } else {
            KubeError::KubeError(err.to_string())
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(pod: &str, reader: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        if let Err(e) = reader.read_to_end(&mut buf).await {
            warn!("Reading exec output from pod {} stopped early: {}", pod, e);
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[async_trait::async_trait]
impl NginxKubeClient for NginxKubeClientImpl {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get_service(&self, name: &str) -> Result<Service, KubeError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), &self.namespace);
        api.get(name)
            .await
            .map_err(|e| self.map_get_error(e, "Service", name))
    }

    async fn get_deployment(&self, name: &str) -> Result<Deployment, KubeError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), &self.namespace);
        api.get(name)
            .await
            .map_err(|e| self.map_get_error(e, "Deployment", name))
    }

    async fn list_deployments(&self) -> Result<Vec<Deployment>, KubeError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), &self.namespace);
        let deployments = api.list(&ListParams::default()).await?;
        Ok(deployments.items)
    }

    async fn patch_deployment(
        &self,
        name: &str,
        operations: &[PatchOperation],
    ) -> Result<(), KubeError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), &self.namespace);
        let patch: json_patch::Patch = serde_json::from_value(serde_json::to_value(operations)?)?;

        debug!("Patching Deployment {} with {} operations", name, operations.len());
        api.patch(name, &PatchParams::default(), &Patch::Json::<()>(patch))
            .await
            .map_err(|e| match e {
                kube::Error::Api(ae) => KubeError::patch_conflict(name, ae.message),
                other => KubeError::KubeError(other.to_string()),
            })?;
        Ok(())
    }

    async fn apply_configmap(&self, configmap: &ConfigMap) -> Result<(), KubeError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &self.namespace);
        let name = configmap
            .metadata
            .name
            .as_ref()
            .ok_or_else(|| KubeError::ConfigError("ConfigMap name is required".to_string()))?;

        match api.get(name).await {
            Ok(_) => {
                let patch_params = PatchParams::apply(FIELD_MANAGER).force();
                let patch = serde_json::to_value(configmap).map_err(|e| {
                    KubeError::KubeError(format!("Failed to serialize ConfigMap: {}", e))
                })?;
                api.patch(name, &patch_params, &Patch::Apply(patch)).await?;
                debug!("Updated ConfigMap {}", name);
            }
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                api.create(&PostParams::default(), configmap).await?;
                debug!("Created ConfigMap {}", name);
            }
            Err(e) => return Err(KubeError::KubeError(e.to_string())),
        }
        Ok(())
    }

    async fn list_pods(&self, label_selector: &str) -> Result<Vec<Pod>, KubeError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &self.namespace);
        let lp = ListParams::default().labels(label_selector);

        let pods = api.list(&lp).await?;
        Ok(pods.items)
    }

    async fn exec_in_pod(&self, pod: &str, command: &[String]) -> Result<ExecOutput, KubeError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &self.namespace);
        // Only stderr feeds the outcome detail
        let params = AttachParams::default().stdout(false).stderr(true);

        debug!("Executing in pod {}: {:?}", pod, command);
        let mut attached = api.exec(pod, command.iter().map(String::as_str), &params).await?;

        let status = attached.take_status();
        let stderr = drain(pod, attached.stderr()).await;

        let status = match status {
            Some(status) => status.await,
            None => None,
        };
        attached
            .join()
            .await
            .map_err(|e| KubeError::Process(format!("Exec in pod {} failed: {}", pod, e)))?;

        let success = status
            .as_ref()
            .and_then(|s| s.status.as_deref())
            .map(|s| s == "Success")
            .unwrap_or(false);
        let message = status.and_then(|s| s.message);

        Ok(ExecOutput {
            success,
            stderr,
            message,
        })
    }

    async fn open_shell(&self, pod: &str, shell: &str) -> Result<i32, KubeError> {
        let mut command = tokio::process::Command::new(KUBECTL_BIN);
        command
            .arg("exec")
            .arg("-it")
            .args(self.kubectl_scope_args())
            .arg(pod)
            .arg("--")
            .arg(shell);

        debug!("Opening shell in pod {} with {}", pod, shell);
        let status = command.status().await.map_err(|e| {
            KubeError::Process(format!("Failed to launch {}: {}", KUBECTL_BIN, e))
        })?;

        Ok(status.code().unwrap_or(1))
    }
}
