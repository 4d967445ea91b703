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

//! In-memory stand-ins for the cluster, the HTTP probe and wrk

#![allow(dead_code)]

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Service, Volume, VolumeMount};
use nginx_multiarch::cli::{BackendFactory, Backends};
use nginx_multiarch::infrastructure::http::HttpProbe;
use nginx_multiarch::infrastructure::kubernetes::resources::PatchOperation;
use nginx_multiarch::infrastructure::kubernetes::{ExecOutput, NginxKubeClient};
use nginx_multiarch::infrastructure::process::{LoadGenerator, LoadRequest};
use nginx_multiarch::{KubeError, ToolConf};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

// ============================================================================
// Fixtures
// ============================================================================

pub fn service(name: &str, ip: &str) -> Service {
    serde_json::from_value(json!({
        "metadata": { "name": name },
        "status": { "loadBalancer": { "ingress": [ { "ip": ip } ] } }
    }))
    .unwrap()
}

pub fn pending_service(name: &str) -> Service {
    serde_json::from_value(json!({
        "metadata": { "name": name },
        "status": { "loadBalancer": {} }
    }))
    .unwrap()
}

pub fn deployment(name: &str) -> Deployment {
    serde_json::from_value(json!({
        "metadata": { "name": name, "generation": 1 },
        "spec": {
            "replicas": 1,
            "selector": { "matchLabels": { "app": "nginx" } },
            "template": {
                "metadata": { "labels": { "app": "nginx" } },
                "spec": { "containers": [ { "name": "nginx", "image": "nginx:stable" } ] }
            }
        },
        "status": {
            "observedGeneration": 1,
            "replicas": 1,
            "updatedReplicas": 1,
            "availableReplicas": 1
        }
    }))
    .unwrap()
}

/// Deployment whose new replica never becomes available
pub fn stalled_deployment(name: &str) -> Deployment {
    let mut deployment = deployment(name);
    if let Some(status) = deployment.status.as_mut() {
        status.available_replicas = Some(0);
    }
    deployment
}

pub fn pod(name: &str, arch: &str, phase: &str) -> Pod {
    serde_json::from_value(json!({
        "metadata": { "name": name, "labels": { "app": "nginx", "arch": arch } },
        "status": { "phase": phase }
    }))
    .unwrap()
}

/// Services for every architecture plus one intel and one arm Deployment/pod
pub fn standard_cluster() -> ClusterState {
    let mut state = ClusterState::default();
    for (arch, ip) in [
        ("intel", "10.0.0.1"),
        ("arm", "10.0.0.2"),
        ("amd", "10.0.0.3"),
        ("multiarch", "10.0.0.4"),
    ] {
        let name = format!("nginx-{}-svc", arch);
        state.services.insert(name.clone(), service(&name, ip));
    }
    for arch in ["intel", "arm"] {
        let name = format!("nginx-{}", arch);
        state.deployments.insert(name.clone(), deployment(&name));
        state.pods.push(pod(&format!("nginx-{}-7d9c", arch), arch, "Running"));
    }
    state
}

/// Config file with a short rollout window
pub fn fast_config() -> NamedTempFile {
    config_with(&[])
}

/// `fast_config` plus extra TOML lines
pub fn config_with(extra: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "namespace = \"web\"").unwrap();
    writeln!(file, "rollout_timeout_secs = 1").unwrap();
    writeln!(file, "rollout_poll_interval_secs = 1").unwrap();
    for line in extra {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

/// Defaults with the shortest rollout window validation allows
pub fn fast_tool_conf() -> ToolConf {
    ToolConf {
        namespace: "web".to_string(),
        rollout_timeout_secs: 1,
        rollout_poll_interval_secs: 1,
        ..Default::default()
    }
}

// ============================================================================
// Cluster
// ============================================================================

#[derive(Debug, Default)]
pub struct ClusterState {
    pub services: HashMap<String, Service>,
    pub deployments: BTreeMap<String, Deployment>,
    pub pods: Vec<Pod>,
    pub configmaps: HashMap<String, ConfigMap>,
    pub applied_configmaps: Vec<String>,
    pub patch_calls: Vec<String>,
    pub exec_calls: Vec<(String, Vec<String>)>,
    pub shell_calls: Vec<(String, String)>,
    pub failing_exec: Vec<String>,
    pub shell_exit_code: i32,
}

#[derive(Clone, Default)]
pub struct MockKubeClient {
    pub namespace: String,
    pub state: Arc<Mutex<ClusterState>>,
}

impl MockKubeClient {
    pub fn new(state: ClusterState) -> Self {
        Self {
            namespace: "web".to_string(),
            state: Arc::new(Mutex::new(state)),
        }
    }
}

fn matches_selector(pod: &Pod, selector: &str) -> bool {
    let labels = pod.metadata.labels.clone().unwrap_or_default();
    selector.split(',').all(|term| match term.split_once('=') {
        Some((key, value)) => labels.get(key.trim()).map(String::as_str) == Some(value.trim()),
        None => false,
    })
}

#[async_trait]
impl NginxKubeClient for MockKubeClient {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get_service(&self, name: &str) -> Result<Service, KubeError> {
        let state = self.state.lock().unwrap();
        state
            .services
            .get(name)
            .cloned()
            .ok_or_else(|| KubeError::not_found("Service", name, &self.namespace))
    }

    async fn get_deployment(&self, name: &str) -> Result<Deployment, KubeError> {
        let state = self.state.lock().unwrap();
        state
            .deployments
            .get(name)
            .cloned()
            .ok_or_else(|| KubeError::not_found("Deployment", name, &self.namespace))
    }

    async fn list_deployments(&self) -> Result<Vec<Deployment>, KubeError> {
        Ok(self.state.lock().unwrap().deployments.values().cloned().collect())
    }

    async fn patch_deployment(
        &self,
        name: &str,
        operations: &[PatchOperation],
    ) -> Result<(), KubeError> {
        let mut state = self.state.lock().unwrap();
        state.patch_calls.push(name.to_string());

        let deployment = state
            .deployments
            .get_mut(name)
            .ok_or_else(|| KubeError::not_found("Deployment", name, &self.namespace))?;
        let pod_spec = deployment
            .spec
            .as_mut()
            .and_then(|spec| spec.template.spec.as_mut())
            .ok_or_else(|| KubeError::InvalidResource(name.to_string()))?;

        for operation in operations {
            let PatchOperation::Add { path, value } = operation;
            if path.ends_with("/volumes") {
                pod_spec.volumes = Some(serde_json::from_value::<Vec<Volume>>(value.clone())?);
            } else if path.ends_with("/volumeMounts") {
                pod_spec.containers[0].volume_mounts =
                    Some(serde_json::from_value::<Vec<VolumeMount>>(value.clone())?);
            }
        }
        Ok(())
    }

    async fn apply_configmap(&self, configmap: &ConfigMap) -> Result<(), KubeError> {
        let name = configmap.metadata.name.clone().unwrap_or_default();
        let mut state = self.state.lock().unwrap();
        state.applied_configmaps.push(name.clone());
        state.configmaps.insert(name, configmap.clone());
        Ok(())
    }

    async fn list_pods(&self, label_selector: &str) -> Result<Vec<Pod>, KubeError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .pods
            .iter()
            .filter(|pod| matches_selector(pod, label_selector))
            .cloned()
            .collect())
    }

    async fn exec_in_pod(&self, pod: &str, command: &[String]) -> Result<ExecOutput, KubeError> {
        let mut state = self.state.lock().unwrap();
        state.exec_calls.push((pod.to_string(), command.to_vec()));
        if state.failing_exec.iter().any(|p| p == pod) {
            return Ok(ExecOutput {
                success: false,
                stderr: "E: Unable to locate package\n".to_string(),
                message: Some("command terminated with non-zero exit code".to_string()),
            });
        }
        Ok(ExecOutput {
            success: true,
            ..Default::default()
        })
    }

    async fn open_shell(&self, pod: &str, shell: &str) -> Result<i32, KubeError> {
        let mut state = self.state.lock().unwrap();
        state.shell_calls.push((pod.to_string(), shell.to_string()));
        Ok(state.shell_exit_code)
    }
}

// ============================================================================
// HTTP probe
// ============================================================================

#[derive(Clone, Default)]
pub struct MockProbe {
    pub responses: HashMap<String, String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl HttpProbe for MockProbe {
    async fn first_line(&self, endpoint: &str) -> Result<String, KubeError> {
        self.calls.lock().unwrap().push(endpoint.to_string());
        self.responses
            .get(endpoint)
            .cloned()
            .ok_or_else(|| KubeError::Http(format!("connection refused: {}", endpoint)))
    }
}

// ============================================================================
// Load generator
// ============================================================================

#[derive(Debug, Clone)]
pub struct LoadRun {
    pub endpoint: String,
    pub threads: u32,
    pub connections: u32,
    pub duration: Duration,
    pub sink: Option<PathBuf>,
    pub started: Instant,
    pub finished: Instant,
}

/// Sleeps for a per-endpoint delay and writes a fake wrk summary
#[derive(Clone, Default)]
pub struct MockLoadGenerator {
    pub delays: HashMap<String, Duration>,
    pub exit_codes: HashMap<String, i32>,
    pub runs: Arc<Mutex<Vec<LoadRun>>>,
    /// Sinks of captured runs, recorded as soon as a run starts
    pub sinks: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockLoadGenerator {
    async fn simulate(&self, request: &LoadRequest, sink: Option<&Path>) -> Result<i32, KubeError> {
        let started = Instant::now();
        if let Some(sink) = sink {
            self.sinks.lock().unwrap().push(sink.to_path_buf());
        }
        let delay = self
            .delays
            .get(&request.endpoint)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        tokio::time::sleep(delay).await;

        if let Some(sink) = sink {
            let summary = format!(
                "Running {}s test @ {}\n  {} threads and {} connections\nRequests/sec: 1234.56\n",
                request.duration.as_secs(),
                request.url(),
                request.threads,
                request.connections
            );
            std::fs::write(sink, summary)?;
        }

        self.runs.lock().unwrap().push(LoadRun {
            endpoint: request.endpoint.clone(),
            threads: request.threads,
            connections: request.connections,
            duration: request.duration,
            sink: sink.map(Path::to_path_buf),
            started,
            finished: Instant::now(),
        });

        Ok(self.exit_codes.get(&request.endpoint).copied().unwrap_or(0))
    }
}

#[async_trait]
impl LoadGenerator for MockLoadGenerator {
    async fn run_streaming(&self, request: &LoadRequest) -> Result<i32, KubeError> {
        self.simulate(request, None).await
    }

    async fn run_captured(&self, request: &LoadRequest, sink: &Path) -> Result<i32, KubeError> {
        self.simulate(request, Some(sink)).await
    }
}

// ============================================================================
// Backend factory
// ============================================================================

/// Hands out clones of the same mocks and counts how often it was asked
#[derive(Clone, Default)]
pub struct MockFactory {
    pub client: MockKubeClient,
    pub probe: MockProbe,
    pub loadgen: MockLoadGenerator,
    pub connects: Arc<AtomicUsize>,
}

impl MockFactory {
    pub fn new(state: ClusterState) -> Self {
        Self {
            client: MockKubeClient::new(state),
            ..Default::default()
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, ClusterState> {
        self.client.state.lock().unwrap()
    }
}

#[async_trait]
impl BackendFactory for MockFactory {
    async fn connect(&self, _conf: &ToolConf) -> Result<Backends, KubeError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Backends {
            client: Box::new(self.client.clone()),
            probe: Box::new(self.probe.clone()),
            loadgen: Box::new(self.loadgen.clone()),
        })
    }
}
