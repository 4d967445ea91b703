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

//! Tool configuration loaded from TOML

use crate::infrastructure::constants::*;
use crate::shared::error::KubeError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

// ============================================================================
// Main tool configuration
// ============================================================================

/// Settings shared by `nginx-multiarch` and `nginx-bench`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConf {
    pub namespace: String,
    pub kubeconfig: Option<String>,
    pub context: Option<String>,
    pub service_template: String,
    pub arch_label: String,
    pub pod_selector: String,
    pub deployment_match: String,
    pub configmap_name: String,
    pub config_mount_path: String,
    pub login_shell: String,
    pub rollout_packages: Vec<String>,
    pub monitor_packages: Vec<String>,
    pub install_concurrency: usize,
    pub rollout_timeout_secs: u64,
    pub rollout_poll_interval_secs: u64,
    pub bench: BenchConf,
}

impl Default for ToolConf {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            kubeconfig: None,
            context: None,
            service_template: DEFAULT_SERVICE_TEMPLATE.to_string(),
            arch_label: DEFAULT_ARCH_LABEL.to_string(),
            pod_selector: DEFAULT_POD_SELECTOR.to_string(),
            deployment_match: DEFAULT_DEPLOYMENT_MATCH.to_string(),
            configmap_name: DEFAULT_CONFIGMAP_NAME.to_string(),
            config_mount_path: DEFAULT_CONFIG_MOUNT_PATH.to_string(),
            login_shell: DEFAULT_LOGIN_SHELL.to_string(),
            rollout_packages: DEFAULT_ROLLOUT_PACKAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            monitor_packages: DEFAULT_MONITOR_PACKAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            install_concurrency: DEFAULT_INSTALL_CONCURRENCY,
            rollout_timeout_secs: DEFAULT_ROLLOUT_TIMEOUT_SECS,
            rollout_poll_interval_secs: DEFAULT_ROLLOUT_POLL_INTERVAL_SECS,
            bench: BenchConf::default(),
        }
    }
}

impl ToolConf {
    /// Load configuration from TOML file
    pub fn from<T: AsRef<Path>>(path: T) -> Result<Self, KubeError> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            KubeError::config_error(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let conf: Self = toml::from_str(&content)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Resolve the config source: explicit path, then the environment
    /// variable, then built-in defaults.
    pub fn load(path: Option<&str>) -> Result<Self, KubeError> {
        if let Some(path) = path {
            return Self::from(path);
        }

        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), KubeError> {
        if self.namespace.trim().is_empty() {
            return Err(KubeError::config_error("namespace must not be empty"));
        }

        if !self.service_template.contains(SERVICE_TEMPLATE_PLACEHOLDER) {
            return Err(KubeError::config_error(format!(
                "service_template '{}' must contain {}",
                self.service_template, SERVICE_TEMPLATE_PLACEHOLDER
            )));
        }

        if self.install_concurrency == 0 {
            return Err(KubeError::config_error("install_concurrency must be > 0"));
        }

        if self.rollout_poll_interval_secs == 0 {
            return Err(KubeError::config_error(
                "rollout_poll_interval_secs must be > 0",
            ));
        }

        if self.rollout_poll_interval_secs > self.rollout_timeout_secs {
            return Err(KubeError::config_error(format!(
                "rollout_poll_interval_secs ({}) exceeds rollout_timeout_secs ({})",
                self.rollout_poll_interval_secs, self.rollout_timeout_secs
            )));
        }

        for package in self.rollout_packages.iter().chain(&self.monitor_packages) {
            validate_package_name(package)?;
        }

        self.bench.validate()
    }

    pub fn rollout_timeout(&self) -> Duration {
        Duration::from_secs(self.rollout_timeout_secs)
    }

    pub fn rollout_poll_interval(&self) -> Duration {
        Duration::from_secs(self.rollout_poll_interval_secs)
    }
}

// ============================================================================
// Benchmark defaults
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BenchConf {
    pub threads: u32,
    pub duration_secs: u64,
    pub connections: u32,
}

impl Default for BenchConf {
    fn default() -> Self {
        Self {
            threads: DEFAULT_BENCH_THREADS,
            duration_secs: DEFAULT_BENCH_DURATION_SECS,
            connections: DEFAULT_BENCH_CONNECTIONS,
        }
    }
}

impl BenchConf {
    pub fn validate(&self) -> Result<(), KubeError> {
        if self.threads == 0 {
            return Err(KubeError::config_error("bench.threads must be > 0"));
        }
        if self.duration_secs == 0 {
            return Err(KubeError::config_error("bench.duration_secs must be > 0"));
        }
        if self.connections == 0 {
            return Err(KubeError::config_error("bench.connections must be > 0"));
        }
        if self.connections < self.threads {
            return Err(KubeError::config_error(
                "bench.connections must be >= bench.threads",
            ));
        }
        Ok(())
    }
}

/// Debian package names end up inside `sh -c`, so only the Debian policy
/// character set is accepted.
pub fn validate_package_name(name: &str) -> Result<(), KubeError> {
    static PACKAGE_RE: OnceLock<Regex> = OnceLock::new();
    let re = PACKAGE_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9+.\-]*$").expect("package name pattern is valid")
    });

    if re.is_match(name) {
        Ok(())
    } else {
        Err(KubeError::ValidationError(format!(
            "Invalid package name: '{}'",
            name
        )))
    }
}
