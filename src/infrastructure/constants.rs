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

/// Defaults for the cluster layout
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_SERVICE_TEMPLATE: &str = "nginx-{arch}-svc";
pub const SERVICE_TEMPLATE_PLACEHOLDER: &str = "{arch}";
pub const DEFAULT_ARCH_LABEL: &str = "arch";
pub const DEFAULT_POD_SELECTOR: &str = "app=nginx";
pub const DEFAULT_DEPLOYMENT_MATCH: &str = "nginx";
pub const POD_NAME_PREFIX: &str = "nginx-";

/// ConfigMap configuration
pub const DEFAULT_CONFIGMAP_NAME: &str = "nginx-config";
pub const CONFIG_FILE_NAME: &str = "nginx.conf";
pub const DEFAULT_CONFIG_MOUNT_PATH: &str = "/etc/nginx/nginx.conf";
pub const CONFIG_FILE_MODE: i32 = 0o644;
pub const VOLUME_NAME_CONFIG: &str = "nginx-config";

/// Resource labels
pub const LABEL_APP: &str = "app";
pub const LABEL_APP_VALUE: &str = "nginx";
pub const LABEL_MANAGED_BY: &str = "managed-by";
pub const LABEL_MANAGED_BY_VALUE: &str = "nginx-multiarch";

/// Server-side apply field manager
pub const FIELD_MANAGER: &str = "nginx-multiarch";

/// JSON patch paths on a Deployment
pub const PATCH_PATH_VOLUMES: &str = "/spec/template/spec/volumes";
pub const PATCH_PATH_FIRST_CONTAINER_MOUNTS: &str = "/spec/template/spec/containers/0/volumeMounts";

/// Pod phases
pub const POD_PHASE_RUNNING: &str = "Running";

/// Shell used for `login`
pub const DEFAULT_LOGIN_SHELL: &str = "/bin/sh";

/// Package installation
pub const DEFAULT_ROLLOUT_PACKAGES: &[&str] = &["curl"];
pub const DEFAULT_MONITOR_PACKAGES: &[&str] = &["btop"];
pub const DEFAULT_INSTALL_CONCURRENCY: usize = 4;

/// Rollout readiness
pub const DEFAULT_ROLLOUT_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_ROLLOUT_POLL_INTERVAL_SECS: u64 = 3;

/// Load generator defaults
pub const DEFAULT_BENCH_THREADS: u32 = 1;
pub const DEFAULT_BENCH_DURATION_SECS: u64 = 30;
pub const DEFAULT_BENCH_CONNECTIONS: u32 = 45;

/// External executables
pub const KUBECTL_BIN: &str = "kubectl";
pub const WRK_BIN: &str = "wrk";

/// Environment variable pointing at a config file
pub const CONFIG_ENV_VAR: &str = "NGINX_MULTIARCH_CONFIG";
