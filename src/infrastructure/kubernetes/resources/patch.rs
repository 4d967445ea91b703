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

//! Typed JSON patch operations for mounting the nginx ConfigMap

use crate::infrastructure::constants::{
    CONFIG_FILE_MODE, CONFIG_FILE_NAME, PATCH_PATH_FIRST_CONTAINER_MOUNTS, PATCH_PATH_VOLUMES,
    VOLUME_NAME_CONFIG,
};
use crate::shared::error::KubeError;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMapVolumeSource, KeyToPath, Volume, VolumeMount};
use serde::Serialize;

/// RFC 6902 operation. Only `add` is ever sent; anything else is a bug.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add {
        path: String,
        value: serde_json::Value,
    },
}

impl PatchOperation {
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. } => path,
        }
    }
}

/// Builds the volume + mount patch for one Deployment.
///
/// The patch is additive: it refuses a Deployment whose pod spec already
/// carries volumes or whose first container already has mounts, so a second
/// rollout against the same Deployment is reported instead of silently
/// replacing the lists.
pub struct ConfigMountPatch {
    configmap_name: String,
    mount_path: String,
}

impl ConfigMountPatch {
    pub fn new(configmap_name: String, mount_path: String) -> Self {
        Self {
            configmap_name,
            mount_path,
        }
    }

    pub fn volume(&self) -> Volume {
        Volume {
            name: VOLUME_NAME_CONFIG.to_string(),
            config_map: Some(ConfigMapVolumeSource {
                name: self.configmap_name.clone(),
                default_mode: Some(CONFIG_FILE_MODE),
                items: Some(vec![KeyToPath {
                    key: CONFIG_FILE_NAME.to_string(),
                    path: CONFIG_FILE_NAME.to_string(),
                    mode: Some(CONFIG_FILE_MODE),
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn volume_mount(&self) -> VolumeMount {
        VolumeMount {
            name: VOLUME_NAME_CONFIG.to_string(),
            mount_path: self.mount_path.clone(),
            sub_path: Some(CONFIG_FILE_NAME.to_string()),
            read_only: Some(true),
            ..Default::default()
        }
    }

    pub fn operations_for(
        &self,
        deployment: &Deployment,
    ) -> Result<Vec<PatchOperation>, KubeError> {
        let name = deployment
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| KubeError::InvalidResource("Deployment without a name".to_string()))?;

        let pod_spec = deployment
            .spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .ok_or_else(|| {
                KubeError::InvalidResource(format!("Deployment {} has no pod template spec", name))
            })?;

        let first_container = pod_spec.containers.first().ok_or_else(|| {
            KubeError::InvalidResource(format!("Deployment {} has no containers", name))
        })?;

        if let Some(volumes) = pod_spec.volumes.as_ref().filter(|v| !v.is_empty()) {
            let reason = if volumes.iter().any(|v| v.name == VOLUME_NAME_CONFIG) {
                format!("volume '{}' is already mounted (already patched)", VOLUME_NAME_CONFIG)
            } else {
                format!("{} already exists", PATCH_PATH_VOLUMES)
            };
            return Err(KubeError::patch_conflict(name, reason));
        }

        if first_container
            .volume_mounts
            .as_ref()
            .is_some_and(|mounts| !mounts.is_empty())
        {
            return Err(KubeError::patch_conflict(
                name,
                format!("{} already exists", PATCH_PATH_FIRST_CONTAINER_MOUNTS),
            ));
        }

        Ok(vec![
            PatchOperation::Add {
                path: PATCH_PATH_VOLUMES.to_string(),
                value: serde_json::to_value(vec![self.volume()])?,
            },
            PatchOperation::Add {
                path: PATCH_PATH_FIRST_CONTAINER_MOUNTS.to_string(),
                value: serde_json::to_value(vec![self.volume_mount()])?,
            },
        ])
    }
}
