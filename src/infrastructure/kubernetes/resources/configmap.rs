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

use crate::infrastructure::constants::{
    CONFIG_FILE_NAME, LABEL_APP, LABEL_APP_VALUE, LABEL_MANAGED_BY, LABEL_MANAGED_BY_VALUE,
};
use crate::shared::error::KubeError;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// nginx.conf shipped to every deployment; the location block answers with
/// the pod hostname so probes can tell which backend served them.
pub const NGINX_CONF: &str = include_str!("../../../../assets/nginx.conf");

pub struct ConfigMapBuilder {
    name: String,
    namespace: String,
}

impl ConfigMapBuilder {
    pub fn new(name: String, namespace: String) -> Self {
        Self { name, namespace }
    }

    pub fn build(&self) -> ConfigMap {
        let metadata = ObjectMeta {
            name: Some(self.name.clone()),
            namespace: Some(self.namespace.clone()),
            labels: Some(self.get_labels()),
            ..Default::default()
        };

        let mut data = BTreeMap::new();
        data.insert(CONFIG_FILE_NAME.to_string(), NGINX_CONF.to_string());

        ConfigMap {
            metadata,
            data: Some(data),
            ..Default::default()
        }
    }

    /// Render the ConfigMap as YAML, the "render" half of render-then-apply
    pub fn render_yaml(&self) -> Result<String, KubeError> {
        let configmap = self.build();
        let mut value = serde_yaml::to_value(&configmap)?;
        if let serde_yaml::Value::Mapping(ref mut map) = value {
            map.insert("apiVersion".into(), "v1".into());
            map.insert("kind".into(), "ConfigMap".into());
        }
        Ok(serde_yaml::to_string(&value)?)
    }

    pub fn get_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_APP.to_string(), LABEL_APP_VALUE.to_string());
        labels.insert(
            LABEL_MANAGED_BY.to_string(),
            LABEL_MANAGED_BY_VALUE.to_string(),
        );
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_configmap() {
        let cm = ConfigMapBuilder::new("nginx-config".to_string(), "web".to_string()).build();
        assert_eq!(cm.metadata.name.as_deref(), Some("nginx-config"));
        assert_eq!(cm.metadata.namespace.as_deref(), Some("web"));
        let data = cm.data.unwrap();
        assert!(data["nginx.conf"].contains("\"server\":\"$hostname\""));
        assert_eq!(
            cm.metadata.labels.unwrap().get("managed-by").map(String::as_str),
            Some("nginx-multiarch")
        );
    }

    #[test]
    fn test_embedded_conf_not_empty() {
        assert!(!NGINX_CONF.trim().is_empty());
        assert!(NGINX_CONF.contains("server {"));
    }

    #[test]
    fn test_render_yaml_has_type_meta() {
        let yaml = ConfigMapBuilder::new("nginx-config".to_string(), "default".to_string())
            .render_yaml()
            .unwrap();
        assert!(yaml.contains("kind: ConfigMap"));
        assert!(yaml.contains("apiVersion: v1"));
        assert!(yaml.contains("nginx.conf:"));
    }
}
