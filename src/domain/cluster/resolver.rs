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
use crate::infrastructure::kubernetes::NginxKubeClient;
use crate::shared::error::KubeError;
use k8s_openapi::api::core::v1::Service;
use tracing::debug;

/// Resolves an architecture tag to the address published on its
/// load-balancer service. Nothing is cached; every call asks the API server.
pub struct ServiceResolver<'a> {
    client: &'a dyn NginxKubeClient,
    service_template: &'a str,
}

impl<'a> ServiceResolver<'a> {
    pub fn new(client: &'a dyn NginxKubeClient, service_template: &'a str) -> Self {
        Self {
            client,
            service_template,
        }
    }

    pub fn service_name(&self, arch: Architecture) -> String {
        arch.service_name(self.service_template)
    }

    /// An empty or missing ingress is an error rather than an empty string.
    pub async fn resolve(&self, arch: Architecture) -> Result<String, KubeError> {
        let name = self.service_name(arch);
        let service = self.client.get_service(&name).await?;

        let endpoint = ingress_endpoint(&service)
            .ok_or_else(|| KubeError::endpoint_unavailable(&name))?;
        debug!("Resolved {} to {}", name, endpoint);
        Ok(endpoint)
    }
}

/// First ingress entry, IP preferred over hostname
pub fn ingress_endpoint(service: &Service) -> Option<String> {
    let ingress = service
        .status
        .as_ref()?
        .load_balancer
        .as_ref()?
        .ingress
        .as_ref()?
        .first()?;

    ingress
        .ip
        .as_deref()
        .filter(|ip| !ip.trim().is_empty())
        .or_else(|| {
            ingress
                .hostname
                .as_deref()
                .filter(|host| !host.trim().is_empty())
        })
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{LoadBalancerIngress, LoadBalancerStatus, ServiceStatus};

    fn service_with(ingress: Option<Vec<LoadBalancerIngress>>) -> Service {
        Service {
            status: Some(ServiceStatus {
                load_balancer: Some(LoadBalancerStatus { ingress }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_ip_preferred() {
        let svc = service_with(Some(vec![LoadBalancerIngress {
            ip: Some("203.0.113.9".to_string()),
            hostname: Some("lb.example.com".to_string()),
            ..Default::default()
        }]));
        assert_eq!(ingress_endpoint(&svc).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_hostname_fallback() {
        let svc = service_with(Some(vec![LoadBalancerIngress {
            ip: Some(String::new()),
            hostname: Some("a1.elb.amazonaws.com".to_string()),
            ..Default::default()
        }]));
        assert_eq!(
            ingress_endpoint(&svc).as_deref(),
            Some("a1.elb.amazonaws.com")
        );
    }

    #[test]
    fn test_pending_load_balancer() {
        assert_eq!(ingress_endpoint(&service_with(None)), None);
        assert_eq!(ingress_endpoint(&service_with(Some(vec![]))), None);
        assert_eq!(ingress_endpoint(&Service::default()), None);
    }
}
