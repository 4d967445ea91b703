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

//! Architecture tags that select a service, deployment and pod set

use crate::infrastructure::constants::SERVICE_TEMPLATE_PLACEHOLDER;
use std::fmt;

/// CPU architecture variant of the nginx deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    Intel,
    Arm,
    Amd,
    Multiarch,
}

impl Architecture {
    /// Pair benchmarked side by side in dual mode, in report order
    pub const DUAL_PAIR: [Architecture; 2] = [Architecture::Intel, Architecture::Arm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intel => "intel",
            Self::Arm => "arm",
            Self::Amd => "amd",
            Self::Multiarch => "multiarch",
        }
    }

    /// Service name derived from a template such as `nginx-{arch}-svc`
    pub fn service_name(&self, template: &str) -> String {
        template.replace(SERVICE_TEMPLATE_PLACEHOLDER, self.as_str())
    }

    pub fn label_selector(&self, label_key: &str) -> String {
        format!("{}={}", label_key, self.as_str())
    }

    pub fn banner(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name() {
        assert_eq!(Architecture::Arm.service_name("nginx-{arch}-svc"), "nginx-arm-svc");
        assert_eq!(
            Architecture::Multiarch.service_name("web-{arch}"),
            "web-multiarch"
        );
    }

    #[test]
    fn test_label_selector() {
        assert_eq!(Architecture::Intel.label_selector("arch"), "arch=intel");
    }

    #[test]
    fn test_dual_pair_order() {
        assert_eq!(Architecture::DUAL_PAIR[0].banner(), "INTEL");
        assert_eq!(Architecture::DUAL_PAIR[1].banner(), "ARM");
    }
}
