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

//! Identify the backend pod that answered a probe

use crate::infrastructure::constants::POD_NAME_PREFIX;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

pub const UNKNOWN_SERVER: &str = "Unable to determine";

/// Result of reading the `server` field out of a probe response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerIdentity {
    Known(String),
    Unknown,
}

impl ServerIdentity {
    pub fn pod_name(&self) -> Option<&str> {
        match self {
            Self::Known(name) => Some(name.as_str()),
            Self::Unknown => None,
        }
    }

    /// Architecture segment of the pod name, used only for highlighting
    pub fn architecture(&self) -> Option<&str> {
        self.pod_name().and_then(pod_architecture)
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(name) => f.write_str(name),
            Self::Unknown => f.write_str(UNKNOWN_SERVER),
        }
    }
}

/// Extract the `server` value from the first line of a probe response.
///
/// The line is parsed as JSON first. Responses that are not valid JSON
/// (truncated bodies, log prefixes) fall back to a `"server":"<value>"`
/// pattern match.
pub fn extract_server(line: &str) -> ServerIdentity {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(line) {
        if let Some(serde_json::Value::String(server)) = map.get("server") {
            return known_or_unknown(server);
        }
    }

    static SERVER_RE: OnceLock<Regex> = OnceLock::new();
    let re = SERVER_RE.get_or_init(|| {
        Regex::new(r#""server"\s*:\s*"([^"]*)""#).expect("server pattern is valid")
    });

    match re.captures(line).and_then(|caps| caps.get(1)) {
        Some(m) => known_or_unknown(m.as_str()),
        None => ServerIdentity::Unknown,
    }
}

fn known_or_unknown(value: &str) -> ServerIdentity {
    if value.is_empty() {
        ServerIdentity::Unknown
    } else {
        ServerIdentity::Known(value.to_string())
    }
}

/// `nginx-arm-7d9c-x2` -> `arm`
pub fn pod_architecture(pod: &str) -> Option<&str> {
    let rest = pod.strip_prefix(POD_NAME_PREFIX)?;
    let arch = rest.split('-').next()?;
    if arch.is_empty() {
        None
    } else {
        Some(arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_json() {
        let line = r#"{"server":"nginx-arm-xyz","uri":"/","time":"2024-01-01T00:00:00Z"}"#;
        assert_eq!(
            extract_server(line),
            ServerIdentity::Known("nginx-arm-xyz".to_string())
        );
    }

    #[test]
    fn test_extract_from_non_json_line() {
        let line = r#"prefix {"server":"nginx-intel-abc", "truncated"#;
        assert_eq!(
            extract_server(line),
            ServerIdentity::Known("nginx-intel-abc".to_string())
        );
    }

    #[test]
    fn test_extract_with_whitespace() {
        let line = r#"{ "server" : "nginx-amd-1" }"#;
        assert_eq!(extract_server(line).pod_name(), Some("nginx-amd-1"));
    }

    #[test]
    fn test_missing_server_is_unknown() {
        assert_eq!(extract_server(r#"{"uri":"/"}"#), ServerIdentity::Unknown);
        assert_eq!(extract_server(""), ServerIdentity::Unknown);
        assert_eq!(extract_server("<html>"), ServerIdentity::Unknown);
        assert_eq!(ServerIdentity::Unknown.to_string(), "Unable to determine");
    }

    #[test]
    fn test_non_string_server_is_unknown() {
        assert_eq!(extract_server(r#"{"server":42}"#), ServerIdentity::Unknown);
    }

    #[test]
    fn test_pod_architecture() {
        assert_eq!(pod_architecture("nginx-arm-xyz"), Some("arm"));
        assert_eq!(pod_architecture("nginx-multiarch-5f8d9-abcde"), Some("multiarch"));
        assert_eq!(pod_architecture("httpd-arm-xyz"), None);
        assert_eq!(pod_architecture("nginx-"), None);
        assert_eq!(
            ServerIdentity::Known("nginx-intel-1".to_string()).architecture(),
            Some("intel")
        );
    }
}
