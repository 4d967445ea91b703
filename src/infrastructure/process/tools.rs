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

use crate::infrastructure::constants::{KUBECTL_BIN, WRK_BIN};
use crate::shared::error::KubeError;
use std::path::{Path, PathBuf};

/// Installation hint printed when a tool is missing from PATH
pub fn install_hint(tool: &str) -> &'static str {
    match tool {
        KUBECTL_BIN => "install kubectl: https://kubernetes.io/docs/tasks/tools/",
        WRK_BIN => "install wrk: `sudo apt-get install -y wrk` or `brew install wrk`",
        _ => "install it with your system package manager",
    }
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Locate an executable in the directories of `search_path`
pub fn find_in_path(tool: &str, search_path: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    let search_path = search_path?;
    std::env::split_paths(search_path)
        .map(|dir| dir.join(tool))
        .find(|candidate| is_executable(candidate))
}

/// Check every tool against `$PATH`. All missing tools are reported, not
/// just the first one.
pub fn ensure_installed(tools: &[&str]) -> Result<(), Vec<KubeError>> {
    let search_path = std::env::var_os("PATH");
    let missing: Vec<KubeError> = tools
        .iter()
        .filter(|tool| find_in_path(tool, search_path.as_deref()).is_none())
        .map(|tool| KubeError::MissingTool {
            tool: tool.to_string(),
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}
