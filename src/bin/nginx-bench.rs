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

use nginx_multiarch::cli::{Dispatcher, LiveBackendFactory};
use nginx_multiarch::infrastructure::constants::{KUBECTL_BIN, WRK_BIN};
use nginx_multiarch::infrastructure::process::{ensure_installed, install_hint};
use nginx_multiarch::KubeError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(missing) = ensure_installed(&[KUBECTL_BIN, WRK_BIN]) {
        for err in &missing {
            eprintln!("Error: {}", err);
            if let KubeError::MissingTool { tool } = err {
                eprintln!("  {}", install_hint(tool));
            }
        }
        std::process::exit(1);
    }

    let code = Dispatcher::new(LiveBackendFactory)
        .run_bench_tool(std::env::args_os())
        .await;
    std::process::exit(code);
}
