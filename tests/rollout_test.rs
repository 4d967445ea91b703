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

mod common;

use common::{fast_tool_conf, stalled_deployment, standard_cluster, MockKubeClient};
use nginx_multiarch::{ConfigRollout, KubeError};
use std::time::Duration;

fn stalled_intel_cluster() -> MockKubeClient {
    let mut state = standard_cluster();
    state.deployments.insert(
        "nginx-intel".to_string(),
        stalled_deployment("nginx-intel"),
    );
    MockKubeClient::new(state)
}

#[tokio::test]
async fn test_wait_times_out_naming_only_pending_deployments() {
    let client = stalled_intel_cluster();
    let conf = fast_tool_conf();
    let rollout = ConfigRollout::new(&client, &conf);
    let names = vec!["nginx-arm".to_string(), "nginx-intel".to_string()];

    let result = rollout
        .wait_until_rolled_out(&names, std::future::pending::<()>())
        .await;

    match result {
        Err(KubeError::Timeout(message)) => {
            assert!(message.contains("nginx-intel"), "{}", message);
            assert!(!message.contains("nginx-arm"), "{}", message);
        }
        other => panic!("expected a timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wait_is_cancelled_when_cancel_resolves() {
    let client = stalled_intel_cluster();
    let conf = fast_tool_conf();
    let rollout = ConfigRollout::new(&client, &conf);
    let names = vec!["nginx-intel".to_string()];

    let result = rollout
        .wait_until_rolled_out(&names, std::future::ready(()))
        .await;

    assert!(matches!(result, Err(KubeError::Cancelled(_))));
}

#[tokio::test]
async fn test_wait_succeeds_once_every_deployment_is_ready() {
    let client = MockKubeClient::new(standard_cluster());
    let conf = fast_tool_conf();
    let rollout = ConfigRollout::new(&client, &conf);
    let names = vec!["nginx-arm".to_string(), "nginx-intel".to_string()];

    rollout
        .wait_until_rolled_out(&names, std::future::pending::<()>())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_run_keeps_patch_outcomes_after_timeout() {
    let client = stalled_intel_cluster();
    let conf = fast_tool_conf();

    let report = ConfigRollout::new(&client, &conf)
        .run(std::future::pending::<()>())
        .await
        .unwrap();

    assert_eq!(report.patches.len(), 2);
    assert!(report.patches.iter().all(|p| p.success));
    let wait_error = report.wait_error.clone().unwrap();
    assert!(wait_error.contains("nginx-intel"));
    assert!(!wait_error.contains("nginx-arm"));
    assert!(!report.is_success());

    // Installs still reach the pods after a timeout
    assert_eq!(report.installs.len(), 2);
    assert_eq!(client.state.lock().unwrap().exec_calls.len(), 2);
}

#[tokio::test]
async fn test_run_skips_installs_when_cancelled() {
    let client = stalled_intel_cluster();
    let conf = fast_tool_conf();

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        ConfigRollout::new(&client, &conf).run(std::future::ready(())),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(report.patches.len(), 2);
    assert!(report.wait_error.unwrap().contains("Interrupted"));
    assert!(report.installs.is_empty());

    let state = client.state.lock().unwrap();
    assert!(state.exec_calls.is_empty());
    assert!(state.configmaps.contains_key("nginx-config"));
}
