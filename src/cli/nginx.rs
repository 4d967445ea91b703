//! Command handlers for nginx-multiarch and nginx-bench

use super::commands::{BenchCommand, ConfigCommand, WrkTarget};
use super::dispatch::Backends;
use crate::cli::display::TableRenderer;
use crate::domain::bench::{BenchParams, BenchmarkRunner};
use crate::domain::cluster::{
    ConfigRollout, InstallRequest, PackageInstaller, ServiceResolver, ShellSession,
};
use crate::domain::config::ToolConf;
use crate::domain::{extract_server, Architecture};
use crate::shared::error::KubeError;
use tracing::info;

impl ConfigCommand {
    pub async fn execute(&self, backends: &Backends, conf: &ToolConf) -> anyhow::Result<i32> {
        match self {
            ConfigCommand::Get { target } => probe(backends, conf, (*target).into()).await,
            ConfigCommand::Put { dry_run, .. } => put_config(backends, conf, *dry_run).await,
            ConfigCommand::Login { target } => login(backends, conf, (*target).into()).await,
        }
    }
}

impl BenchCommand {
    pub async fn execute(&self, backends: &Backends, conf: &ToolConf) -> anyhow::Result<i32> {
        match self {
            BenchCommand::Curl { target } => probe(backends, conf, (*target).into()).await,
            BenchCommand::Wrk {
                target,
                duration_seconds,
                connections,
            } => wrk(backends, conf, *target, *duration_seconds, *connections).await,
            BenchCommand::Put { .. } => put_monitor(backends, conf).await,
            BenchCommand::Login { target } => login(backends, conf, (*target).into()).await,
        }
    }
}

/// Resolves when the user presses Ctrl-C. If no handler can be installed
/// it never resolves.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn probe(backends: &Backends, conf: &ToolConf, arch: Architecture) -> anyhow::Result<i32> {
    let resolver = ServiceResolver::new(backends.client.as_ref(), &conf.service_template);
    let service = resolver.service_name(arch);

    let endpoint = match resolver.resolve(arch).await {
        Ok(endpoint) => endpoint,
        Err(e @ (KubeError::EndpointUnavailable { .. } | KubeError::NotFound { .. })) => {
            println!("Unable to resolve {}: {}", service, e);
            return Ok(1);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to resolve service {}: {}", service, e)),
    };

    let line = backends
        .probe
        .first_line(&endpoint)
        .await
        .map_err(|e| anyhow::anyhow!("Probe of http://{}/ failed: {}", endpoint, e))?;

    let server = extract_server(&line);
    let renderer = TableRenderer::new();
    println!("{}", renderer.render_probe(&service, &endpoint, &server));
    Ok(0)
}

async fn login(backends: &Backends, conf: &ToolConf, arch: Architecture) -> anyhow::Result<i32> {
    let session = ShellSession::new(
        backends.client.as_ref(),
        &conf.arch_label,
        &conf.login_shell,
    );

    match session.login(arch).await {
        Ok(code) => Ok(code),
        Err(KubeError::NotFound { .. }) => {
            println!(
                "No pod found with label {} in namespace {}",
                arch.label_selector(&conf.arch_label),
                conf.namespace
            );
            Ok(1)
        }
        Err(e) => Err(anyhow::anyhow!("Failed to open shell: {}", e)),
    }
}

async fn put_config(backends: &Backends, conf: &ToolConf, dry_run: bool) -> anyhow::Result<i32> {
    let rollout = ConfigRollout::new(backends.client.as_ref(), conf);

    if dry_run {
        print!("{}", rollout.render_yaml()?);
        return Ok(0);
    }

    let report = rollout
        .run(interrupted())
        .await
        .map_err(|e| anyhow::anyhow!("Config rollout failed: {}", e))?;

    let renderer = TableRenderer::new();
    println!("{}", renderer.render_rollout_report(&report, &conf.rollout_packages));

    if report.is_success() {
        info!("Config rollout complete");
        return Ok(0);
    }

    if report.patch_failures() > 0 {
        println!(
            "{} Deployment patch(es) failed. The mount patch is additive \
             and fails on Deployments that were already patched.",
            report.patch_failures()
        );
    }
    if report.wait_error.is_some() {
        println!("Patched Deployments did not finish rolling out.");
    }
    Ok(1)
}

async fn put_monitor(backends: &Backends, conf: &ToolConf) -> anyhow::Result<i32> {
    let request = InstallRequest::new(&conf.monitor_packages)?;
    let outcomes = PackageInstaller::new(backends.client.as_ref(), conf.install_concurrency)
        .install(&conf.pod_selector, &request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list pods for {}: {}", conf.pod_selector, e))?;

    if outcomes.is_empty() {
        println!("No pods found matching {}", conf.pod_selector);
        return Ok(0);
    }

    let renderer = TableRenderer::new();
    println!("{}", renderer.render_install_results(request.packages(), &outcomes));
    Ok(0)
}

async fn wrk(
    backends: &Backends,
    conf: &ToolConf,
    target: WrkTarget,
    duration_seconds: Option<u64>,
    connections: Option<u32>,
) -> anyhow::Result<i32> {
    let params = match BenchParams::from_conf(&conf.bench, duration_seconds, connections) {
        Ok(params) => params,
        Err(e) => {
            println!("Invalid benchmark parameters: {}", e);
            return Ok(1);
        }
    };
    let runner = BenchmarkRunner::new(
        backends.client.as_ref(),
        backends.loadgen.as_ref(),
        &conf.service_template,
    );

    match target.single() {
        Some(arch) => Ok(runner.run_single(arch, params).await?),
        None => {
            let report = runner
                .run_dual(Architecture::DUAL_PAIR, params, interrupted())
                .await?;
            let renderer = TableRenderer::new();
            print!("{}", renderer.render_benchmark_report(&report));
            Ok(if report.all_succeeded() { 0 } else { 1 })
        }
    }
}
