//! Parse, configure, connect, execute

use super::commands::{
    BenchToolArgs, ConfigToolArgs, GlobalArgs, BENCH_TOOL_USAGE, CONFIG_TOOL_USAGE,
};
use crate::domain::config::ToolConf;
use crate::infrastructure::http::{HttpProbe, ReqwestProbe};
use crate::infrastructure::kubernetes::{NginxKubeClient, NginxKubeClientImpl};
use crate::infrastructure::process::{LoadGenerator, WrkRunner};
use crate::shared::error::KubeError;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use tracing::debug;

/// Collaborators a command runs against
pub struct Backends {
    pub client: Box<dyn NginxKubeClient>,
    pub probe: Box<dyn HttpProbe>,
    pub loadgen: Box<dyn LoadGenerator>,
}

/// Creates [`Backends`] once the command line and config are known to be valid
#[async_trait::async_trait]
pub trait BackendFactory: Send + Sync {
    async fn connect(&self, conf: &ToolConf) -> Result<Backends, KubeError>;
}

/// Real cluster, reqwest and wrk
pub struct LiveBackendFactory;

#[async_trait::async_trait]
impl BackendFactory for LiveBackendFactory {
    async fn connect(&self, conf: &ToolConf) -> Result<Backends, KubeError> {
        let client = NginxKubeClientImpl::new_with_config(
            conf.namespace.clone(),
            conf.kubeconfig.clone(),
            conf.context.clone(),
        )
        .await?;

        Ok(Backends {
            client: Box::new(client),
            probe: Box::new(ReqwestProbe::new()),
            loadgen: Box::new(WrkRunner::new()),
        })
    }
}

/// Why a command line was not turned into an invocation
#[derive(Debug)]
pub enum ParseFailure {
    /// `--help` / `--version`
    Informational(clap::Error),
    /// Anything clap rejected; carries the full message to print
    Usage(String),
}

impl ParseFailure {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Informational(_) => 0,
            Self::Usage(_) => 1,
        }
    }

    /// Print to stdout and return the exit code
    pub fn report(&self) -> i32 {
        match self {
            Self::Informational(err) => {
                let _ = err.print();
            }
            Self::Usage(message) => println!("{}", message),
        }
        self.exit_code()
    }
}

/// Parse with clap, replacing clap's own usage error with the tool's usage text
pub fn parse_args<P, I, T>(args: I, usage: &str) -> Result<P, ParseFailure>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    P::try_parse_from(args).map_err(|err| match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ParseFailure::Informational(err),
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand | ErrorKind::MissingSubcommand => {
            ParseFailure::Usage(format!("Missing command\n\n{}", usage))
        }
        _ => {
            let rendered = err.to_string();
            let reason = rendered
                .lines()
                .next()
                .unwrap_or("invalid command")
                .trim_start_matches("error: ")
                .to_string();
            ParseFailure::Usage(format!("Invalid command: {}\n\n{}", reason, usage))
        }
    })
}

/// Config file first, then command-line overrides
pub fn resolve_conf(global: &GlobalArgs) -> Result<ToolConf, KubeError> {
    let mut conf = ToolConf::load(global.config.as_deref())?;

    if let Some(namespace) = &global.namespace {
        conf.namespace = namespace.clone();
    }
    if let Some(kubeconfig) = &global.kubeconfig {
        conf.kubeconfig = Some(kubeconfig.clone());
    }
    if let Some(context) = &global.context {
        conf.context = Some(context.clone());
    }

    conf.validate()?;
    Ok(conf)
}

fn finish(result: anyhow::Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

/// Routes a validated command line to its handler. Nothing touches the
/// cluster until parsing and configuration have succeeded.
pub struct Dispatcher<F> {
    factory: F,
}

impl<F: BackendFactory> Dispatcher<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    async fn prepare(&self, global: &GlobalArgs) -> Result<(ToolConf, Backends), i32> {
        let conf = resolve_conf(global).map_err(|e| {
            eprintln!("Error: {}", e);
            1
        })?;

        debug!("Using namespace {}", conf.namespace);
        let backends = self.factory.connect(&conf).await.map_err(|e| {
            eprintln!("Error: {}", e);
            1
        })?;

        Ok((conf, backends))
    }

    pub async fn run_config_tool<I, T>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let parsed: ConfigToolArgs = match parse_args(args, CONFIG_TOOL_USAGE) {
            Ok(parsed) => parsed,
            Err(failure) => return failure.report(),
        };

        let (conf, backends) = match self.prepare(&parsed.global).await {
            Ok(prepared) => prepared,
            Err(code) => return code,
        };

        finish(parsed.command.execute(&backends, &conf).await)
    }

    pub async fn run_bench_tool<I, T>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let parsed: BenchToolArgs = match parse_args(args, BENCH_TOOL_USAGE) {
            Ok(parsed) => parsed,
            Err(failure) => return failure.report(),
        };

        let (conf, backends) = match self.prepare(&parsed.global).await {
            Ok(prepared) => prepared,
            Err(code) => return code,
        };

        finish(parsed.command.execute(&backends, &conf).await)
    }
}
