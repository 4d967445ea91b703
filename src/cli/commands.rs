// CLI command definitions for both tools

use crate::domain::Architecture;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Options accepted by both tools, before or after the verb
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Kubernetes namespace (overrides the config file)
    #[arg(long, short = 'n', global = true)]
    pub namespace: Option<String>,

    /// Path to kubeconfig file
    /// If not specified, uses default kubeconfig resolution (KUBECONFIG env or ~/.kube/config)
    #[arg(long, global = true)]
    pub kubeconfig: Option<String>,

    /// Kubernetes context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// TOML config file (falls back to $NGINX_MULTIARCH_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

// ============================================================================
// nginx-multiarch
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "nginx-multiarch",
    version,
    about = "Inspect and configure the multi-architecture nginx deployment",
    disable_help_subcommand = true
)]
pub struct ConfigToolArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Probe a service and report which pod served the request
    Get {
        #[arg(value_enum)]
        target: GetTarget,
    },

    /// Push the nginx ConfigMap and mount it into the deployments
    Put {
        #[arg(value_enum)]
        target: ConfigPutTarget,

        /// Print the rendered ConfigMap instead of applying it
        #[arg(long)]
        dry_run: bool,
    },

    /// Open an interactive shell in a pod of the given architecture
    Login {
        #[arg(value_enum)]
        target: ConfigLoginTarget,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetTarget {
    Intel,
    Arm,
    Amd,
    Multiarch,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPutTarget {
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLoginTarget {
    Intel,
    Arm,
    Amd,
}

impl From<GetTarget> for Architecture {
    fn from(target: GetTarget) -> Self {
        match target {
            GetTarget::Intel => Architecture::Intel,
            GetTarget::Arm => Architecture::Arm,
            GetTarget::Amd => Architecture::Amd,
            GetTarget::Multiarch => Architecture::Multiarch,
        }
    }
}

impl From<ConfigLoginTarget> for Architecture {
    fn from(target: ConfigLoginTarget) -> Self {
        match target {
            ConfigLoginTarget::Intel => Architecture::Intel,
            ConfigLoginTarget::Arm => Architecture::Arm,
            ConfigLoginTarget::Amd => Architecture::Amd,
        }
    }
}

// ============================================================================
// nginx-bench
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "nginx-bench",
    version,
    about = "Probe and benchmark the multi-architecture nginx services",
    disable_help_subcommand = true
)]
pub struct BenchToolArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: BenchCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BenchCommand {
    /// Probe a service and report which pod served the request
    Curl {
        #[arg(value_enum)]
        target: CurlTarget,
    },

    /// Run wrk against one service, or intel and arm side by side with `both`
    Wrk {
        #[arg(value_enum)]
        target: WrkTarget,

        /// Duration in seconds (default 30)
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        duration_seconds: Option<u64>,

        /// Concurrent connections (default 45)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        connections: Option<u32>,
    },

    /// Install a monitoring utility on every nginx pod
    Put {
        #[arg(value_enum)]
        target: BenchPutTarget,
    },

    /// Open an interactive shell in a pod of the given architecture
    Login {
        #[arg(value_enum)]
        target: BenchLoginTarget,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurlTarget {
    Intel,
    Arm,
    Multiarch,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrkTarget {
    Intel,
    Arm,
    Multiarch,
    Both,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchPutTarget {
    Btop,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchLoginTarget {
    Intel,
    Arm,
}

impl From<CurlTarget> for Architecture {
    fn from(target: CurlTarget) -> Self {
        match target {
            CurlTarget::Intel => Architecture::Intel,
            CurlTarget::Arm => Architecture::Arm,
            CurlTarget::Multiarch => Architecture::Multiarch,
        }
    }
}

impl From<BenchLoginTarget> for Architecture {
    fn from(target: BenchLoginTarget) -> Self {
        match target {
            BenchLoginTarget::Intel => Architecture::Intel,
            BenchLoginTarget::Arm => Architecture::Arm,
        }
    }
}

impl WrkTarget {
    /// `None` for `both`, which runs the dual pair
    pub fn single(&self) -> Option<Architecture> {
        match self {
            WrkTarget::Intel => Some(Architecture::Intel),
            WrkTarget::Arm => Some(Architecture::Arm),
            WrkTarget::Multiarch => Some(Architecture::Multiarch),
            WrkTarget::Both => None,
        }
    }
}

pub const CONFIG_TOOL_USAGE: &str = "\
Usage: nginx-multiarch [OPTIONS] <COMMAND> <TARGET>

Commands:
  get   {intel|arm|amd|multiarch}   Show which pod serves the service
  put   {config} [--dry-run]         Push nginx.conf and mount it into the deployments
  login {intel|arm|amd}              Open a shell in a pod

Options:
  -n, --namespace <NS>   --kubeconfig <PATH>   --context <NAME>   --config <FILE>";

pub const BENCH_TOOL_USAGE: &str = "\
Usage: nginx-bench [OPTIONS] <COMMAND> <TARGET> [ARGS]

Commands:
  curl  {intel|arm|multiarch}                          Show which pod serves the service
  wrk   {intel|arm|multiarch|both} [duration] [conns]  Benchmark (defaults: 30s, 45 connections)
  put   {btop}                                         Install btop on every nginx pod
  login {intel|arm}                                    Open a shell in a pod

Options:
  -n, --namespace <NS>   --kubeconfig <PATH>   --context <NAME>   --config <FILE>";
