//! CLI argument parsing using clap derive API
//!
//! Purely declarative. Argument values are turned into scenario builders
//! by the command handlers, never here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use chaosgen_core::TrafficDirection;

/// chaosgen -- chaos scenario file generator.
///
/// Use `chaosgen <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "chaosgen", version, about, long_about = None)]
pub struct Cli {
    /// Path to the chaosgen.toml configuration file.
    #[arg(short, long, default_value = "chaosgen.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Override the template root directory.
    #[arg(long, global = true)]
    pub template_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a single scenario file.
    Generate(GenerateArgs),

    /// Generate or check every scenario listed in a plan file.
    Plan(PlanArgs),

    /// Inspect the template tree.
    Templates(TemplatesArgs),

    /// Manage configuration.
    Config(ConfigArgs),

    /// Allocate and check chaos tool server ports.
    Port(PortArgs),
}

// ---- generate ----

/// Generate one scenario file into the scenario directory.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory to write the scenario into (default: scenario.output_dir).
    #[arg(long, global = true)]
    pub scenario_dir: Option<PathBuf>,

    /// Print the rendered scenario instead of writing it.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub scenario: GenerateScenario,
}

#[derive(Subcommand, Debug)]
pub enum GenerateScenario {
    /// CPU stress on cluster nodes.
    CpuHog(HogArgs),
    /// Disk write stress on cluster nodes.
    IoHog(HogArgs),
    /// Memory stress on cluster nodes.
    MemoryHog(HogArgs),
    /// Block traffic to pods matching labels.
    AppOutage(AppOutageArgs),
    /// Kill pods whose namespace and name match regexes.
    PodKill(PodKillArgs),
    /// Kill containers of storage components (or a single target).
    ContainerKill(ContainerKillArgs),
    /// Pause containers for a fixed time.
    ContainerPause(ContainerPauseArgs),
    /// Node-level egress impairment.
    NetworkChaos(NetworkChaosArgs),
}

/// Shared resource-hog options.
#[derive(Args, Debug, Default)]
pub struct HogArgs {
    /// Stress duration in seconds.
    #[arg(long)]
    pub duration: Option<u64>,

    /// Pin the hog to one node.
    #[arg(long)]
    pub node_name: Option<String>,

    /// Namespace the hog pod runs in.
    #[arg(long)]
    pub namespace: Option<String>,

    /// Number of stress workers.
    #[arg(long)]
    pub workers: Option<u32>,

    /// Number of nodes to target.
    #[arg(long)]
    pub number_of_nodes: Option<u32>,
}

#[derive(Args, Debug)]
pub struct AppOutageArgs {
    /// Namespace of the target pods.
    #[arg(long)]
    pub namespace: String,

    /// Outage duration in seconds (capped at 300).
    #[arg(long)]
    pub duration: Option<u64>,

    /// Pod label as key=value. Repeatable.
    #[arg(long = "label", value_parser = parse_key_val)]
    pub labels: Vec<(String, String)>,

    /// Traffic direction to block. Repeatable.
    #[arg(long)]
    pub block: Vec<TrafficDirection>,
}

#[derive(Args, Debug, Default)]
pub struct PodKillArgs {
    /// Regex matched against namespace names.
    #[arg(long)]
    pub namespace_pattern: Option<String>,

    /// Regex matched against pod names.
    #[arg(long)]
    pub name_pattern: Option<String>,

    /// Number of pods to kill.
    #[arg(long)]
    pub kill: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub struct ContainerKillArgs {
    /// Namespace of the targets.
    #[arg(long)]
    pub namespace: Option<String>,

    /// Kill a single pod by name instead of the component catalog.
    #[arg(long, conflicts_with = "label_selector")]
    pub pod_name: Option<String>,

    /// Kill pods matching this selector instead of the component catalog.
    #[arg(long)]
    pub label_selector: Option<String>,

    /// Container to kill inside the pod.
    #[arg(long)]
    pub container_name: Option<String>,

    /// Signal sent to the container.
    #[arg(long)]
    pub signal: Option<String>,

    /// Number of matching pods to affect.
    #[arg(long)]
    pub instance_count: Option<u32>,

    /// Seconds to wait for recovery.
    #[arg(long)]
    pub wait_duration: Option<u64>,
}

impl ContainerKillArgs {
    /// Single-target mode is chosen by naming a pod or a selector.
    pub fn is_single(&self) -> bool {
        self.pod_name.is_some() || self.label_selector.is_some()
    }
}

#[derive(Args, Debug)]
pub struct ContainerPauseArgs {
    /// Namespace of the target pod.
    #[arg(long)]
    pub namespace: String,

    /// Pod to pause.
    #[arg(long, conflicts_with = "label_selector")]
    pub pod_name: Option<String>,

    /// Pause pods matching this selector.
    #[arg(long)]
    pub label_selector: Option<String>,

    /// Container to pause inside the pod.
    #[arg(long)]
    pub container_name: Option<String>,

    /// Pause length in seconds.
    #[arg(long)]
    pub pause_seconds: Option<u64>,

    /// Number of matching pods to affect.
    #[arg(long)]
    pub instance_count: Option<u32>,

    /// Seconds to wait for recovery.
    #[arg(long)]
    pub wait_duration: Option<u64>,
}

#[derive(Args, Debug, Default)]
pub struct NetworkChaosArgs {
    /// Target one node.
    #[arg(long, conflicts_with = "label_selector")]
    pub node_name: Option<String>,

    /// Target nodes matching this selector (default: worker nodes).
    #[arg(long)]
    pub label_selector: Option<String>,

    /// Network interface to impair. Repeatable.
    #[arg(long = "interface")]
    pub interfaces: Vec<String>,

    /// Impairment duration in seconds.
    #[arg(long)]
    pub duration: Option<u64>,
}

/// Parse a `key=value` pair.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty label key in '{s}'"));
    }
    Ok((key.trim().to_owned(), value.trim().to_owned()))
}

// ---- plan ----

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(subcommand)]
    pub action: PlanAction,
}

#[derive(Subcommand, Debug)]
pub enum PlanAction {
    /// Write every scenario in the plan.
    Apply {
        /// Plan file (YAML).
        file: PathBuf,

        /// Output directory (overrides the plan's scenario_dir).
        #[arg(long)]
        scenario_dir: Option<PathBuf>,
    },
    /// Assemble every scenario without writing anything.
    Validate {
        /// Plan file (YAML).
        file: PathBuf,
    },
}

// ---- templates ----

#[derive(Args, Debug)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub action: TemplatesAction,
}

#[derive(Subcommand, Debug)]
pub enum TemplatesAction {
    /// List the templates the builders use.
    List,
    /// Fail if any builder template is missing.
    Check,
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only one section (general, scenario, ports).
        #[arg(long)]
        section: Option<String>,
    },
}

// ---- port ----

#[derive(Args, Debug)]
pub struct PortArgs {
    #[command(subcommand)]
    pub action: PortAction,
}

#[derive(Subcommand, Debug)]
pub enum PortAction {
    /// Find a bindable port for the chaos tool server.
    Find {
        /// Try this port first.
        #[arg(long)]
        preferred: Option<u16>,
    },
    /// Report which of the given ports are free.
    Check {
        #[arg(required = true)]
        ports: Vec<u16>,
    },
    /// Check that a port range is usable.
    ValidateRange { start: u32, end: u32 },
    /// Write a port into the chaos tool config (default: next free port).
    Rewrite {
        /// Chaos tool config file (YAML).
        tool_config: PathBuf,

        #[arg(long)]
        port: Option<u16>,
    },
    /// Move the chaos tool to a free port if its error output shows a port conflict.
    Resolve {
        /// Chaos tool config file (YAML).
        tool_config: PathBuf,

        /// File holding the tool's captured stderr.
        #[arg(long)]
        stderr_file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("should parse")
    }

    #[test]
    fn test_cli_parse_generate_cpu_hog() {
        let cli = parse(&[
            "chaosgen",
            "generate",
            "cpu-hog",
            "--duration",
            "120",
            "--node-name",
            "worker-1",
        ]);
        match cli.command {
            Commands::Generate(args) => match args.scenario {
                GenerateScenario::CpuHog(hog) => {
                    assert_eq!(hog.duration, Some(120));
                    assert_eq!(hog.node_name.as_deref(), Some("worker-1"));
                    assert!(hog.namespace.is_none());
                }
                other => panic!("expected cpu-hog, got {other:?}"),
            },
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_cli_parse_generate_scenario_dir_after_subcommand() {
        let cli = parse(&[
            "chaosgen",
            "generate",
            "memory-hog",
            "--scenario-dir",
            "/tmp/out",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.scenario_dir, Some(PathBuf::from("/tmp/out")));
                assert!(args.dry_run);
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_cli_parse_app_outage_labels_and_block() {
        let cli = parse(&[
            "chaosgen",
            "generate",
            "app-outage",
            "--namespace",
            "openshift-storage",
            "--label",
            "app=rook-ceph-osd",
            "--label",
            "tier = storage",
            "--block",
            "Ingress",
        ]);
        match cli.command {
            Commands::Generate(args) => match args.scenario {
                GenerateScenario::AppOutage(outage) => {
                    assert_eq!(outage.namespace, "openshift-storage");
                    assert_eq!(
                        outage.labels,
                        vec![
                            ("app".to_owned(), "rook-ceph-osd".to_owned()),
                            ("tier".to_owned(), "storage".to_owned()),
                        ]
                    );
                    assert_eq!(outage.block, vec![TrafficDirection::Ingress]);
                }
                other => panic!("expected app-outage, got {other:?}"),
            },
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_cli_parse_app_outage_requires_namespace() {
        let result = Cli::try_parse_from(["chaosgen", "generate", "app-outage"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_label_without_equals_fails() {
        let result = Cli::try_parse_from([
            "chaosgen",
            "generate",
            "app-outage",
            "--namespace",
            "ns",
            "--label",
            "app",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_container_kill_modes() {
        let catalog = parse(&["chaosgen", "generate", "container-kill", "--signal", "SIGTERM"]);
        let single = parse(&[
            "chaosgen",
            "generate",
            "container-kill",
            "--namespace",
            "ns",
            "--pod-name",
            "p1",
        ]);
        for (cli, expect_single) in [(catalog, false), (single, true)] {
            match cli.command {
                Commands::Generate(GenerateArgs {
                    scenario: GenerateScenario::ContainerKill(args),
                    ..
                }) => assert_eq!(args.is_single(), expect_single),
                _ => panic!("expected container-kill"),
            }
        }
    }

    #[test]
    fn test_cli_parse_container_pause_selector_conflict() {
        let result = Cli::try_parse_from([
            "chaosgen",
            "generate",
            "container-pause",
            "--namespace",
            "ns",
            "--pod-name",
            "p1",
            "--label-selector",
            "app=x",
        ]);
        assert!(result.is_err(), "pod-name and label-selector are exclusive");
    }

    #[test]
    fn test_cli_parse_network_chaos_interfaces() {
        let cli = parse(&[
            "chaosgen",
            "generate",
            "network-chaos",
            "--interface",
            "ens192",
            "--interface",
            "eth1",
        ]);
        match cli.command {
            Commands::Generate(GenerateArgs {
                scenario: GenerateScenario::NetworkChaos(args),
                ..
            }) => {
                assert_eq!(args.interfaces, vec!["ens192", "eth1"]);
                assert!(args.node_name.is_none());
            }
            _ => panic!("expected network-chaos"),
        }
    }

    #[test]
    fn test_cli_parse_plan_apply() {
        let cli = parse(&["chaosgen", "plan", "apply", "plan.yaml", "--scenario-dir", "/tmp/s"]);
        match cli.command {
            Commands::Plan(args) => match args.action {
                PlanAction::Apply { file, scenario_dir } => {
                    assert_eq!(file, PathBuf::from("plan.yaml"));
                    assert_eq!(scenario_dir, Some(PathBuf::from("/tmp/s")));
                }
                other => panic!("expected apply, got {other:?}"),
            },
            _ => panic!("expected plan command"),
        }
    }

    #[test]
    fn test_cli_parse_templates_check() {
        let cli = parse(&["chaosgen", "--template-dir", "/opt/t", "templates", "check"]);
        assert_eq!(cli.template_dir, Some(PathBuf::from("/opt/t")));
        assert!(matches!(
            cli.command,
            Commands::Templates(TemplatesArgs {
                action: TemplatesAction::Check
            })
        ));
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = parse(&["chaosgen", "config", "show", "--section", "ports"]);
        match cli.command {
            Commands::Config(args) => match args.action {
                ConfigAction::Show { section } => assert_eq!(section.as_deref(), Some("ports")),
                other => panic!("expected show, got {other:?}"),
            },
            _ => panic!("expected config command"),
        }
    }

    #[test]
    fn test_cli_parse_port_check_requires_ports() {
        assert!(Cli::try_parse_from(["chaosgen", "port", "check"]).is_err());
        let cli = parse(&["chaosgen", "port", "check", "8081", "8082"]);
        match cli.command {
            Commands::Port(PortArgs {
                action: PortAction::Check { ports },
            }) => assert_eq!(ports, vec![8081, 8082]),
            _ => panic!("expected port check"),
        }
    }

    #[test]
    fn test_cli_parse_port_validate_range() {
        let cli = parse(&["chaosgen", "port", "validate-range", "8081", "8181"]);
        assert!(matches!(
            cli.command,
            Commands::Port(PortArgs {
                action: PortAction::ValidateRange {
                    start: 8081,
                    end: 8181
                }
            })
        ));
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = parse(&[
            "chaosgen",
            "--config",
            "/etc/chaosgen.toml",
            "templates",
            "list",
            "--log-level",
            "debug",
            "--output",
            "json",
        ]);
        assert_eq!(cli.config, PathBuf::from("/etc/chaosgen.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.output, OutputFormat::Json));
    }

    #[test]
    fn test_cli_parse_default_config_path() {
        let cli = parse(&["chaosgen", "templates", "list"]);
        assert_eq!(cli.config, PathBuf::from("chaosgen.toml"));
        assert!(matches!(cli.output, OutputFormat::Text));
    }

    #[test]
    fn test_cli_parse_missing_command_fails() {
        assert!(Cli::try_parse_from(["chaosgen"]).is_err());
    }

    #[test]
    fn test_cli_verify_command_structure() {
        Cli::command().debug_assert();
    }
}
