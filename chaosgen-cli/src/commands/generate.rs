//! `chaosgen generate` command handler

use std::collections::BTreeMap;
use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use chaosgen_core::LabelSelector;
use chaosgen_core::config::ChaosgenConfig;
use chaosgen_scenario::{
    ApplicationOutage, ContainerKill, ContainerKillSingle, ContainerPause, CpuHog, HogTarget,
    IoHog, MemoryHog, NodeNetworkChaos, PodTargets, RegexPodKill, Scenario,
};

use crate::cli::{
    AppOutageArgs, ContainerKillArgs, ContainerPauseArgs, GenerateArgs, GenerateScenario, HogArgs,
    NetworkChaosArgs, PodKillArgs,
};
use crate::commands::{default_scenario_dir, scenario_generator};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `generate` command.
pub async fn execute(
    args: GenerateArgs,
    config: &ChaosgenConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let generator = scenario_generator(config);
    let scenario = scenario_from_args(args.scenario, &config.scenario.storage_namespace);

    let report = if args.dry_run {
        GenerateReport {
            kind: scenario.kind().to_string(),
            template: scenario.template().to_owned(),
            file_name: generator.planned_file_name(scenario.as_ref())?,
            path: None,
            rendered: Some(generator.preview(scenario.as_ref())?),
        }
    } else {
        let dir = args
            .scenario_dir
            .unwrap_or_else(|| default_scenario_dir(config));
        info!(kind = %scenario.kind(), dir = %dir.display(), "generating scenario");
        let path = generator.generate(&dir, scenario.as_ref())?;
        GenerateReport {
            kind: scenario.kind().to_string(),
            template: scenario.template().to_owned(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: Some(path.display().to_string()),
            rendered: None,
        }
    };

    writer.render(&report)
}

/// Turn parsed arguments into a scenario builder.
///
/// Unset flags keep the builder defaults. Validation is left to the builder.
pub fn scenario_from_args(
    scenario: GenerateScenario,
    storage_namespace: &str,
) -> Box<dyn Scenario> {
    match scenario {
        GenerateScenario::CpuHog(args) => {
            let mut hog = CpuHog::default();
            if let Some(duration) = args.duration {
                hog.duration = duration;
            }
            apply_hog_target(&args, &mut hog.target);
            Box::new(hog)
        }
        GenerateScenario::IoHog(args) => {
            let mut hog = IoHog::default();
            if let Some(duration) = args.duration {
                hog.duration = duration;
            }
            apply_hog_target(&args, &mut hog.target);
            Box::new(hog)
        }
        GenerateScenario::MemoryHog(args) => {
            let mut hog = MemoryHog::default();
            if let Some(duration) = args.duration {
                hog.duration = duration;
            }
            apply_hog_target(&args, &mut hog.target);
            Box::new(hog)
        }
        GenerateScenario::AppOutage(args) => Box::new(app_outage(args)),
        GenerateScenario::PodKill(args) => Box::new(pod_kill(args)),
        GenerateScenario::ContainerKill(args) if args.is_single() => {
            Box::new(container_kill_single(args))
        }
        GenerateScenario::ContainerKill(args) => {
            Box::new(container_kill(args, storage_namespace))
        }
        GenerateScenario::ContainerPause(args) => Box::new(container_pause(args)),
        GenerateScenario::NetworkChaos(args) => Box::new(network_chaos(args)),
    }
}

fn apply_hog_target(args: &HogArgs, target: &mut HogTarget) {
    if let Some(node) = &args.node_name {
        target.node_name = Some(node.clone());
    }
    if let Some(namespace) = &args.namespace {
        target.namespace = namespace.clone();
    }
    if args.workers.is_some() {
        target.workers = args.workers;
    }
    if args.number_of_nodes.is_some() {
        target.number_of_nodes = args.number_of_nodes;
    }
}

fn app_outage(args: AppOutageArgs) -> ApplicationOutage {
    let defaults = ApplicationOutage::default();
    let labels: BTreeMap<String, String> = args.labels.into_iter().collect();
    ApplicationOutage {
        duration: args.duration.unwrap_or(defaults.duration),
        namespace: args.namespace,
        targets: PodTargets::Singular(labels),
        block: if args.block.is_empty() {
            defaults.block
        } else {
            args.block
        },
    }
}

fn pod_kill(args: PodKillArgs) -> RegexPodKill {
    let defaults = RegexPodKill::default();
    RegexPodKill {
        namespace_pattern: args.namespace_pattern.unwrap_or(defaults.namespace_pattern),
        name_pattern: args.name_pattern.unwrap_or(defaults.name_pattern),
        kill: args.kill.unwrap_or(defaults.kill),
        ..defaults
    }
}

fn container_kill(args: ContainerKillArgs, storage_namespace: &str) -> ContainerKill {
    let defaults = ContainerKill::default();
    ContainerKill {
        namespace: Some(
            args.namespace
                .unwrap_or_else(|| storage_namespace.to_owned()),
        ),
        container_name: args.container_name.unwrap_or(defaults.container_name),
        kill_signal: args.signal.unwrap_or(defaults.kill_signal),
        instance_count: args.instance_count.unwrap_or(defaults.instance_count),
        wait_duration: args.wait_duration.unwrap_or(defaults.wait_duration),
        scenarios: Vec::new(),
    }
}

fn container_kill_single(args: ContainerKillArgs) -> ContainerKillSingle {
    let defaults = ContainerKillSingle::default();
    ContainerKillSingle {
        namespace: args.namespace.unwrap_or_default(),
        pod_name: args.pod_name,
        label_selector: args.label_selector.map(LabelSelector::expression),
        container_name: args.container_name.unwrap_or(defaults.container_name),
        kill_signal: args.signal.unwrap_or(defaults.kill_signal),
        instance_count: args.instance_count.unwrap_or(defaults.instance_count),
        wait_duration: args.wait_duration.unwrap_or(defaults.wait_duration),
    }
}

fn container_pause(args: ContainerPauseArgs) -> ContainerPause {
    let defaults = ContainerPause::new(args.namespace);
    ContainerPause {
        pod_name: args.pod_name,
        label_selector: args.label_selector.map(LabelSelector::expression),
        container_name: args.container_name.unwrap_or_default(),
        pause_seconds: args.pause_seconds.unwrap_or(defaults.pause_seconds),
        instance_count: args.instance_count.unwrap_or(defaults.instance_count),
        wait_duration: args.wait_duration,
        ..defaults
    }
}

fn network_chaos(args: NetworkChaosArgs) -> NodeNetworkChaos {
    let defaults = NodeNetworkChaos::default();
    NodeNetworkChaos {
        duration: args.duration.unwrap_or(defaults.duration),
        node_name: args.node_name,
        label_selector: args.label_selector,
        interfaces: if args.interfaces.is_empty() {
            defaults.interfaces.clone()
        } else {
            args.interfaces
        },
        ..defaults
    }
}

/// Result of one `generate` run.
#[derive(Serialize)]
pub struct GenerateReport {
    pub kind: String,
    pub template: String,
    pub file_name: String,
    /// Written path (absent for `--dry-run`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Rendered document (only for `--dry-run`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
}

impl Render for GenerateReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if let Some(rendered) = &self.rendered {
            // raw document so the output can be piped into a file
            write!(w, "{rendered}")?;
            if !rendered.ends_with('\n') {
                writeln!(w)?;
            }
            return Ok(());
        }

        writeln!(w, "{} {}", "Generated".green().bold(), self.kind)?;
        writeln!(w, "  template: {}", self.template)?;
        writeln!(
            w,
            "  path:     {}",
            self.path.as_deref().unwrap_or(&self.file_name)
        )?;
        Ok(())
    }
}
