//! Table and report rendering for CLI output

use super::colors::to_colored;
use super::{ColorTheme, StatusIcon};
use crate::domain::bench::DualReport;
use crate::domain::cluster::{PodInstallOutcome, RolloutReport};
use crate::domain::ServerIdentity;
use crate::infrastructure::constants::POD_NAME_PREFIX;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// One-line answer to "which pod served this request"
    pub fn render_probe(&self, service: &str, endpoint: &str, server: &ServerIdentity) -> String {
        let served_by = match (server.pod_name(), server.architecture()) {
            (Some(pod), Some(arch)) => {
                let highlighted = arch.color(self.theme.get_arch_color(arch)).bold().to_string();
                let rest = &pod[POD_NAME_PREFIX.len() + arch.len()..];
                format!("{}{}{}", POD_NAME_PREFIX, highlighted, rest)
            }
            (Some(pod), None) => pod.to_string(),
            _ => server.to_string().color(to_colored(self.theme.warning)).to_string(),
        };

        format!(
            "{} {} ({})\nRequest served by: {}",
            "Service".bright_black(),
            service,
            endpoint,
            served_by
        )
    }

    /// Per-pod package install results
    pub fn render_install_results(
        &self,
        packages: &[String],
        outcomes: &[PodInstallOutcome],
    ) -> String {
        if outcomes.is_empty() {
            return "No pods matched; nothing installed".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("POD").set_alignment(CellAlignment::Left),
                Cell::new("RESULT").set_alignment(CellAlignment::Center),
                Cell::new("DETAIL").set_alignment(CellAlignment::Left),
            ]);

        for outcome in outcomes {
            let label = if outcome.success { "installed" } else { "failed" };
            table.add_row(vec![
                Cell::new(&outcome.pod),
                Cell::new(format!(
                    "{} {}",
                    StatusIcon::get_outcome_icon(outcome.success),
                    label
                ))
                .fg(self.theme.get_outcome_color(outcome.success)),
                Cell::new(&outcome.detail),
            ]);
        }

        let installed = outcomes.iter().filter(|o| o.success).count();
        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Install {} {} ─╮\n",
            packages.join(" "),
            format!("[{} pods]", outcomes.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&self.summary_line("Installed", installed, outcomes.len()));
        output
    }

    /// Patch table followed by the install table
    pub fn render_rollout_report(&self, report: &RolloutReport, packages: &[String]) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} ConfigMap {} applied\n\n",
            StatusIcon::SUCCESS.green(),
            report.configmap
        ));

        if report.patches.is_empty() {
            output.push_str("No matching Deployments; nothing patched\n");
        } else {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("DEPLOYMENT").set_alignment(CellAlignment::Left),
                    Cell::new("PATCH").set_alignment(CellAlignment::Center),
                    Cell::new("DETAIL").set_alignment(CellAlignment::Left),
                ]);

            for patch in &report.patches {
                table.add_row(vec![
                    Cell::new(&patch.deployment),
                    Cell::new(StatusIcon::get_outcome_icon(patch.success))
                        .fg(self.theme.get_outcome_color(patch.success)),
                    Cell::new(&patch.detail),
                ]);
            }
            output.push_str(&table.to_string());
            output.push('\n');
            let patched = report.patches.len() - report.patch_failures();
            output.push_str(&self.summary_line("Patched", patched, report.patches.len()));
        }

        if let Some(error) = &report.wait_error {
            output.push_str(&format!("{} {}\n", StatusIcon::ERROR.red(), error));
        }

        output.push('\n');
        output.push_str(&self.render_install_results(packages, &report.installs));
        output
    }

    /// Dual benchmark output, one block per architecture in report order
    pub fn render_benchmark_report(&self, report: &DualReport) -> String {
        let mut output = format!(
            "Benchmark started {} ({} thread(s), {} connections, {}s)\n",
            report.started_at.format("%Y-%m-%d %H:%M:%S"),
            report.params.threads,
            report.params.connections,
            report.params.duration.as_secs()
        );

        for result in &report.results {
            let banner = format!("===== {} RESULTS =====", result.arch.banner());
            output.push('\n');
            output.push_str(&banner.color(to_colored(self.theme.info)).bold().to_string());
            output.push('\n');
            output.push_str(&format!("{} {}\n", "Endpoint:".bright_black(), result.endpoint));
            output.push_str(&result.output);
            if !result.output.is_empty() && !result.output.ends_with('\n') {
                output.push('\n');
            }
            if let Some(error) = &result.error {
                output.push_str(&format!("{} {}\n", StatusIcon::ERROR.red(), error));
            } else if let Some(code) = result.exit_code.filter(|code| *code != 0) {
                output.push_str(&format!(
                    "{} load generator exited with status {}\n",
                    StatusIcon::ERROR.red(),
                    code
                ));
            }
        }

        output
    }

    fn summary_line(&self, verb: &str, succeeded: usize, total: usize) -> String {
        let icon = StatusIcon::get_ratio_icon(succeeded, total);
        let text = format!(
            "{} {} {}/{} ({})",
            icon,
            verb,
            succeeded,
            total,
            StatusIcon::get_summary_text(succeeded, total)
        );
        format!(
            "{}\n",
            text.color(to_colored(self.theme.get_ratio_color(succeeded, total)))
        )
    }
}
