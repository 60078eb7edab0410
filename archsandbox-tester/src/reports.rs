use anyhow::Result;
use archsandbox_engine::{LintReport, RankedEntry, RequirementReport, SchemaEvaluation, Severity};
use chrono::Utc;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use crate::scenarios::ScenarioResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored summary for terminals
    Console,
    /// One JSON document with every section
    Json,
    /// Markdown suitable for CI summaries
    Markdown,
}

#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub source: String,
    pub panels: usize,
    #[serde(flatten)]
    pub evaluation: SchemaEvaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_type: Option<AppTypeCheck>,
}

#[derive(Debug, Serialize)]
pub struct AppTypeCheck {
    pub id: String,
    pub name: String,
    pub within_budget: bool,
    #[serde(flatten)]
    pub report: RequirementReport,
}

#[derive(Debug, Serialize)]
pub struct RankingReport<'a> {
    pub source: String,
    pub selected: Vec<String>,
    pub entries: Vec<RankedEntry<'a>>,
}

/// Everything one run produced, written in a single format.
#[derive(Debug, Default, Serialize)]
pub struct RunReport<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lint: Option<LintReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking: Option<RankingReport<'a>>,
}

impl RunReport<'_> {
    pub fn failed(&self) -> bool {
        self.scenarios.iter().any(|r| !r.passed)
            || self.lint.as_ref().is_some_and(LintReport::has_errors)
    }

    pub fn write(&self, out: &mut dyn Write, format: ReportFormat, elapsed: Duration) -> Result<()> {
        match format {
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)?;
                return Ok(());
            }
            ReportFormat::Markdown => self.write_markdown(out)?,
            ReportFormat::Console => self.write_console(out)?,
        }
        writeln!(out)?;
        writeln!(out, "🏁 Total time: {elapsed:?}")?;
        Ok(())
    }

    fn write_console(&self, out: &mut dyn Write) -> Result<()> {
        let mut wrote = false;
        if !self.scenarios.is_empty() {
            generate_console_report(out, &self.scenarios)?;
            wrote = true;
        }
        if let Some(lint) = &self.lint {
            lint_console(out, lint)?;
            wrote = true;
        }
        if let Some(evaluation) = &self.evaluation {
            evaluation_console(out, evaluation)?;
            wrote = true;
        }
        if let Some(ranking) = &self.ranking {
            ranking_console(out, ranking)?;
            wrote = true;
        }
        if !wrote {
            writeln!(out, "Nothing to report.")?;
        }
        Ok(())
    }

    fn write_markdown(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "# Architecture Sandbox Test Results\n")?;
        writeln!(out, "_Generated {}_\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
        if !self.scenarios.is_empty() {
            generate_markdown_report(out, &self.scenarios)?;
        }
        if let Some(lint) = &self.lint {
            lint_markdown(out, lint)?;
        }
        if let Some(evaluation) = &self.evaluation {
            evaluation_markdown(out, evaluation)?;
        }
        if let Some(ranking) = &self.ranking {
            ranking_markdown(out, ranking)?;
        }
        if self.scenarios.is_empty()
            && self.lint.is_none()
            && self.evaluation.is_none()
            && self.ranking.is_none()
        {
            writeln!(out, "_Nothing executed._")?;
        }
        Ok(())
    }
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(results: &[ScenarioResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    (passed as f64 / results.len() as f64) * 100.0
}

pub fn generate_console_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=======================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total scenarios: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, result.scenario_name.bold())?;
        writeln!(out, "   Time: {}µs", result.elapsed_us)?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
    }
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {} {}\n", status, result.scenario_name)?;
        writeln!(out, "- **Key**: `{}`", result.key)?;
        writeln!(out, "- **Time**: {}µs", result.elapsed_us)?;
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn lint_console(out: &mut dyn Write, lint: &LintReport) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "🔎 Catalog Lint".bright_cyan().bold())?;
    writeln!(out, "{}", "===============".cyan())?;
    writeln!(out, "Checked: {}", lint.checked)?;
    writeln!(
        out,
        "Errors: {}  Warnings: {}  Info: {}",
        lint.count(Severity::Error).to_string().red(),
        lint.count(Severity::Warning).to_string().yellow(),
        lint.count(Severity::Info)
    )?;
    for issue in &lint.issues {
        let line = issue.to_string();
        let line = match issue.severity {
            Severity::Error => line.red(),
            Severity::Warning => line.yellow(),
            Severity::Info => line.normal(),
        };
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

fn lint_markdown(out: &mut dyn Write, lint: &LintReport) -> Result<()> {
    writeln!(out, "## Catalog Lint\n")?;
    writeln!(out, "- **Checked**: {}", lint.checked)?;
    writeln!(out, "- **Errors**: {}", lint.count(Severity::Error))?;
    writeln!(out, "- **Warnings**: {}", lint.count(Severity::Warning))?;
    writeln!(out, "- **Info**: {}\n", lint.count(Severity::Info))?;
    for issue in &lint.issues {
        writeln!(out, "- {issue}")?;
    }
    writeln!(out)?;
    Ok(())
}

fn evaluation_console(out: &mut dyn Write, report: &EvaluationReport) -> Result<()> {
    let evaluation = &report.evaluation;
    writeln!(out)?;
    writeln!(out, "{}", "📐 Schema Evaluation".bright_cyan().bold())?;
    writeln!(out, "{}", "====================".cyan())?;
    writeln!(out, "Source: {} ({} panels)", report.source, report.panels)?;
    for (name, value) in evaluation.metrics.fields() {
        writeln!(out, "  {name:18} {value:6.1}")?;
    }
    if let Some(breakdown) = &evaluation.breakdown
        && !breakdown.fired_rules.is_empty()
    {
        writeln!(out, "Rules: {}", breakdown.fired_rules.join(", "))?;
    }
    writeln!(
        out,
        "Budget: ${:.0} of ${:.0} spent, ${:.0} left",
        evaluation.budget.spent, evaluation.budget.total, evaluation.budget.remaining
    )?;
    if !evaluation.suggestions.is_empty() {
        writeln!(out, "Suggestions: {}", evaluation.suggestions.join(", "))?;
    }
    if let Some(check) = &report.app_type {
        let verdict = if check.report.met {
            "✅ requirements met".green()
        } else {
            "❌ requirements missed".red()
        };
        writeln!(out, "{} {verdict} (score {})", check.name.bold(), check.report.score)?;
        for issue in &check.report.issues {
            writeln!(out, "     • {issue}")?;
        }
        if !check.within_budget {
            writeln!(out, "     • {}", "over the app type budget".yellow())?;
        }
    }
    Ok(())
}

fn evaluation_markdown(out: &mut dyn Write, report: &EvaluationReport) -> Result<()> {
    let evaluation = &report.evaluation;
    writeln!(out, "## Schema Evaluation\n")?;
    writeln!(out, "Source: `{}` ({} panels)\n", report.source, report.panels)?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|---|---|")?;
    for (name, value) in evaluation.metrics.fields() {
        writeln!(out, "| {name} | {value:.1} |")?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "- **Budget**: ${:.0} of ${:.0} spent",
        evaluation.budget.spent, evaluation.budget.total
    )?;
    if !evaluation.suggestions.is_empty() {
        writeln!(out, "- **Suggestions**: {}", evaluation.suggestions.join(", "))?;
    }
    if let Some(check) = &report.app_type {
        writeln!(
            out,
            "- **{}**: score {}{}",
            check.name,
            check.report.score,
            if check.report.met { "" } else { " (requirements missed)" }
        )?;
        for issue in &check.report.issues {
            writeln!(out, "  - {issue}")?;
        }
    }
    writeln!(out)?;
    Ok(())
}

fn ranking_console(out: &mut dyn Write, ranking: &RankingReport<'_>) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "🏆 Ranked Technologies".bright_cyan().bold())?;
    writeln!(out, "{}", "======================".cyan())?;
    writeln!(out, "Source: {}", ranking.source)?;
    if !ranking.selected.is_empty() {
        writeln!(out, "Selected: {}", ranking.selected.join(", "))?;
    }
    for (position, entry) in ranking.entries.iter().enumerate() {
        let label = entry.label.map_or_else(String::new, |label| label.to_string());
        writeln!(
            out,
            "{:3}. {:24} score {:6} complexity {:5.1} {}",
            position + 1,
            entry.name,
            entry.score,
            entry.complexity,
            label.bold()
        )?;
    }
    Ok(())
}

fn ranking_markdown(out: &mut dyn Write, ranking: &RankingReport<'_>) -> Result<()> {
    writeln!(out, "## Ranked Technologies\n")?;
    writeln!(out, "| # | Technology | Score | Complexity | Label |")?;
    writeln!(out, "|---|---|---|---|---|")?;
    for (position, entry) in ranking.entries.iter().enumerate() {
        let label = entry.label.map_or_else(String::new, |label| label.to_string());
        writeln!(
            out,
            "| {} | {} | {} | {:.1} | {label} |",
            position + 1,
            entry.name,
            entry.score,
            entry.complexity
        )?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Sample".to_string(),
            key: "sample".to_string(),
            passed,
            failures: if passed {
                Vec::new()
            } else {
                vec!["boom".to_string()]
            },
            elapsed_us: 12,
        }
    }

    fn render(report: &RunReport<'_>, format: ReportFormat) -> String {
        let mut buffer = Vec::new();
        report
            .write(&mut buffer, format, Duration::from_millis(1))
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn empty_report_says_so() {
        let report = RunReport::default();
        assert!(render(&report, ReportFormat::Console).contains("Nothing to report."));
        assert!(render(&report, ReportFormat::Markdown).contains("_Nothing executed._"));
        assert_eq!(render(&report, ReportFormat::Json).trim(), "{}");
        assert!(!report.failed());
    }

    #[test]
    fn console_lists_pass_and_fail() {
        let report = RunReport {
            scenarios: vec![sample_result(true), sample_result(false)],
            ..RunReport::default()
        };
        let text = render(&report, ReportFormat::Console);
        assert!(text.contains("PASS"));
        assert!(text.contains("FAIL"));
        assert!(text.contains("boom"));
        assert!(text.contains("Success rate: 50.0%"));
        assert!(report.failed());
    }

    #[test]
    fn markdown_has_summary_and_details() {
        let report = RunReport {
            scenarios: vec![sample_result(true)],
            ..RunReport::default()
        };
        let text = render(&report, ReportFormat::Markdown);
        assert!(text.contains("## Summary"));
        assert!(text.contains("## Detailed Results"));
        assert!(text.contains("### ✅ Sample"));
    }

    #[test]
    fn json_nests_sections() {
        let report = RunReport {
            scenarios: vec![sample_result(false)],
            lint: Some(LintReport::default()),
            ..RunReport::default()
        };
        let value: serde_json::Value =
            serde_json::from_str(&render(&report, ReportFormat::Json)).unwrap();
        assert_eq!(value["scenarios"][0]["passed"], false);
        assert_eq!(value["lint"]["checked"], 0);
        assert!(value.get("ranking").is_none());
    }
}
