//! Output handling: persists a `ScanReport` and renders live progress
//!
//! The CSV format is the workbook layout: a directory holding one file per
//! range plus the `All_Reachable` / `All_Unreachable` summaries.

use crate::error::SweepError;
use crate::events::{ScanEvent, ScanObserver};
use crate::scanner::ScanReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const DEFAULT_OUTPUT_DIR: &str = "ping_scan_results";
pub const REACHABLE_SHEET: &str = "All_Reachable";
pub const UNREACHABLE_SHEET: &str = "All_Unreachable";

/// Output format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Directory for CSV, file for JSON/Text (stdout when `None`)
    pub path: Option<PathBuf>,
    pub colored: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            path: None,
            colored: true,
        }
    }
}

/// Main output manager
pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Write the report; returns where it went (`None` for stdout)
    pub fn write_report(&self, report: &ScanReport) -> crate::Result<Option<PathBuf>> {
        match self.config.format {
            OutputFormat::Csv => {
                let dir = self
                    .config
                    .path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
                self.write_csv_dir(report, &dir)?;
                Ok(Some(dir))
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(report)
                    .map_err(|e| SweepError::OutputError(format!("Failed to encode JSON: {}", e)))?;
                self.emit(&(json + "\n"))
            }
            OutputFormat::Text => self.emit(&self.format_text(report)),
        }
    }

    fn emit(&self, output: &str) -> crate::Result<Option<PathBuf>> {
        match &self.config.path {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(output.as_bytes())?;
                Ok(Some(path.clone()))
            }
            None => {
                print!("{}", output);
                Ok(None)
            }
        }
    }

    /// One `<range_id>.csv` per range plus the two summary files
    fn write_csv_dir(&self, report: &ScanReport, dir: &Path) -> crate::Result<()> {
        fs::create_dir_all(dir)?;

        for entry in &report.ranges {
            let rows = entry
                .result
                .hosts
                .iter()
                .map(|host| vec![host.address.to_string(), host.status.to_string()]);
            write_sheet(&dir.join(sheet_file_name(&entry.id)), &["IP Address", "Status"], rows)?;
        }

        write_address_sheet(dir, REACHABLE_SHEET, "Reachable IPs", &report.all_reachable)?;
        write_address_sheet(dir, UNREACHABLE_SHEET, "Unreachable IPs", &report.all_unreachable)?;
        Ok(())
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.config.colored {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Format results as a human-readable summary
    fn format_text(&self, report: &ScanReport) -> String {
        let mut output = String::new();

        for entry in &report.ranges {
            let reachable: Vec<String> = entry
                .result
                .reachable()
                .map(|h| h.address.to_string())
                .collect();
            output.push_str(&format!(
                "{} ({}): {}/{} reachable\n",
                self.paint(&entry.result.range.to_string(), |s| s.cyan().bold()),
                entry.id,
                reachable.len(),
                entry.result.len()
            ));
            for address in reachable {
                output.push_str(&format!("  {} {}\n", self.paint("[+]", |s| s.green()), address));
            }
        }

        for failure in &report.failures {
            output.push_str(&format!(
                "{} skipped {}: {}\n",
                self.paint("[-]", |s| s.red()),
                failure.spec(),
                failure
            ));
        }

        output.push_str(&format!(
            "\n{} reachable, {} unreachable across {} ranges{}\n",
            report.all_reachable.len(),
            report.all_unreachable.len(),
            report.len(),
            if report.cancelled { " (cancelled)" } else { "" }
        ));
        output
    }
}

/// Range ids may contain `:` (IPv6), which is not valid in every file system
fn sheet_file_name(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '-' })
        .collect();
    format!("{}.csv", stem)
}

fn write_sheet<I>(path: &Path, header: &[&str], rows: I) -> crate::Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let csv_error = |e: csv::Error| SweepError::OutputError(format!("{}: {}", path.display(), e));

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer.write_record(&row).map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_address_sheet(
    dir: &Path,
    sheet: &str,
    column: &str,
    addresses: &[IpAddr],
) -> crate::Result<()> {
    let rows = addresses.iter().map(|address| vec![address.to_string()]);
    write_sheet(&dir.join(format!("{}.csv", sheet)), &[column], rows)
}

/// Console progress: one bar per range plus the per-target notices
pub struct ProgressDisplay {
    bar: Mutex<Option<ProgressBar>>,
    show_bar: bool,
}

impl ProgressDisplay {
    pub fn new(show_bar: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            show_bar,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█░")
    }

    /// Print above the active bar, if any
    fn say(&self, bar: Option<&ProgressBar>, line: String) {
        match bar {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }
}

impl ScanObserver for ProgressDisplay {
    fn notify(&self, event: ScanEvent) {
        let Ok(mut active) = self.bar.lock() else {
            return;
        };

        match event {
            ScanEvent::RangeStarted { range, hosts, .. } => {
                self.say(None, format!("{}", format!("Scanning: {}", range).cyan()));
                if self.show_bar {
                    let bar = ProgressBar::new(hosts as u64);
                    bar.set_style(Self::style());
                    bar.set_message(format!("Scanning {}", range));
                    *active = Some(bar);
                }
            }
            ScanEvent::HostProbed { .. } => {
                if let Some(bar) = active.as_ref() {
                    bar.inc(1);
                }
            }
            ScanEvent::RangeFinished {
                reachable,
                unreachable,
                ..
            } => {
                if let Some(bar) = active.take() {
                    bar.finish_and_clear();
                }
                self.say(
                    None,
                    format!(
                        "  {} reachable, {} unreachable",
                        reachable.to_string().green().bold(),
                        unreachable
                    ),
                );
            }
            ScanEvent::SpecRejected { error } => {
                let line = format!("Invalid IP or CIDR: {} - {}", error.spec(), error);
                self.say(active.as_ref(), format!("{}", line.red()));
            }
            ScanEvent::RangeIdCollision { range_id, range } => {
                let line = format!(
                    "Sheet {} reused; {} replaces the earlier range",
                    range_id, range
                );
                self.say(active.as_ref(), format!("{}", line.yellow()));
            }
            ScanEvent::Cancelled => {
                if let Some(bar) = active.take() {
                    bar.abandon();
                }
                let line = "Scan interrupted, keeping completed ranges";
                self.say(None, format!("{}", line.yellow().bold()));
            }
        }
    }
}
