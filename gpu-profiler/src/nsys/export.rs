//! CSV export through `nsys stats`
//!
//! Every requested report is exported in one invocation, next to the input
//! report, as `<base>_<report>.csv`.

use super::reports::NsysReport;
use crate::error::Result;
use crate::table::CsvTable;
use crate::tool;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Output base for exports: the report's directory and file stem
pub fn export_base(report: &Path) -> PathBuf {
    let dir = report.parent().unwrap_or_else(|| Path::new(""));
    let stem = report
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(stem)
}

/// Where `nsys stats` writes the CSV for `kind`
pub fn csv_path(report: &Path, kind: NsysReport) -> PathBuf {
    let base = export_base(report);
    let file_name = format!(
        "{}_{}.csv",
        base.file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        kind.name()
    );
    base.with_file_name(file_name)
}

/// Arguments for a single `nsys stats` run exporting `reports`
pub fn stats_args(report: &Path, reports: &BTreeSet<NsysReport>) -> Vec<String> {
    let names: Vec<&str> = reports.iter().map(NsysReport::name).collect();
    vec![
        "stats".to_string(),
        "--report".to_string(),
        names.join(","),
        "--timeunit".to_string(),
        "ns".to_string(),
        "--force-export=true".to_string(),
        "--format".to_string(),
        "csv".to_string(),
        "--output".to_string(),
        export_base(report).display().to_string(),
        "--force-overwrite=true".to_string(),
        report.display().to_string(),
    ]
}

/// Delete exports left over from an earlier run of the same report
pub async fn remove_stale_exports(report: &Path, reports: &BTreeSet<NsysReport>) -> Result<()> {
    for &kind in reports {
        let path = csv_path(report, kind);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("Removed stale export {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Run the export and load every expected CSV
pub async fn export_reports(
    nsys: &Path,
    report: &Path,
    reports: &BTreeSet<NsysReport>,
    timeout: Option<Duration>,
) -> Result<BTreeMap<NsysReport, CsvTable>> {
    let args = stats_args(report, reports);
    info!(
        "Exporting {} nsys report(s) from {}",
        reports.len(),
        report.display()
    );
    // nsys can exit 0 without writing a report it skipped
    remove_stale_exports(report, reports).await?;
    tool::run("nsys", nsys, &args, timeout).await?;

    reports
        .iter()
        .map(|&kind| Ok((kind, CsvTable::read(&csv_path(report, kind))?)))
        .collect()
}
