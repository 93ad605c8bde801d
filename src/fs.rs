use crate::rename::{Rename, RenamePlan};
use eyre::{Result, bail, eyre};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Join a directory and a file name the way scanned paths are written:
/// `/` separators (backslashes are rewritten on Windows only), and no `./`
/// for the current directory.
pub fn join_path(dir: &Path, name: &str) -> String {
    let dir = dir.to_string_lossy();
    #[cfg(windows)]
    let dir = dir.replace('\\', "/");
    match dir.trim_end_matches('/') {
        "" if dir.starts_with('/') => format!("/{name}"),
        "" | "." => name.to_owned(),
        d => format!("{d}/{name}"),
    }
}

/// List the files under `dir`, sorted, optionally descending into
/// subdirectories. Entries whose names aren't valid UTF-8 are skipped.
pub fn scan_dir(dir: &Path, recursive: bool) -> Result<Vec<String>> {
    let mut out = Vec::new();
    scan_into(dir, recursive, &mut out)?;
    out.sort();
    tracing::debug!(dir = %dir.display(), files = out.len(), "scanned directory");
    Ok(out)
}

fn scan_into(dir: &Path, recursive: bool, out: &mut Vec<String>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| eyre!("cannot read {}: {e}", dir.display()))?;
    for entry in entries {
        let e = entry?;
        let Some(name) = e.file_name().to_str().map(str::to_owned) else {
            tracing::trace!(path = %e.path().display(), "skipping non UTF-8 name");
            continue;
        };
        let path = join_path(dir, &name);
        if e.file_type()?.is_dir() {
            if recursive {
                scan_into(Path::new(&path), recursive, out)?;
            }
            continue;
        }
        out.push(path);
    }
    Ok(())
}

/// How a plan is carried out on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// Log and report the renames without touching the filesystem.
    pub dry_run: bool,
    /// Replace existing files that are not part of the sequence.
    pub overwrite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameStatus {
    Renamed,
    Unchanged,
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    pub from: String,
    pub to: String,
    pub status: RenameStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    pub outcomes: Vec<RenameOutcome>,
}

impl ExecutionReport {
    pub fn renamed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == RenameStatus::Renamed)
            .count()
    }

    fn push(&mut self, r: &Rename, status: RenameStatus) {
        self.outcomes.push(RenameOutcome {
            from: r.from.clone(),
            to: r.to.clone(),
            status,
        });
    }
}

/// Perform `plan` on disk, in plan order.
///
/// Targets are checked up front: each must be free or vacated by an
/// earlier step, unless `overwrite` is set. If any rename fails, the ones
/// already done are reversed before the error is returned, leaving the
/// directory as it was (files replaced under `overwrite` are not restored).
pub fn execute_plan(plan: &RenamePlan, options: ExecuteOptions) -> Result<ExecutionReport> {
    let mut vacated: HashSet<&str> = HashSet::new();
    for r in plan.changes() {
        if !options.overwrite && Path::new(&r.to).exists() && !vacated.contains(r.to.as_str()) {
            bail!("target already exists: {}", r.to);
        }
        vacated.insert(r.from.as_str());
    }

    let mut report = ExecutionReport::default();
    let mut done: Vec<&Rename> = Vec::new();
    for r in plan.renames() {
        if r.is_identity() {
            report.push(r, RenameStatus::Unchanged);
            continue;
        }
        if options.dry_run {
            tracing::info!(from = %r.from, to = %r.to, "would rename");
            report.push(r, RenameStatus::DryRun);
            continue;
        }
        if let Err(e) = fs::rename(&r.from, &r.to) {
            tracing::error!(from = %r.from, to = %r.to, error = %e, "rename failed, rolling back");
            rollback(&done);
            return Err(eyre!("failed to rename {} -> {}: {e}", r.from, r.to));
        }
        tracing::debug!(from = %r.from, to = %r.to, "renamed");
        done.push(r);
        report.push(r, RenameStatus::Renamed);
    }

    tracing::info!(renamed = report.renamed(), sequence = %plan.target, "rename complete");
    Ok(report)
}

fn rollback(done: &[&Rename]) {
    for r in done.iter().rev() {
        match fs::rename(&r.to, &r.from) {
            Ok(()) => tracing::warn!(from = %r.to, to = %r.from, "reverted"),
            Err(e) => {
                tracing::error!(from = %r.to, to = %r.from, error = %e, "could not revert rename")
            }
        }
    }
}
