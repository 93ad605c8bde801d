mod cli;

use clap::Parser;
use cli::{Args, Commands, InfoArgs, ListArgs, RenameArgs};
use eyre::{Result, eyre};
use numseq::fs::{self, ExecuteOptions, RenameStatus};
use numseq::{
    Catalog, Padding, PatternStyle, RenameTarget, SequenceGroup, SequenceItem, parse_item,
    parse_pattern,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Gaps printed by `info` before the list is cut short.
const MAX_LISTED_GAPS: usize = 20;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::List(a) => list(a),
        Commands::Info(a) => info(a),
        Commands::Rename(a) => rename(a),
    }
}

/// Resolve the directory holding `item` and rewrite `item` the way
/// [`fs::scan_dir`] spells paths in that directory.
fn locate(item: &str, dir: Option<PathBuf>) -> (PathBuf, String) {
    let path = Path::new(item);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| item.to_owned());
    let dir = dir.unwrap_or_else(|| {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    });
    let item = fs::join_path(&dir, &name);
    (dir, item)
}

fn find_group<'a>(catalog: &'a Catalog, item: &str, dir: &Path) -> Result<&'a SequenceGroup> {
    catalog
        .find(item)
        .ok_or_else(|| eyre!("no sequence matching {item} in {}", dir.display()))
}

#[derive(Serialize)]
struct ListEntry {
    pattern: String,
    padding: Padding,
    count: usize,
    first: u64,
    last: u64,
    ranges: String,
    missing: u64,
}

fn list(a: ListArgs) -> Result<()> {
    let paths = if a.paths.is_empty() {
        let dir = a.dir.unwrap_or_else(|| PathBuf::from("."));
        fs::scan_dir(&dir, a.recursive)?
    } else {
        a.paths
    };
    let catalog = Catalog::build(&paths);
    let style = PatternStyle::from(a.style);

    let mut entries = Vec::with_capacity(catalog.groups().len());
    for group in catalog.groups() {
        let first = group.first()?.value();
        let last = group.last()?.value();
        entries.push(ListEntry {
            pattern: group.key().pattern(style),
            padding: group.key().padding(),
            count: group.len(),
            first,
            last,
            ranges: group.range_summary(),
            missing: (last - first) - (group.len() as u64 - 1),
        });
    }

    if a.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for e in &entries {
        let noun = if e.count == 1 { "item" } else { "items" };
        println!("{}  {}  ({} {noun})", e.pattern, e.ranges, e.count);
    }
    for path in catalog.unmatched() {
        tracing::debug!(path = %path, "not part of a sequence");
    }
    Ok(())
}

#[derive(Serialize)]
struct InfoReport<'a> {
    sequence: String,
    count: usize,
    ranges: String,
    first: &'a SequenceItem,
    middle: &'a SequenceItem,
    last: &'a SequenceItem,
    next: Option<&'a SequenceItem>,
    previous: Option<&'a SequenceItem>,
    gaps: Vec<u64>,
}

fn info(a: InfoArgs) -> Result<()> {
    let (dir, item) = locate(&a.item, a.dir);
    let catalog = Catalog::build(fs::scan_dir(&dir, false)?);
    let group = find_group(&catalog, &item, &dir)?;

    // A pattern has no position of its own, so next/previous only apply to items.
    let current = if parse_pattern(&item).is_ok() {
        None
    } else {
        parse_item(&item).ok()
    };

    let report = InfoReport {
        sequence: group.key().to_string(),
        count: group.len(),
        ranges: group.range_summary(),
        first: group.first()?,
        middle: group.middle()?,
        last: group.last()?,
        next: current.as_ref().and_then(|c| group.next(c)),
        previous: current.as_ref().and_then(|c| group.previous(c)),
        gaps: group.gaps().take(MAX_LISTED_GAPS + 1).collect(),
    };

    if a.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("sequence: {}", report.sequence);
    println!("count:    {}", report.count);
    println!("ranges:   {}", report.ranges);
    println!("first:    {}", report.first);
    println!("middle:   {}", report.middle);
    println!("last:     {}", report.last);
    if current.is_some() {
        let or_none = |i: Option<&SequenceItem>| i.map_or("-".to_string(), |i| i.to_string());
        println!("next:     {}", or_none(report.next));
        println!("previous: {}", or_none(report.previous));
    }
    let mut gaps: Vec<String> = report
        .gaps
        .iter()
        .take(MAX_LISTED_GAPS)
        .map(u64::to_string)
        .collect();
    if report.gaps.len() > MAX_LISTED_GAPS {
        gaps.push("...".to_string());
    }
    println!(
        "gaps:     {}",
        if gaps.is_empty() { "-".to_string() } else { gaps.join(", ") }
    );
    Ok(())
}

fn rename(a: RenameArgs) -> Result<()> {
    let (dir, item) = locate(&a.item, a.dir);
    let catalog = Catalog::build(fs::scan_dir(&dir, false)?);
    let group = find_group(&catalog, &item, &dir)?;

    let mut target = RenameTarget::default();
    if let Some(prefix) = a.prefix {
        let prefix = if Path::new(&prefix).is_absolute() {
            prefix
        } else {
            fs::join_path(&dir, &prefix)
        };
        target = target.with_prefix(prefix);
    }
    if let Some(suffix) = a.suffix {
        target = target.with_suffix(suffix);
    }
    if let Some(start) = a.start {
        target = target.with_start(start);
    }
    if let Some(width) = a.padding {
        target = target.with_padding(Padding::from_width(width));
    }

    let plan = catalog.plan_rename(group, &target)?;
    if plan.is_noop() {
        tracing::info!(sequence = %plan.source, "nothing to rename");
    }

    let report = fs::execute_plan(
        &plan,
        ExecuteOptions {
            dry_run: a.dry_run,
            overwrite: a.overwrite,
        },
    )?;

    if a.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for o in &report.outcomes {
        match o.status {
            RenameStatus::Renamed => println!("{} -> {}", o.from, o.to),
            RenameStatus::DryRun => println!("{} -> {} (dry run)", o.from, o.to),
            RenameStatus::Unchanged => {}
        }
    }
    Ok(())
}
