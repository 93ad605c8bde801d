use clap::{Parser, Subcommand, ValueEnum};
use numseq::PatternStyle;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nsq", version, about = "Inspect and rename numbered file sequences")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the sequences among the given paths or in a directory
    List(ListArgs),
    /// Show first/last/middle/next/previous and gaps for one sequence
    Info(InfoArgs),
    /// Renumber, repad or rename a whole sequence on disk
    Rename(RenameArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Paths to group; when empty, the directory is scanned instead
    pub paths: Vec<String>,

    /// Directory to scan (defaults to the current directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Placeholder notation for the sequence pattern
    #[arg(long, value_enum, default_value_t = Style::Hash)]
    pub style: Style,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// A member of the sequence (`frame.0001.exr`) or its pattern (`frame.####.exr`)
    pub item: String,

    /// Directory holding the sequence (defaults to the item's directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct RenameArgs {
    /// A member of the sequence (`frame.0001.exr`) or its pattern (`frame.####.exr`)
    pub item: String,

    /// Directory holding the sequence (defaults to the item's directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// New file name prefix, up to the number; relative prefixes are taken
    /// from the sequence's directory
    #[arg(long)]
    pub prefix: Option<String>,

    /// New suffix after the number
    #[arg(long)]
    pub suffix: Option<String>,

    /// New number for the first item
    #[arg(long)]
    pub start: Option<u64>,

    /// New zero-padding width (0 or 1 for unpadded)
    #[arg(long)]
    pub padding: Option<usize>,

    /// Only show what would be renamed
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Replace existing files that are not part of the sequence
    #[arg(long)]
    pub overwrite: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Style {
    Hash,
    Printf,
    Format,
    Regex,
}

impl From<Style> for PatternStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Hash => PatternStyle::Hash,
            Style::Printf => PatternStyle::Printf,
            Style::Format => PatternStyle::Format,
            Style::Regex => PatternStyle::Regex,
        }
    }
}
