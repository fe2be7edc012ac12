//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_complete::Shell;
use filearc_core::CompressionKind;
use filearc_core::ContainerFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filearc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an archive from a file or directory
    Create(CreateArgs),
    /// List archive contents without extraction
    List(ListArgs),
    /// Extract archive contents
    Extract(ExtractArgs),
    /// Write one archived file to stdout
    Cat(CatArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

impl Commands {
    /// Operation name used in JSON output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::List(_) => "list",
            Self::Extract(_) => "extract",
            Self::Cat(_) => "cat",
            Self::Completion(_) => "completion",
        }
    }
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Output archive file path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Source file or directory to archive
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Append to an existing uncompressed tar archive
    #[arg(short, long)]
    pub append: bool,

    /// Compression layer (default: from the output extension)
    #[arg(short, long, value_enum)]
    pub compression: Option<CompressionArg>,

    /// Container format (default: from the output extension)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Store the source directory name as the top-level entry
    #[arg(long)]
    pub include_source_dir: bool,

    /// Only archive this path and its ancestors and descendants (repeatable)
    #[arg(long = "filter", value_name = "PATH")]
    pub filters: Vec<String>,

    /// Compression level (0-9, 0 stores zip entries uncompressed)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub compression_level: Option<u8>,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show detailed entry information
    #[arg(short, long)]
    pub long: bool,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write every file directly into the output directory
    #[arg(long)]
    pub flat: bool,

    /// Keep existing files instead of overwriting them
    #[arg(long)]
    pub no_override: bool,

    /// Only extract entries under this archive path, stripping it
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Only extract this path and its ancestors and descendants (repeatable)
    #[arg(long = "filter", value_name = "PATH")]
    pub filters: Vec<String>,
}

#[derive(clap::Args)]
pub struct CatArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Entry name inside the archive
    #[arg(value_name = "ENTRY")]
    pub entry: String,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    None,
    Gzip,
    Bzip2,
}

impl From<CompressionArg> for CompressionKind {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::None => Self::Uncompressed,
            CompressionArg::Gzip => Self::Gzip,
            CompressionArg::Bzip2 => Self::Bzip2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Tar,
    Zip,
}

impl From<FormatArg> for ContainerFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Tar => Self::Tar,
            FormatArg::Zip => Self::Zip,
        }
    }
}
