//! Command-line argument parsing

use clap::Parser;

#[derive(Parser)]
#[command(name = "docker-image-promoter")]
#[command(about = "A tool to promote Docker images between registries")]
#[command(version, author)]
pub struct Args {
    /// Configuration file path
    #[arg(
        long = "config",
        short = 'c',
        default_value = "config.yml",
        help = "Path to the image-set configuration file (YAML or JSON)"
    )]
    pub config: String,

    /// Image-set to promote
    #[arg(
        long = "set",
        short = 's',
        help = "Run the workload against the specified image-set"
    )]
    pub set: Option<String>,

    /// Source tag
    #[arg(
        long = "source",
        help = "Source tag to identify or pull before processing"
    )]
    pub source: Option<String>,

    /// Destination tag
    #[arg(long = "destination", help = "Destination tag to push to")]
    pub destination: Option<String>,

    /// Dry-run mode
    #[arg(
        long = "dry-run",
        short = 'n',
        help = "Do not perform any actions, just report the expected actions"
    )]
    pub dry_run: bool,

    /// Stop at the first failed Docker API call
    #[arg(long = "exit-on-fail", help = "Exit on failure of any Docker API call")]
    pub exit_on_fail: bool,

    /// Force the pull stage while in dry-run mode
    #[arg(
        long = "pull",
        help = "In the cases where dry-run is enabled, also run the pull action"
    )]
    pub pull: bool,

    /// Force the retag stage while in dry-run mode
    #[arg(
        long = "retag",
        help = "In the cases where dry-run is enabled, also run the retag action"
    )]
    pub retag: bool,

    /// Force the diff stage while in dry-run mode
    #[arg(
        long = "diff",
        help = "In the cases where dry-run is enabled, also run the diff action"
    )]
    pub diff: bool,

    /// Force the push stage while in dry-run mode
    #[arg(
        long = "push",
        help = "In the cases where dry-run is enabled, also run the push action"
    )]
    pub push: bool,

    /// Directory for diff report files
    #[arg(
        long = "report-dir",
        default_value = ".",
        help = "Directory the container-diff reports are written to"
    )]
    pub report_dir: String,

    /// Verbose output
    #[arg(long = "verbose", short = 'v', help = "Enable verbose output")]
    pub verbose: bool,

    /// Quiet output
    #[arg(long = "quiet", short = 'q', help = "Suppress non-error output")]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }
}
