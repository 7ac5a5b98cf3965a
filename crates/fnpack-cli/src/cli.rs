//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use fnpack_core::PackConfig;
use fnpack_core::SymlinkPolicy;
use fnpack_core::config::DEFAULT_EXCLUDE_FILE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fnpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (per-entry listing)
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
    /// Build a deployment zip from a function source
    Archive(ArchiveArgs),
    /// Validate an existing zip and list its entries
    Inspect(InspectArgs),
    /// Build or load an artifact and store it in a local object store
    Upload(UploadArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

/// Options shared by every command that builds an artifact.
#[derive(clap::Args)]
pub struct SourceArgs {
    /// Function source directory or single file (upload also accepts a
    /// pre-built .zip/.jar)
    #[arg(long, default_value = ".", value_name = "PATH")]
    pub src: PathBuf,

    /// File listing exclude patterns, one per line
    #[arg(long, default_value = DEFAULT_EXCLUDE_FILE, value_name = "FILE")]
    pub exclude_file: PathBuf,

    /// Exclude pattern (wildcard, can be repeated)
    #[arg(long = "exclude", short = 'x', value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Store symbolic links as links instead of following them
    #[arg(long)]
    pub symlink: bool,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,
}

impl SourceArgs {
    /// Builds the packaging configuration: default excludes, then the exclude
    /// file, then `-x` patterns.
    pub fn pack_config(&self) -> fnpack_core::Result<PackConfig> {
        let mut config = PackConfig::default()
            .with_exclude_file(&self.exclude_file)?
            .with_extra_excludes(self.exclude.iter().cloned());

        if self.symlink {
            config = config.with_symlinks(SymlinkPolicy::Preserve);
        }
        if let Some(level) = self.compression_level {
            config = config.with_compression_level(level);
        }

        Ok(config)
    }
}

#[derive(clap::Args)]
pub struct ArchiveArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Destination file path, or - for stdout
    #[arg(long, default_value = "function.zip", value_name = "PATH")]
    pub dest: String,
}

#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the zip archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

#[derive(clap::Args)]
pub struct UploadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Root directory of the object store
    #[arg(long, value_name = "DIR")]
    pub store: PathBuf,

    /// Bucket name
    #[arg(long)]
    pub bucket: String,

    /// Object key
    #[arg(long)]
    pub key: String,

    /// Keep every upload as a numbered version
    #[arg(long)]
    pub versioned: bool,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_defaults() {
        let cli = Cli::try_parse_from(["fnpack", "archive"]).unwrap();
        let Commands::Archive(args) = cli.command else {
            panic!("expected archive command");
        };
        assert_eq!(args.dest, "function.zip");
        assert_eq!(args.source.src, PathBuf::from("."));
        assert_eq!(args.source.exclude_file, PathBuf::from(".lambdaignore"));
        assert!(args.source.exclude.is_empty());
    }

    #[test]
    fn test_repeated_excludes_extend_defaults() {
        let cli = Cli::try_parse_from([
            "fnpack",
            "archive",
            "--exclude-file",
            "/nonexistent/.lambdaignore",
            "-x",
            "*.log",
            "--exclude",
            "tests/*",
            "-l",
            "9",
            "--symlink",
        ])
        .unwrap();
        let Commands::Archive(args) = cli.command else {
            panic!("expected archive command");
        };

        let config = args.source.pack_config().unwrap();
        assert!(config.exclude_patterns.iter().any(|p| p == "function.json"));
        assert!(config.exclude_patterns.ends_with(&["*.log".to_string(), "tests/*".to_string()]));
        assert_eq!(config.compression_level, 9);
        assert_eq!(config.symlinks, SymlinkPolicy::Preserve);
    }

    #[test]
    fn test_compression_level_out_of_range() {
        assert!(Cli::try_parse_from(["fnpack", "archive", "-l", "0"]).is_err());
        assert!(Cli::try_parse_from(["fnpack", "archive", "-l", "10"]).is_err());
    }

    #[test]
    fn test_upload_requires_target() {
        assert!(Cli::try_parse_from(["fnpack", "upload", "--store", "/tmp/s"]).is_err());
        assert!(
            Cli::try_parse_from([
                "fnpack", "upload", "--store", "/tmp/s", "--bucket", "b", "--key", "k"
            ])
            .is_ok()
        );
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
