//! Example: packaging a function directory with fnpack-core
//!
//! Run with: `cargo run --example package_function -- <SRC> [DEST]`

use fnpack_core::ArchiveBuilder;
use fnpack_core::Destination;
use fnpack_core::PackConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let src = args.next().unwrap_or_else(|| ".".to_string());
    let dest = args.next().unwrap_or_else(|| "function.zip".to_string());

    let config = PackConfig::default()
        .with_exclude_file(std::path::Path::new(&src).join(".lambdaignore"))?
        .with_extra_excludes(["*.log", "tests/*"]);

    let mut artifact = ArchiveBuilder::new(config).build(&src)?;

    let report = artifact.report().clone();
    Destination::parse(&dest).write_from(&mut artifact)?;

    eprintln!(
        "{} files, {} excluded, {} bytes ({:.1}x)",
        report.files_added,
        report.files_excluded,
        report.archive_size,
        report.compression_ratio()
    );
    Ok(())
}
