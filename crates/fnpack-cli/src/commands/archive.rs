//! Archive command implementation.

use super::build_with_progress;
use crate::cli::ArchiveArgs;
use crate::error::add_pack_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use fnpack_core::Destination;
use fnpack_core::api::is_prebuilt_archive;

pub fn execute(args: &ArchiveArgs, formatter: &dyn OutputFormatter, quiet: bool) -> Result<()> {
    let config = add_pack_context(args.source.pack_config())?;

    if is_prebuilt_archive(&args.source.src) {
        formatter.format_warning(&format!(
            "{} is already an archive; it will be wrapped as a single entry. \
             Use `fnpack upload` to ship it unchanged.",
            args.source.src.display()
        ));
    }

    let mut artifact = add_pack_context(build_with_progress(&args.source.src, config, quiet))?;
    let report = artifact.report().clone();

    let destination = Destination::parse(&args.dest);
    add_pack_context(destination.write_from(&mut artifact))?;

    formatter.format_archive_result(&destination, &report)
}
