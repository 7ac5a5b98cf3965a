//! Upload command implementation.

use super::build_with_progress;
use crate::cli::UploadArgs;
use crate::error::add_pack_context;
use crate::output::OutputFormatter;
use crate::output::UploadSummary;
use anyhow::Result;
use fnpack_core::DirectorySink;
use fnpack_core::UploadTarget;
use fnpack_core::api::is_prebuilt_archive;
use fnpack_core::load_archive;
use fnpack_core::upload_artifact;

pub fn execute(args: &UploadArgs, formatter: &dyn OutputFormatter, quiet: bool) -> Result<()> {
    let sink = DirectorySink::new(&args.store).with_versioning(args.versioned);
    let target = UploadTarget::new(&args.bucket, &args.key);

    let summary = if is_prebuilt_archive(&args.source.src) {
        let mut loaded = add_pack_context(load_archive(&args.source.src))?;
        let size = loaded.size;
        let version = add_pack_context(upload_artifact(&mut loaded.file, &sink, &target))?;
        UploadSummary {
            target: target.to_string(),
            version,
            size,
            report: None,
        }
    } else {
        let config = add_pack_context(args.source.pack_config())?;
        let mut artifact =
            add_pack_context(build_with_progress(&args.source.src, config, quiet))?;
        let version = add_pack_context(upload_artifact(&mut artifact, &sink, &target))?;
        UploadSummary {
            target: target.to_string(),
            version,
            size: artifact.size(),
            report: Some(artifact.report().clone()),
        }
    };

    formatter.format_upload_result(&summary)
}
