//! Subcommand implementations.

pub mod archive;
pub mod completion;
pub mod inspect;
pub mod upload;

use crate::progress::CliProgress;
use fnpack_core::ArchiveBuilder;
use fnpack_core::Artifact;
use fnpack_core::PackConfig;
use fnpack_core::report::TracingObserver;
use std::path::Path;

/// Builds `source`, logging through `tracing` and drawing a spinner when
/// stderr is a terminal and output is not quiet.
pub fn build_with_progress(
    source: &Path,
    config: PackConfig,
    quiet: bool,
) -> fnpack_core::Result<Artifact> {
    let builder = ArchiveBuilder::new(config);
    if !quiet && CliProgress::should_show() {
        let mut observer = (TracingObserver, CliProgress::new());
        builder.build_with_observer(source, &mut observer)
    } else {
        builder.build(source)
    }
}
