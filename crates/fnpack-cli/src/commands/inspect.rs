//! Inspect command implementation.

use crate::cli::InspectArgs;
use crate::error::add_pack_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use fnpack_core::load_archive;

pub fn execute(args: &InspectArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archive = add_pack_context(load_archive(&args.archive))?;
    formatter.format_inspection(&archive)
}
