//! Deployment artifact packaging for serverless functions.
//!
//! `fnpack-core` walks a function's source tree, drops paths matching
//! wildcard exclude patterns, and streams the rest into a deflate-compressed
//! zip held in an anonymous temporary file. Pre-built `.zip`/`.jar`
//! artifacts are validated and passed through untouched.
//!
//! # Examples
//!
//! ```no_run
//! use fnpack_core::Destination;
//! use fnpack_core::PackConfig;
//! use fnpack_core::create_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PackConfig::default()
//!     .with_exclude_file("./function/.lambdaignore")?
//!     .with_extra_excludes(["*.log"]);
//! let mut artifact = create_archive("./function", &config)?;
//! Destination::parse("function.zip").write_from(&mut artifact)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod builder;
pub mod cancel;
pub mod config;
pub mod destination;
pub mod error;
pub mod filter;
pub mod loader;
pub mod report;
pub mod upload;
pub mod walker;

#[doc(hidden)]
pub mod test_utils;

pub use api::PreparedArtifact;
pub use api::create_archive;
pub use api::prepare_artifact;
pub use builder::ArchiveBuilder;
pub use builder::Artifact;
pub use cancel::CancelToken;
pub use config::PackConfig;
pub use config::SymlinkPolicy;
pub use destination::Destination;
pub use destination::write_to;
pub use error::PackError;
pub use error::Result;
pub use filter::PathFilter;
pub use loader::LoadedArchive;
pub use loader::load_archive;
pub use report::BuildObserver;
pub use report::BuildReport;
pub use upload::DirectorySink;
pub use upload::UploadSink;
pub use upload::UploadTarget;
pub use upload::upload_artifact;
