//! releases
//!
//! Release-branch lifecycle classification.
//!
//! # Architecture
//!
//! The `ReleaseSource` trait abstracts the upstream release service.
//! Commands build a [`PhpNetSource`] and hand it to [`fetch_and_classify`];
//! tests use [`mock::MockReleaseSource`].
//!
//! # Modules
//!
//! - `traits`: `ReleaseSource` trait, release state types, `ReleaseError`
//! - `version`: loose version coercion and range constraints
//! - `classify`: bucket branches by state
//! - `php_net`: php.net HTTP implementation
//! - [`mock`]: in-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use ci_actions::releases::{fetch_and_classify, ClassifyOptions, PhpNetSource};
//!
//! let source = PhpNetSource::new("https://www.php.net", std::time::Duration::from_secs(30))?;
//! let result = fetch_and_classify(&source, &ClassifyOptions::new(verbosity)).await?;
//! println!("stable: {:?}", result.stable.major);
//! ```

mod classify;
pub mod mock;
mod php_net;
mod traits;
mod version;

pub use classify::{
    classify, fetch_and_classify, Bucket, ClassificationResult, ClassifyOptions,
    ABSOLUTE_MINIMUM_VERSION,
};
pub use php_net::{PhpNetSource, DEFAULT_API_BASE, DEFAULT_TIMEOUT};
pub use traits::*;
pub use version::{coerce, VersionConstraint};
