// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mac App Store build artifacts on the filesystem.
//!
//! This crate knows how to open directory-backed Apple bundles
//! ([DirectoryBundle]) and how to find build artifacts (application
//! bundles, installer packages, provisioning profiles) among an ordered
//! list of candidate locations ([ArtifactLocator]).

mod directory_bundle;
pub use directory_bundle::*;
pub mod locate;
pub use locate::{ArtifactKind, ArtifactLocator, LocateStrategy};

