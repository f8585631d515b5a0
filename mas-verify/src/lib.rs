// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Release verification for the Nexus Countdown desktop app.

This crate checks Mac App Store build artifacts before they are uploaded:
provisioning profiles, entitlements, code and installer signatures and
binary architectures. Apple's command line tools do the cryptographic work;
they are invoked through [tools::SigningTools] and their textual output is
parsed by the [extract] module.

The [rules] module holds the submission checklist, [report] prints its
results and [verify] ties artifact discovery, the checklist and cleanup
together. The remaining modules implement the smaller release commands
exposed by the `mas-verify` binary plus the [lifecycle] model of the
desktop shell's main window.
*/

pub mod artifacts;
pub mod distribution;
pub mod error;
pub mod extract;
pub mod lifecycle;
pub mod profile;
pub mod report;
pub mod rules;
pub mod settings;
pub mod signing_config;
pub mod squirrel;
#[cfg(test)]
pub(crate) mod testutil;
pub mod tools;
pub mod verify;

pub use error::MasVerifyError;
