// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Expected identities and repository layout.

use std::path::{Path, PathBuf};

/// Apple developer team that owns the app.
pub const DEFAULT_TEAM_ID: &str = "T6YG6KXA9D";

/// Bundle identifier of the app.
pub const DEFAULT_BUNDLE_ID: &str = "com.nexuscountdown";

/// `productName` from the packaging configuration.
pub const DEFAULT_PRODUCT_NAME: &str = "Nexus Countdown";

/// Signing identity name as written in the packaging configuration.
pub const DEFAULT_SIGNING_IDENTITY: &str = "Adam Parsons (T6YG6KXA9D)";

/// Certificate authority prefix reported for Mac App Store application signatures.
pub const MAS_APPLICATION_AUTHORITY: &str = "3rd Party Mac Developer Application";

/// Certificate authority prefix reported for Mac App Store installer signatures.
pub const MAS_INSTALLER_AUTHORITY: &str = "3rd Party Mac Developer Installer";

/// Source provisioning profile kept in the repository.
pub const DEFAULT_PROFILE_FILE_NAME: &str = "Nexus_Countdown.provisionprofile";

/// Scratch directory used when an app must be expanded out of an installer package.
pub const SCRATCH_DIR_NAME: &str = ".mas-verify-temp";

/// Values verification compares against, plus where the repository lives.
#[derive(Clone, Debug)]
pub struct MasSettings {
    pub repo_root: PathBuf,
    pub team_id: String,
    pub bundle_id: String,
    pub product_name: String,
    pub signing_identity: String,
    pub app_authority: String,
    pub installer_authority: String,
    pub profile_file_name: String,
}

impl MasSettings {
    /// Settings for the Nexus Countdown repository rooted at `repo_root`.
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            team_id: DEFAULT_TEAM_ID.to_string(),
            bundle_id: DEFAULT_BUNDLE_ID.to_string(),
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            signing_identity: DEFAULT_SIGNING_IDENTITY.to_string(),
            app_authority: MAS_APPLICATION_AUTHORITY.to_string(),
            installer_authority: MAS_INSTALLER_AUTHORITY.to_string(),
            profile_file_name: DEFAULT_PROFILE_FILE_NAME.to_string(),
        }
    }

    /// The `<team>.<bundle>` application identifier profiles and entitlements must carry.
    pub fn expected_application_identifier(&self) -> String {
        format!("{}.{}", self.team_id, self.bundle_id)
    }

    /// Directory name of the app bundle, e.g. `Nexus Countdown.app`.
    pub fn app_bundle_name(&self) -> String {
        format!("{}.app", self.product_name)
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// `apps/electron`.
    pub fn electron_dir(&self) -> PathBuf {
        self.repo_root.join("apps").join("electron")
    }

    /// `apps/electron/dist`, where the packaging tool writes its output.
    pub fn dist_dir(&self) -> PathBuf {
        self.electron_dir().join("dist")
    }

    /// `apps/electron/package.json`.
    pub fn package_json_path(&self) -> PathBuf {
        self.electron_dir().join("package.json")
    }

    /// `cert/`, holding the source provisioning profile.
    pub fn cert_dir(&self) -> PathBuf {
        self.repo_root.join("cert")
    }

    /// Marker recording the last built MAS app bundle.
    pub fn app_marker_path(&self) -> PathBuf {
        self.repo_root.join(".mas-app-path")
    }

    /// Marker recording the last built MAS installer package.
    pub fn pkg_marker_path(&self) -> PathBuf {
        self.repo_root.join(".mas-pkg-path")
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.repo_root.join(SCRATCH_DIR_NAME)
    }
}
