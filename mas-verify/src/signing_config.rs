// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inspecting the packaging tool's signing configuration.

use {
    crate::{error::MasVerifyError, settings::MasSettings},
    serde::Deserialize,
    std::path::Path,
};

const NOT_SET: &str = "(not set)";

/// The parts of `package.json` relevant to signing.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct PackageManifest {
    #[serde(default)]
    pub build: BuildConfig,
}

/// The packaging tool's `build` section.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub app_id: Option<String>,
    pub product_name: Option<String>,
    pub mac: Option<TargetSigning>,
    pub mas: Option<TargetSigning>,
}

/// Signing settings of a single packaging target.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetSigning {
    pub identity: Option<String>,
    pub force_code_signing: Option<bool>,
}

impl PackageManifest {
    pub fn from_path(path: &Path) -> Result<Self, MasVerifyError> {
        if !path.is_file() {
            return Err(MasVerifyError::NotFound(format!(
                "could not find packaging config at {}",
                path.display()
            )));
        }

        let data = std::fs::read(path)?;

        Ok(serde_json::from_slice(&data)?)
    }

    fn mac_identity(&self) -> Option<&str> {
        self.build.mac.as_ref().and_then(|t| t.identity.as_deref())
    }

    fn mas_identity(&self) -> Option<&str> {
        self.build.mas.as_ref().and_then(|t| t.identity.as_deref())
    }

    /// Render the configuration and how it compares with `settings`.
    ///
    /// Only `mas.identity` is required to match; the `mac` target may take
    /// its identity from the environment.
    pub fn describe(&self, settings: &MasSettings) -> Vec<String> {
        let value = |v: Option<&str>| v.unwrap_or(NOT_SET).to_string();

        let mut lines = vec![
            "=== Signing Configuration ===".to_string(),
            format!("appId: {}", value(self.build.app_id.as_deref())),
            format!("productName: {}", value(self.build.product_name.as_deref())),
            String::new(),
            format!("mac.identity: {}", value(self.mac_identity())),
            format!(
                "mac.forceCodeSigning: {}",
                self.build
                    .mac
                    .as_ref()
                    .and_then(|t| t.force_code_signing)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| NOT_SET.to_string())
            ),
            String::new(),
            format!("mas.identity: {}", value(self.mas_identity())),
            "mas team: set via ELECTRON_TEAM_ID in the build environment".to_string(),
            String::new(),
        ];

        let expected = settings.signing_identity.as_str();

        if self.mas_identity() == Some(expected) {
            lines.push("mas.identity matches the expected identity".to_string());
        } else {
            lines.push(format!(
                "mas.identity does not match the expected identity ({})",
                expected
            ));
        }

        if self.mac_identity() != Some(expected) {
            lines.push(
                "warning: mac.identity does not match the expected identity (may be OK if set via environment)"
                    .to_string(),
            );
        }

        lines
    }

    /// Whether the Mac App Store target signs with the expected identity.
    pub fn mas_identity_matches(&self, settings: &MasSettings) -> bool {
        self.mas_identity() == Some(settings.signing_identity.as_str())
    }
}
