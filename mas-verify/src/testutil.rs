// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixtures shared by unit tests.

use {
    crate::{error::MasVerifyError, tools::SigningTools},
    anyhow::Result,
    std::path::{Path, PathBuf},
};

pub const TEAM_ID: &str = "T6YG6KXA9D";
pub const APP_ID: &str = "T6YG6KXA9D.com.nexuscountdown";
pub const FUTURE_EXPIRATION: &str = "2099-03-14 18:22:11 +0000";
pub const PAST_EXPIRATION: &str = "2001-03-14 18:22:11 +0000";

pub const MAS_APP_AUTHORITY_LINE: &str =
    "3rd Party Mac Developer Application: Adam Parsons (T6YG6KXA9D)";
pub const MAS_INSTALLER_AUTHORITY_LINE: &str =
    "3rd Party Mac Developer Installer: Adam Parsons (T6YG6KXA9D)";

pub const LIPO_UNIVERSAL: &str =
    "Architectures in the fat file: Nexus Countdown are: x86_64 arm64\n";
pub const LIPO_ARM64_ONLY: &str =
    "Non-fat file: Nexus Countdown is architecture: arm64\n";

/// `plutil -p` rendering of a decoded provisioning profile.
pub fn profile_plist_text(app_id: &str, team_id: &str, expiration: &str) -> String {
    format!(
        r#"{{
  "AppIDName" => "Nexus Countdown"
  "CreationDate" => 2024-03-14 18:22:11 +0000
  "Entitlements" => {{
    "application-identifier" => "{app_id}"
    "com.apple.developer.team-identifier" => "{team_id}"
    "keychain-access-groups" => [
      0 => "{team_id}.*"
    ]
  }}
  "ExpirationDate" => {expiration}
  "Name" => "Nexus Countdown Mac App Store"
  "Platform" => [
    0 => "OSX"
  ]
  "TeamIdentifier" => [
    0 => "{team_id}"
  ]
  "TeamName" => "Adam Parsons"
  "Version" => 1
}}
"#,
        app_id = app_id,
        team_id = team_id,
        expiration = expiration
    )
}

/// `plutil -p` rendering of bundle entitlements.
pub fn entitlements_plist_text(app_id: &str, team_id: &str, sandbox: bool) -> String {
    format!(
        r#"{{
  "com.apple.application-identifier" => "{app_id}"
  "com.apple.developer.team-identifier" => "{team_id}"
  "com.apple.security.app-sandbox" => {sandbox}
  "com.apple.security.network.client" => true
}}
"#,
        app_id = app_id,
        team_id = team_id,
        sandbox = sandbox
    )
}

/// `codesign -dv --verbose=4` output with the given leaf authority.
pub fn codesign_details_text(leaf_authority: &str) -> String {
    format!(
        "Executable=/build/Nexus Countdown.app/Contents/MacOS/Nexus Countdown\n\
         Identifier=com.nexuscountdown\n\
         Format=app bundle with Mach-O universal (x86_64 arm64)\n\
         CodeDirectory v=20500 size=1226 flags=0x10000(runtime) hashes=27+7 location=embedded\n\
         Signature size=4797\n\
         Authority={}\n\
         Authority=Apple Worldwide Developer Relations Certification Authority\n\
         Authority=Apple Root CA\n\
         Signed Time=Mar 14, 2025 at 6:22:11 PM\n\
         TeamIdentifier=T6YG6KXA9D\n",
        leaf_authority
    )
}

/// `pkgutil --check-signature` output with the given leaf certificate.
pub fn installer_signature_text(leaf: &str) -> String {
    format!(
        "Package \"Nexus Countdown-1.0.0.pkg\":\n   \
         Status: signed by a certificate trusted by macOS\n   \
         Certificate Chain:\n    \
         1. {}\n       \
         Expires: 2026-03-14 18:22:11 +0000\n    \
         2. Apple Worldwide Developer Relations Certification Authority\n    \
         3. Apple Root CA\n",
        leaf
    )
}

/// In-memory [SigningTools] returning canned output.
///
/// `decode_cms` and `code_signature_entitlements` hand back the configured
/// text as bytes and `plist_to_text` echoes its input, so the canned text is
/// what the extractors see. A `None` field makes that tool fail.
#[derive(Clone, Debug, Default)]
pub struct FakeSigningTools {
    pub profile: Option<String>,
    pub entitlements: Option<String>,
    pub codesign_details: Option<String>,
    pub installer_signature: Option<String>,
    pub lipo: Option<String>,
    /// Name of the `.app` `expand_installer` materializes under `Payload/`.
    pub payload_app: Option<String>,
}

impl FakeSigningTools {
    /// Tools reporting a correctly signed universal MAS build.
    pub fn passing() -> Self {
        Self {
            profile: Some(profile_plist_text(APP_ID, TEAM_ID, FUTURE_EXPIRATION)),
            entitlements: Some(entitlements_plist_text(APP_ID, TEAM_ID, true)),
            codesign_details: Some(codesign_details_text(MAS_APP_AUTHORITY_LINE)),
            installer_signature: Some(installer_signature_text(MAS_INSTALLER_AUTHORITY_LINE)),
            lipo: Some(LIPO_UNIVERSAL.to_string()),
            payload_app: Some("Nexus Countdown.app".to_string()),
        }
    }

    fn canned(program: &str, value: &Option<String>) -> Result<String, MasVerifyError> {
        value
            .clone()
            .ok_or_else(|| MasVerifyError::tool(program, "exit status: 1"))
    }
}

impl SigningTools for FakeSigningTools {
    fn decode_cms(&self, _path: &Path) -> Result<Vec<u8>, MasVerifyError> {
        Ok(Self::canned("security", &self.profile)?.into_bytes())
    }

    fn plist_to_text(&self, data: &[u8]) -> Result<String, MasVerifyError> {
        Ok(String::from_utf8_lossy(data).to_string())
    }

    fn code_signature_entitlements(&self, _path: &Path) -> Result<Vec<u8>, MasVerifyError> {
        Ok(Self::canned("codesign", &self.entitlements)?.into_bytes())
    }

    fn code_signature_details(&self, _path: &Path) -> Result<String, MasVerifyError> {
        Self::canned("codesign", &self.codesign_details)
    }

    fn installer_signature(&self, _path: &Path) -> Result<String, MasVerifyError> {
        Self::canned("pkgutil", &self.installer_signature)
    }

    fn expand_installer(&self, _path: &Path, dest: &Path) -> Result<(), MasVerifyError> {
        let name = Self::canned("pkgutil", &self.payload_app)?;
        create_app_bundle(&dest.join("Payload"), &name, "Nexus Countdown")
            .map_err(|e| MasVerifyError::tool("pkgutil", e))?;

        Ok(())
    }

    fn architectures(&self, _path: &Path) -> Result<String, MasVerifyError> {
        Self::canned("lipo", &self.lipo)
    }
}

/// Create a minimal signed-looking app bundle under `parent`.
///
/// The bundle has an `Info.plist` declaring `executable`, the executable
/// itself and an embedded provisioning profile.
pub fn create_app_bundle(parent: &Path, name: &str, executable: &str) -> Result<PathBuf> {
    let root = parent.join(name);
    let contents = root.join("Contents");
    let macos = contents.join("MacOS");
    std::fs::create_dir_all(&macos)?;

    let mut dict = plist::Dictionary::new();
    dict.insert("CFBundleExecutable".into(), executable.into());
    dict.insert("CFBundleIdentifier".into(), "com.nexuscountdown".into());
    plist::Value::from(dict).to_file_xml(contents.join("Info.plist"))?;

    std::fs::write(macos.join(executable), b"\xca\xfe\xba\xbe")?;
    std::fs::write(contents.join("embedded.provisionprofile"), b"profile")?;

    Ok(root)
}

pub fn temp_dir() -> Result<(tempfile::TempDir, PathBuf)> {
    let td = tempfile::Builder::new().prefix("mas-verify-").tempdir()?;
    let path = td.path().to_path_buf();

    Ok((td, path))
}
