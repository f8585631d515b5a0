// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extracting signing metadata from tool output.
//!
//! The functions here operate on text as printed by `plutil -p`,
//! `codesign -dv`, `pkgutil --check-signature` and `lipo -info`. Fields that
//! can't be found are `None` rather than errors so that a verification run can
//! report every problem at once.

use {
    crate::{error::MasVerifyError, tools::SigningTools},
    chrono::{DateTime, NaiveDate, TimeZone, Utc},
    once_cell::sync::Lazy,
    regex::Regex,
    std::path::Path,
};

/// Placeholder printed for fields that couldn't be extracted.
pub const MISSING: &str = "MISSING";

/// Render an optional field, substituting [MISSING].
pub fn display_field(value: Option<&str>) -> &str {
    value.unwrap_or(MISSING)
}

static PROFILE_APPLICATION_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)Entitlements.*?application-identifier.*?=>?\s*"([^"]+)""#).unwrap()
});

static PROFILE_TEAM_IDENTIFIER_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"TeamIdentifier.*?=>\s*\[\s*0\s*=>\s*"([^"]+)""#).unwrap());

static TEAM_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"team-identifier.*?=>?\s*"([^"]+)""#).unwrap());

static APPLICATION_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"application-identifier.*?=>?\s*"([^"]+)""#).unwrap());

static EXPIRATION_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"ExpirationDate.*?=>\s*([0-9]{4}-[0-9]{2}-[0-9]{2}[^"\n]*)"#).unwrap()
});

static APP_SANDBOX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"com\.apple\.security\.app-sandbox"?\s*=>?\s*(true|1)\b"#).unwrap());

static AUTHORITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^Authority=(.+?)\r?$").unwrap());

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Parse an expiration date as printed by `plutil -p`.
///
/// `plutil` renders dates as `2026-03-14 18:22:11 +0000`. RFC 3339 and bare
/// `YYYY-MM-DD` dates (taken as midnight UTC) are accepted too.
pub fn parse_expiration_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value.get(0..10)?, "%Y-%m-%d").ok()?;

    Utc.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single()
}

/// Fields of interest in a decoded provisioning profile.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProfileMetadata {
    /// `application-identifier` from the profile's `Entitlements` dictionary.
    pub application_identifier: Option<String>,
    /// First `TeamIdentifier` entry, or an entitlements `team-identifier`.
    pub team_identifier: Option<String>,
    /// `ExpirationDate` as printed.
    pub expiration_date: Option<String>,
    /// The `plutil -p` text the fields were extracted from.
    pub raw: String,
}

impl ProfileMetadata {
    pub fn from_plist_text(text: &str) -> Self {
        let team_identifier = capture(&PROFILE_TEAM_IDENTIFIER_ARRAY, text)
            .or_else(|| capture(&TEAM_IDENTIFIER, text));

        Self {
            application_identifier: capture(&PROFILE_APPLICATION_IDENTIFIER, text),
            team_identifier,
            expiration_date: capture(&EXPIRATION_DATE, text),
            raw: text.to_string(),
        }
    }

    /// Decode a provisioning profile on disk.
    pub fn from_path(tools: &dyn SigningTools, path: &Path) -> Result<Self, MasVerifyError> {
        let plist = tools.decode_cms(path)?;
        let text = tools.plist_to_text(&plist)?;

        Ok(Self::from_plist_text(&text))
    }

    /// The expiration date as a timestamp, if present and parseable.
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration_date
            .as_deref()
            .and_then(parse_expiration_date)
    }
}

/// Fields of interest in the entitlements of a signed bundle.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EntitlementsMetadata {
    pub application_identifier: Option<String>,
    pub team_identifier: Option<String>,
    /// Whether `com.apple.security.app-sandbox` is true.
    pub app_sandbox: bool,
    pub raw: String,
}

impl EntitlementsMetadata {
    pub fn from_plist_text(text: &str) -> Self {
        Self {
            application_identifier: capture(&APPLICATION_IDENTIFIER, text),
            team_identifier: capture(&TEAM_IDENTIFIER, text),
            app_sandbox: APP_SANDBOX.is_match(text),
            raw: text.to_string(),
        }
    }

    /// Read the entitlements embedded in a signed bundle.
    pub fn from_path(tools: &dyn SigningTools, path: &Path) -> Result<Self, MasVerifyError> {
        let plist = tools.code_signature_entitlements(path)?;
        let text = tools.plist_to_text(&plist)?;

        Ok(Self::from_plist_text(&text))
    }
}

/// Signing authorities reported for a code signature or package signature.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SignatureDetails {
    /// `Authority=` values, leaf first.
    pub authorities: Vec<String>,
    pub raw: String,
}

impl SignatureDetails {
    /// Parse `codesign -dv --verbose=4` output.
    pub fn from_codesign_text(text: &str) -> Self {
        Self {
            authorities: AUTHORITY
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .collect(),
            raw: text.to_string(),
        }
    }

    /// Whether any authority starts with `prefix`.
    pub fn has_authority(&self, prefix: &str) -> bool {
        self.authorities.iter().any(|a| a.starts_with(prefix))
    }

    /// The leaf signing authority.
    pub fn leaf_authority(&self) -> Option<&str> {
        self.authorities.first().map(|s| s.as_str())
    }
}

/// Whether `pkgutil --check-signature` output mentions the given authority.
///
/// `pkgutil` prints the certificate chain as numbered lines (`1. 3rd Party Mac
/// Developer Installer: ...`) so a substring match is all that is available.
pub fn installer_signed_by(text: &str, authority: &str) -> bool {
    text.contains(authority)
}

/// Architectures of a Mach-O binary as reported by `lipo -info`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ArchitectureList {
    pub architectures: Vec<String>,
    pub raw: String,
}

/// Architecture families a universal binary must contain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArchitectureFamily {
    Arm64,
    Intel,
}

impl std::fmt::Display for ArchitectureFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Arm64 => "arm64",
            Self::Intel => "x86_64",
        })
    }
}

impl ArchitectureList {
    /// Parse `lipo -info` output.
    ///
    /// Handles both `Architectures in the fat file: <path> are: x86_64 arm64`
    /// and `Non-fat file: <path> is architecture: arm64`. The architecture list
    /// follows the final colon, so colons inside the path are harmless.
    pub fn from_lipo_text(text: &str) -> Self {
        let architectures = text
            .lines()
            .filter_map(|line| line.rsplit_once(':'))
            .flat_map(|(_, archs)| archs.split_whitespace())
            .map(|s| s.to_string())
            .collect();

        Self {
            architectures,
            raw: text.to_string(),
        }
    }

    pub fn contains(&self, family: ArchitectureFamily) -> bool {
        self.architectures.iter().any(|arch| match family {
            ArchitectureFamily::Arm64 => arch.starts_with("arm64"),
            ArchitectureFamily::Intel => arch.starts_with("x86_64") || arch == "i386",
        })
    }

    /// Families a universal binary needs that are absent.
    pub fn missing_families(&self) -> Vec<ArchitectureFamily> {
        [ArchitectureFamily::Arm64, ArchitectureFamily::Intel]
            .into_iter()
            .filter(|family| !self.contains(*family))
            .collect()
    }
}
