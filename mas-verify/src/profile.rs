// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Finding and validating the source provisioning profile.
//!
//! The profile in `cert/` is copied into the app bundle as
//! `embedded.provisionprofile` during the MAS build. Only the source file is
//! considered here.

use {
    crate::{
        error::MasVerifyError, extract::ProfileMetadata, settings::MasSettings,
        tools::SigningTools,
    },
    log::debug,
    mas_bundles::{locate::CandidatePaths, ArtifactKind, ArtifactLocator},
    std::path::PathBuf,
};

/// Locate the source provisioning profile and check it is for this app.
///
/// Returns the absolute path of a valid profile. The application identifier
/// must be present and match; a team identifier is only compared when the
/// profile carries one.
pub fn detect_profile(
    settings: &MasSettings,
    tools: &dyn SigningTools,
) -> Result<PathBuf, MasVerifyError> {
    let cert_dir = settings.cert_dir();

    let path = ArtifactLocator::new("provisioning profile", ArtifactKind::File)
        .with_strategy(CandidatePaths::new([cert_dir.join(&settings.profile_file_name)]))
        .try_locate()
        .map_err(MasVerifyError::Bundle)?
        .ok_or_else(|| {
            MasVerifyError::NotFound(format!(
                "provisioning profile {} not found in {} (embedded.provisionprofile is generated from it during the build)",
                settings.profile_file_name,
                cert_dir.display()
            ))
        })?;

    let path = std::fs::canonicalize(&path)?;
    debug!("validating {}", path.display());

    let profile = ProfileMetadata::from_path(tools, &path).map_err(|e| match e {
        MasVerifyError::ExternalTool { program, message } => MasVerifyError::ExternalTool {
            program,
            message: format!("{} (profile {})", message, path.display()),
        },
        e => e,
    })?;

    let expected = settings.expected_application_identifier();
    match profile.application_identifier {
        None => {
            return Err(MasVerifyError::ParseFailure {
                field: "application-identifier",
                path,
            })
        }
        Some(found) if found != expected => {
            return Err(MasVerifyError::Mismatch {
                what: "application-identifier",
                expected,
                found,
                path,
            })
        }
        Some(_) => {}
    }

    if let Some(found) = profile.team_identifier {
        if found != settings.team_id {
            return Err(MasVerifyError::Mismatch {
                what: "team-identifier",
                expected: settings.team_id.clone(),
                found,
                path,
            });
        }
    }

    Ok(path)
}
