// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Verifying a Mac App Store build end to end.

use {
    crate::{
        artifacts::{
            mas_package_locator, payload_app_locator, recorded_app_locator, try_locate_or_warn,
            unpacked_app_locator,
        },
        error::MasVerifyError,
        report::VerificationReport,
        rules::MasChecklist,
        settings::{MasSettings, SCRATCH_DIR_NAME},
        tools::SigningTools,
    },
    log::warn,
    mas_bundles::DirectoryBundle,
    std::path::{Path, PathBuf},
    tempfile::TempDir,
};

/// The artifacts a verification run inspects.
///
/// When the app had to be expanded out of an installer package, the scratch
/// directory holding it lives as long as this value.
#[derive(Debug)]
pub struct MasTargets {
    pub app: PathBuf,
    pub package: Option<PathBuf>,
    scratch: Option<TempDir>,
}

impl MasTargets {
    /// Find the app bundle and installer package to verify.
    ///
    /// Sources, in order: the app recorded in `.mas-app-path`; the app inside
    /// the recorded or first found installer package; the first app in the
    /// packaging output directories.
    pub fn resolve(
        settings: &MasSettings,
        tools: &dyn SigningTools,
    ) -> Result<Self, MasVerifyError> {
        if let Some(app) = try_locate_or_warn(&recorded_app_locator(settings)) {
            return Ok(Self {
                app,
                package: None,
                scratch: None,
            });
        }

        let package = try_locate_or_warn(&mas_package_locator(settings));

        let mut scratch = None;
        let mut app = None;

        if let Some(package) = &package {
            println!(
                "Extracting app from {} for verification",
                file_name(package)
            );

            match expand_package(settings, tools, package) {
                Ok((dir, payload_app)) => {
                    app = payload_app;
                    scratch = Some(dir);
                }
                Err(e) => {
                    warn!(
                        "could not extract app from {}: {}; trying output directories instead",
                        package.display(),
                        e
                    );
                }
            }
        }

        if app.is_none() {
            app = try_locate_or_warn(&unpacked_app_locator(settings));
        }

        match app {
            Some(app) => Ok(Self {
                app,
                package,
                scratch,
            }),
            None => Err(MasVerifyError::NotFound(
                "could not locate Mac App Store app bundle; run the MAS build first".to_string(),
            )),
        }
    }

    /// Path of the scratch directory, if the app came out of a package.
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(|d| d.path())
    }

    /// Delete the scratch directory now rather than on drop.
    pub fn cleanup(&mut self) -> Result<(), MasVerifyError> {
        if let Some(dir) = self.scratch.take() {
            warn!("removing {}", dir.path().display());
            dir.close()?;
        }

        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Expand `package` into a fresh scratch directory and find the app in its payload.
fn expand_package(
    settings: &MasSettings,
    tools: &dyn SigningTools,
    package: &Path,
) -> Result<(TempDir, Option<PathBuf>), MasVerifyError> {
    let stale = settings.scratch_dir();
    if stale.exists() {
        warn!("removing stale {}", stale.display());
        std::fs::remove_dir_all(&stale)?;
    }

    let scratch = tempfile::Builder::new()
        .prefix(SCRATCH_DIR_NAME)
        .rand_bytes(0)
        .tempdir_in(settings.repo_root())?;

    let expanded = scratch.path().join("pkg-expanded");
    warn!("expanding {} to {}", package.display(), expanded.display());
    tools.expand_installer(package, &expanded)?;

    let app = payload_app_locator(&expanded)
        .try_locate()
        .map_err(MasVerifyError::Bundle)?;

    Ok((scratch, app))
}

fn success_notes() -> Vec<String> {
    [
        "The Mac App Store build is ready for TestFlight upload.",
        "  - Auto-update components are absent",
        "  - Embedded provisioning profile matches the expected identifiers",
        "  - Entitlements match the embedded profile",
        "  - Signed with Mac App Store certificates",
        "  - Universal binary (arm64 + x86_64)",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn failure_hints() -> Vec<String> {
    [
        "The build has problems that will prevent TestFlight installation.",
        "Common causes:",
        "  - Squirrel.framework left in the bundle (check the packaging hook)",
        "  - Missing or outdated embedded.provisionprofile",
        "  - application-identifier missing from entitlements",
        "  - Entitlements that don't match the embedded profile",
        "  - Not a universal binary (TestFlight error 91167)",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Run the Mac App Store checklist against the current build.
///
/// Locating the build is the only fatal step. Rule failures are recorded in
/// the returned report.
pub fn verify_mas(
    settings: &MasSettings,
    tools: &dyn SigningTools,
) -> Result<VerificationReport, MasVerifyError> {
    let mut targets = MasTargets::resolve(settings, tools)?;

    println!("Verifying Mac App Store build");
    println!("   App: {}", file_name(&targets.app));
    if let Some(package) = &targets.package {
        println!("   PKG: {}", file_name(package));
    }
    println!();

    let bundle = DirectoryBundle::new_from_path(&targets.app).map_err(|e| {
        MasVerifyError::NotFound(format!(
            "{} is not a usable app bundle: {}",
            targets.app.display(),
            e
        ))
    })?;

    let mut report = MasChecklist::new(settings, tools).evaluate(&bundle, targets.package.as_deref());
    if let Err(e) = targets.cleanup() {
        warn!("could not remove {}: {}", SCRATCH_DIR_NAME, e);
    }

    report.success_notes = success_notes();
    report.failure_hints = failure_hints();

    Ok(report)
}
