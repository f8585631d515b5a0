// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Checking the direct-download build output.

use {
    crate::{
        report::{CheckResult, VerificationReport},
        settings::MasSettings,
    },
    anyhow::{Context, Result},
    mas_bundles::{locate::FirstEntryInDirectories, ArtifactKind, ArtifactLocator},
    std::path::{Path, PathBuf},
};

/// First-level subdirectories of `dist`, sorted.
fn output_dirs(dist: &Path) -> Result<Vec<PathBuf>> {
    if !dist.is_dir() {
        return Ok(vec![]);
    }

    let mut dirs = std::fs::read_dir(dist)
        .with_context(|| format!("reading {}", dist.display()))?
        .map(|entry| Ok(entry?.path()))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect::<Vec<_>>();
    dirs.sort();

    Ok(dirs)
}

/// Check that `dist` holds a complete app bundle and a disk image.
pub fn verify_distribution(settings: &MasSettings) -> Result<VerificationReport> {
    let dist = settings.dist_dir();
    let mut checks = vec![];

    let app = ArtifactLocator::new("app bundle", ArtifactKind::app_bundle())
        .with_strategy(FirstEntryInDirectories::new(output_dirs(&dist)?))
        .try_locate()?;

    let mut app_check = CheckResult::new("App bundle exists");
    match &app {
        Some(app) => app_check.pass(app.display().to_string()),
        None => app_check.fail(
            "No app bundle found",
            vec![format!("Searched subdirectories of {}", dist.display())],
        ),
    }
    checks.push(app_check);

    if let Some(app) = &app {
        let resources = app.join("Contents").join("Resources");
        let asar = resources.join("app.asar");
        let unpacked = resources.join("app");

        let mut asar_check = CheckResult::new("app.asar exists");
        asar_check.require(
            asar.exists(),
            asar.display().to_string(),
            format!("{} missing", asar.display()),
            vec![],
        );
        checks.push(asar_check);

        let mut package_check = CheckResult::new("App package exists (asar or unpacked)");
        package_check.require(
            asar.exists() || unpacked.exists(),
            "App code is packaged",
            "Neither app.asar nor an unpacked app directory is present",
            vec![],
        );
        if !unpacked.exists() && asar.exists() {
            package_check.info("App is packaged as asar; its contents are not inspected");
        }
        checks.push(package_check);

        if unpacked.exists() {
            let index = unpacked.join("web").join("index.html");

            let mut index_check = CheckResult::new("index.html exists in unpacked app");
            index_check.require(
                index.is_file(),
                index.display().to_string(),
                format!("{} missing", index.display()),
                vec![],
            );
            checks.push(index_check);
        }
    }

    let dmg = ArtifactLocator::new("disk image", ArtifactKind::disk_image())
        .with_strategy(FirstEntryInDirectories::new([dist.clone()]))
        .try_locate()?;

    let mut dmg_check = CheckResult::new("DMG file exists");
    match dmg {
        Some(dmg) => dmg_check.pass(format!(
            "Found: {}",
            dmg.file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        )),
        None => dmg_check.fail(format!("No DMG found in {}", dist.display()), vec![]),
    }
    checks.push(dmg_check);

    Ok(VerificationReport {
        checks,
        success_notes: vec![],
        failure_hints: vec!["Run the packaging build first and check its output.".to_string()],
    })
}
