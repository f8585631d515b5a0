// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Where release artifacts are found in the repository.

use {
    crate::{error::MasVerifyError, settings::MasSettings},
    log::warn,
    mas_bundles::{
        locate::{CandidatePaths, FirstEntryInDirectories, MarkerFile, RecursiveSearch},
        ArtifactKind, ArtifactLocator,
    },
    std::path::{Component, Path, PathBuf},
};

/// Output directories under `dist` that may hold a Mac App Store app bundle.
const APP_OUTPUT_DIRS: &[&str] = &["mas", "mac", "mac-universal", "mas-arm64", "mas-x64"];

/// How many levels below `dist` the recursive app search descends.
const APP_SEARCH_DEPTH: usize = 3;

/// Rank a found app bundle: `mas` output first, then `mac`, then anything else.
fn output_dir_priority(dist: &Path, path: &Path) -> u32 {
    let relative = path.strip_prefix(dist).unwrap_or(path);
    let has_component = |name: &str| {
        relative
            .components()
            .any(|c| matches!(c, Component::Normal(s) if s == name))
    };

    if has_component("mas") {
        0
    } else if has_component("mac") {
        1
    } else {
        2
    }
}

/// Locator for the app bundle produced by the MAS build.
pub fn mas_app_locator(settings: &MasSettings) -> ArtifactLocator {
    let dist = settings.dist_dir();
    let app_name = settings.app_bundle_name();

    let priority_root = dist.clone();

    ArtifactLocator::new(
        format!("Mac App Store app bundle \"{}\"", app_name),
        ArtifactKind::app_bundle(),
    )
    .with_strategy(CandidatePaths::new(
        APP_OUTPUT_DIRS.iter().map(|dir| dist.join(dir).join(&app_name)),
    ))
    .with_strategy(
        RecursiveSearch::new(&dist, &app_name, APP_SEARCH_DEPTH)
            .with_priority(move |p| output_dir_priority(&priority_root, p)),
    )
}

/// Print-ready absolute path of the MAS app bundle.
///
/// The `dist` directory must exist and the bundle must have an `Info.plist`.
pub fn locate_app(settings: &MasSettings) -> Result<PathBuf, MasVerifyError> {
    let dist = settings.dist_dir();
    if !dist.is_dir() {
        return Err(MasVerifyError::NotFound(format!(
            "dist directory not found at {}",
            dist.display()
        )));
    }

    let app = mas_app_locator(settings).locate().map_err(|e| {
        MasVerifyError::NotFound(format!("{}; run the MAS build first", e))
    })?;

    if !app.join("Contents").join("Info.plist").is_file() {
        return Err(MasVerifyError::NotFound(format!(
            "found app bundle but it is missing Contents/Info.plist: {}",
            app.display()
        )));
    }

    Ok(std::fs::canonicalize(&app)?)
}

/// Locator for an app bundle recorded by the last MAS build.
pub fn recorded_app_locator(settings: &MasSettings) -> ArtifactLocator {
    ArtifactLocator::new("recorded Mac App Store app bundle", ArtifactKind::app_bundle())
        .with_strategy(MarkerFile::new(settings.app_marker_path()))
}

/// Locator for the MAS installer package.
pub fn mas_package_locator(settings: &MasSettings) -> ArtifactLocator {
    let dist = settings.dist_dir();

    ArtifactLocator::new(
        "Mac App Store installer package",
        ArtifactKind::installer_package(),
    )
    .with_strategy(MarkerFile::new(settings.pkg_marker_path()))
    .with_strategy(FirstEntryInDirectories::new([
        dist.clone(),
        dist.join("mas"),
        settings.repo_root().join("dist").join("mas"),
    ]))
}

/// Locator for an app bundle left in the packaging output directories.
pub fn unpacked_app_locator(settings: &MasSettings) -> ArtifactLocator {
    let dist = settings.dist_dir();

    ArtifactLocator::new("Mac App Store app bundle", ArtifactKind::app_bundle()).with_strategy(
        FirstEntryInDirectories::new(
            ["mas", "mac", "mac-universal", "mac-unpacked"]
                .iter()
                .map(|dir| dist.join(dir)),
        ),
    )
}

/// Locator for the app inside an expanded installer package.
pub fn payload_app_locator(expanded: &Path) -> ArtifactLocator {
    ArtifactLocator::new("app bundle in package payload", ArtifactKind::app_bundle())
        .with_strategy(FirstEntryInDirectories::new([expanded.join("Payload")]))
}

/// Resolve a locator, logging and discarding lookup errors.
///
/// Used where a failed lookup only means falling through to the next source.
pub fn try_locate_or_warn(locator: &ArtifactLocator) -> Option<PathBuf> {
    match locator.try_locate() {
        Ok(found) => found,
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}
