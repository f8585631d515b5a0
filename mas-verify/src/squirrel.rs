// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stripping the Squirrel auto-updater from a packaged app before signing.

use {
    crate::error::MasVerifyError,
    log::warn,
    mas_bundles::{locate::find_named_entries, ArtifactKind},
    std::path::{Path, PathBuf},
};

const SEARCH_DEPTH: usize = 10;

/// Remove `Contents/Frameworks/Squirrel.framework`, including the `ShipIt`
/// binary it carries, from `<app_out_dir>/<product_filename>.app`.
///
/// Returns the removed paths. A missing bundle is not an error. Files
/// outside the framework are left alone.
pub fn remove_squirrel(
    app_out_dir: &Path,
    product_filename: &str,
) -> Result<Vec<PathBuf>, MasVerifyError> {
    let bundle = app_out_dir.join(format!("{}.app", product_filename));
    let contents = bundle.join("Contents");

    if !bundle.is_dir() {
        warn!(
            "app bundle {} not found; skipping Squirrel removal",
            bundle.display()
        );
        return Ok(vec![]);
    }

    let mut removed = vec![];

    let framework = contents.join("Frameworks").join("Squirrel.framework");
    if framework.exists() {
        for ship_it in
            find_named_entries(&framework, "ShipIt", &ArtifactKind::File, SEARCH_DEPTH, false)
        {
            warn!("removing {}", ship_it.display());
            std::fs::remove_file(&ship_it)?;
            removed.push(ship_it);
        }

        warn!("removing {}", framework.display());
        std::fs::remove_dir_all(&framework)?;
        removed.push(framework);
    }

    Ok(removed)
}
