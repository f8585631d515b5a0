// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bundles backed by a directory.

use {
    crate::locate::{find_named_entries, ArtifactKind},
    anyhow::{anyhow, Context, Result},
    std::path::{Path, PathBuf},
};

/// Filename of the provisioning profile embedded in Mac App Store bundles.
pub const EMBEDDED_PROVISIONING_PROFILE: &str = "embedded.provisionprofile";

/// An Apple bundle backed by a filesystem/directory.
#[derive(Clone, Debug)]
pub struct DirectoryBundle {
    /// Root directory of this bundle.
    root: PathBuf,

    /// Name of the root directory.
    root_name: String,

    /// Whether the bundle is shallow.
    ///
    /// If false, content is in a `Contents/` sub-directory.
    shallow: bool,

    /// Parsed `Info.plist` file.
    info_plist: plist::Dictionary,
}

impl DirectoryBundle {
    /// Open an existing bundle from a filesystem path.
    ///
    /// The specified path should be the root directory of the bundle.
    ///
    /// Validation is limited to locating and parsing an `Info.plist` file,
    /// which is required for all bundle types.
    pub fn new_from_path(directory: &Path) -> Result<Self> {
        if !directory.is_dir() {
            return Err(anyhow!("{} is not a directory", directory.display()));
        }

        let root_name = directory
            .file_name()
            .ok_or_else(|| anyhow!("unable to resolve root directory name"))?
            .to_string_lossy()
            .to_string();

        let contents = directory.join("Contents");
        let shallow = !contents.is_dir();

        let app_plist = if shallow {
            directory.join("Info.plist")
        } else {
            contents.join("Info.plist")
        };

        // Frameworks keep their Info.plist under Resources/ and would otherwise
        // look like shallow bundles.
        let framework_plist = directory.join("Resources").join("Info.plist");

        let info_plist_path = if framework_plist.is_file() {
            framework_plist
        } else if app_plist.is_file() {
            app_plist
        } else {
            return Err(anyhow!(
                "Info.plist not found in {}; not a valid bundle",
                directory.display()
            ));
        };

        let value = plist::Value::from_file(&info_plist_path)
            .with_context(|| format!("parsing {}", info_plist_path.display()))?;
        let info_plist = value
            .into_dictionary()
            .ok_or_else(|| anyhow!("{} is not a dictionary", info_plist_path.display()))?;

        Ok(Self {
            root: directory.to_path_buf(),
            root_name,
            shallow,
            info_plist,
        })
    }

    /// Resolve the absolute path to a file in the bundle.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        if self.shallow {
            self.root.join(path.as_ref())
        } else {
            self.root.join("Contents").join(path.as_ref())
        }
    }

    /// The root directory of this bundle.
    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    /// The on-disk name of this bundle, including its `.app` suffix.
    pub fn name(&self) -> &str {
        &self.root_name
    }

    /// Obtain an `Info.plist` key as a `String`.
    ///
    /// Will return `None` if the specified key doesn't exist. Errors if the key value
    /// is not a string.
    pub fn info_plist_key_string(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = self.info_plist.get(key) {
            Ok(Some(
                value
                    .as_string()
                    .ok_or_else(|| anyhow!("key {} is not a string", key))?
                    .to_string(),
            ))
        } else {
            Ok(None)
        }
    }

    /// Obtain the name of the bundle's main executable file (`CFBundleExecutable`).
    pub fn main_executable(&self) -> Result<Option<String>> {
        self.info_plist_key_string("CFBundleExecutable")
    }

    /// Resolve the path of the main executable.
    ///
    /// `fallback_name` is used when `Info.plist` doesn't declare
    /// `CFBundleExecutable`.
    pub fn main_executable_path(&self, fallback_name: &str) -> Result<PathBuf> {
        let name = self
            .main_executable()?
            .unwrap_or_else(|| fallback_name.to_string());

        Ok(if self.shallow {
            self.resolve_path(name)
        } else {
            self.resolve_path(Path::new("MacOS").join(name))
        })
    }

    /// Path where the embedded provisioning profile should live.
    ///
    /// The returned path is not verified to exist.
    pub fn embedded_provisioning_profile_path(&self) -> PathBuf {
        self.resolve_path(EMBEDDED_PROVISIONING_PROFILE)
    }

    /// Find entries inside the bundle content whose name matches `name`.
    ///
    /// Matching is ASCII case-insensitive. Results are sorted.
    pub fn find_entries(&self, name: &str, kind: &ArtifactKind, max_depth: usize) -> Vec<PathBuf> {
        find_named_entries(&self.resolve_path(""), name, kind, max_depth, true)
    }
}
