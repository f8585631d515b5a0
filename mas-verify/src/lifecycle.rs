// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Main window lifecycle of the desktop shell.
//!
//! The GUI toolkit is abstracted behind [WindowHost]. [AppLifecycle] owns the
//! single main window handle and reacts to the toolkit's lifecycle events.

use {
    log::{debug, error},
    serde::{Deserialize, Serialize},
    std::path::{Path, PathBuf},
};

pub const WINDOW_TITLE: &str = "Nexus Countdown";
pub const WINDOW_WIDTH: u32 = 900;
pub const WINDOW_HEIGHT: u32 = 700;
pub const PRELOAD_SCRIPT: &str = "preload.js";

/// Operating system the shell runs on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl Platform {
    /// Whether apps stay running with no open windows.
    pub fn keeps_running_without_windows(&self) -> bool {
        matches!(self, Self::MacOs)
    }
}

/// Renderer security settings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebPreferences {
    pub context_isolation: bool,
    pub node_integration: bool,
    pub enable_remote_module: bool,
    pub sandbox: bool,
    pub preload: PathBuf,
}

/// Options the main window is created with.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowOptions {
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub title: String,
    pub web_preferences: WebPreferences,
}

impl WindowOptions {
    /// Options for the main window, with the preload script next to the main script.
    pub fn main_window(main_dir: &Path) -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            resizable: true,
            title: WINDOW_TITLE.to_string(),
            web_preferences: WebPreferences {
                context_isolation: true,
                node_integration: false,
                enable_remote_module: false,
                sandbox: true,
                preload: main_dir.join(PRELOAD_SCRIPT),
            },
        }
    }
}

/// Values exposed to the renderer through the preload bridge.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ExposedEnvironment {
    pub env: String,
}

/// How the shell was launched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LaunchEnvironment {
    /// `NODE_ENV`.
    pub node_env: Option<String>,
    /// Whether running from a packaged app rather than a checkout.
    pub is_packaged: bool,
    /// Directory holding the main script.
    pub main_dir: PathBuf,
    /// Root of the application code (the asar archive or unpacked directory).
    pub app_path: PathBuf,
}

impl LaunchEnvironment {
    fn node_env_is(&self, value: &str) -> bool {
        self.node_env.as_deref() == Some(value)
    }

    /// Development loads content from the checkout.
    pub fn is_development(&self) -> bool {
        self.node_env_is("development") || !self.is_packaged
    }

    /// The HTML file the main window loads.
    pub fn content_path(&self) -> PathBuf {
        if self.is_development() {
            self.main_dir
                .join("..")
                .join("..")
                .join("web")
                .join("index.html")
        } else {
            self.app_path.join("web").join("index.html")
        }
    }

    pub fn devtools_enabled(&self) -> bool {
        !self.node_env_is("production") && !self.is_packaged
    }

    pub fn exposed_environment(&self) -> ExposedEnvironment {
        ExposedEnvironment {
            env: self
                .node_env
                .clone()
                .unwrap_or_else(|| "production".to_string()),
        }
    }
}

/// A GUI toolkit able to host windows.
pub trait WindowHost {
    type Handle;

    fn create_window(&mut self, options: &WindowOptions) -> Self::Handle;

    fn load_file(&mut self, window: &Self::Handle, path: &Path) -> anyhow::Result<()>;

    fn open_dev_tools(&mut self, window: &Self::Handle);

    fn quit(&mut self);
}

/// Drives the main window through the application's lifetime.
pub struct AppLifecycle<H: WindowHost> {
    host: H,
    launch: LaunchEnvironment,
    main_window: Option<H::Handle>,
}

impl<H: WindowHost> AppLifecycle<H> {
    pub fn new(host: H, launch: LaunchEnvironment) -> Self {
        Self {
            host,
            launch,
            main_window: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn main_window(&self) -> Option<&H::Handle> {
        self.main_window.as_ref()
    }

    fn create_main_window(&mut self) {
        let options = WindowOptions::main_window(&self.launch.main_dir);
        let window = self.host.create_window(&options);

        let content = self.launch.content_path();
        debug!("loading {}", content.display());
        if let Err(e) = self.host.load_file(&window, &content) {
            error!("failed to load {}: {}", content.display(), e);
        }

        if self.launch.devtools_enabled() {
            self.host.open_dev_tools(&window);
        }

        self.main_window = Some(window);
    }

    /// The toolkit finished initializing.
    pub fn on_ready(&mut self) {
        self.create_main_window();
    }

    /// The app was activated (e.g. its dock icon clicked).
    pub fn on_activate(&mut self, open_windows: usize) {
        if open_windows == 0 {
            self.create_main_window();
        }
    }

    pub fn on_window_closed(&mut self) {
        self.main_window = None;
    }

    /// Returns whether quitting was requested.
    pub fn on_all_windows_closed(&mut self, platform: Platform) -> bool {
        if platform.keeps_running_without_windows() {
            false
        } else {
            self.host.quit();
            true
        }
    }
}
