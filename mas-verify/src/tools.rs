// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Invoking Apple's signing tools.
//!
//! All external process execution goes through the [SigningTools] trait so
//! the parsing and rule evaluation on top of it can run against captured
//! tool output.

use {
    crate::error::MasVerifyError,
    duct::{cmd, Expression},
    log::debug,
    std::path::Path,
};

/// Apple command line tools consulted during verification.
pub trait SigningTools {
    /// Decode the CMS envelope of a provisioning profile into plist data.
    ///
    /// `security cms -D -i <path>`
    fn decode_cms(&self, path: &Path) -> Result<Vec<u8>, MasVerifyError>;

    /// Render plist data as the indented `"key" => value` text of `plutil -p -`.
    fn plist_to_text(&self, data: &[u8]) -> Result<String, MasVerifyError>;

    /// Extract the entitlements plist from a signed bundle or binary.
    ///
    /// `codesign -d --entitlements :- <path>`
    fn code_signature_entitlements(&self, path: &Path) -> Result<Vec<u8>, MasVerifyError>;

    /// Describe the code signature, including `Authority=` lines.
    ///
    /// `codesign -dv --verbose=4 <path>` with stderr folded into stdout.
    fn code_signature_details(&self, path: &Path) -> Result<String, MasVerifyError>;

    /// Describe the signature on a flat installer package.
    ///
    /// `pkgutil --check-signature <path>`
    fn installer_signature(&self, path: &Path) -> Result<String, MasVerifyError>;

    /// Fully expand a flat installer package into `dest`, which must not exist.
    ///
    /// `pkgutil --expand-full <path> <dest>`
    fn expand_installer(&self, path: &Path, dest: &Path) -> Result<(), MasVerifyError>;

    /// List the architectures of a Mach-O binary.
    ///
    /// `lipo -info <path>`
    fn architectures(&self, path: &Path) -> Result<String, MasVerifyError>;
}

/// [SigningTools] backed by the tools installed on the running macOS system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemSigningTools;

/// Run an expression, capturing stdout and stderr, and error on non-zero exit.
fn run_captured(program: &str, expression: Expression) -> Result<Vec<u8>, MasVerifyError> {
    debug!("invoking {}", program);
    let output = expression
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()
        .map_err(|e| MasVerifyError::tool(program, e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(MasVerifyError::tool(
            program,
            format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ))
    }
}

/// Like [run_captured] but with stderr merged into the captured stdout.
fn run_merged(program: &str, expression: Expression) -> Result<String, MasVerifyError> {
    debug!("invoking {} (stderr merged)", program);
    let output = expression
        .stderr_to_stdout()
        .stdout_capture()
        .unchecked()
        .run()
        .map_err(|e| MasVerifyError::tool(program, e))?;

    let text = String::from_utf8_lossy(&output.stdout).to_string();

    if output.status.success() {
        Ok(text)
    } else {
        Err(MasVerifyError::tool(
            program,
            format!("{}: {}", output.status, text.trim()),
        ))
    }
}

impl SigningTools for SystemSigningTools {
    fn decode_cms(&self, path: &Path) -> Result<Vec<u8>, MasVerifyError> {
        run_captured("security", cmd!("security", "cms", "-D", "-i", path))
    }

    fn plist_to_text(&self, data: &[u8]) -> Result<String, MasVerifyError> {
        let stdout = run_captured(
            "plutil",
            cmd!("plutil", "-p", "-").stdin_bytes(data.to_vec()),
        )?;

        Ok(String::from_utf8_lossy(&stdout).to_string())
    }

    fn code_signature_entitlements(&self, path: &Path) -> Result<Vec<u8>, MasVerifyError> {
        run_captured(
            "codesign",
            cmd!("codesign", "-d", "--entitlements", ":-", path),
        )
    }

    fn code_signature_details(&self, path: &Path) -> Result<String, MasVerifyError> {
        run_merged("codesign", cmd!("codesign", "-dv", "--verbose=4", path))
    }

    fn installer_signature(&self, path: &Path) -> Result<String, MasVerifyError> {
        let stdout = run_captured("pkgutil", cmd!("pkgutil", "--check-signature", path))?;

        Ok(String::from_utf8_lossy(&stdout).to_string())
    }

    fn expand_installer(&self, path: &Path, dest: &Path) -> Result<(), MasVerifyError> {
        run_captured("pkgutil", cmd!("pkgutil", "--expand-full", path, dest))?;

        Ok(())
    }

    fn architectures(&self, path: &Path) -> Result<String, MasVerifyError> {
        let stdout = run_captured("lipo", cmd!("lipo", "-info", path))?;

        Ok(String::from_utf8_lossy(&stdout).to_string())
    }
}
