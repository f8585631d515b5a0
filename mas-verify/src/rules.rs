// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The Mac App Store submission checklist.
//!
//! Every rule is evaluated on every run. A failing rule never prevents later
//! rules from running, so a single run surfaces every problem with a build.

use {
    crate::{
        error::MasVerifyError,
        extract::{
            display_field, installer_signed_by, ArchitectureFamily, ArchitectureList,
            EntitlementsMetadata, ProfileMetadata, SignatureDetails, MISSING,
        },
        report::{CheckResult, VerificationReport},
        settings::MasSettings,
        tools::SigningTools,
    },
    chrono::{DateTime, Utc},
    log::warn,
    mas_bundles::{ArtifactKind, DirectoryBundle, EMBEDDED_PROVISIONING_PROFILE},
    std::path::Path,
};

/// How deep under `Contents` to look for auto-update components.
const FORBIDDEN_COMPONENT_MAX_DEPTH: usize = 10;

pub const TITLE_FORBIDDEN: &str = "Checking for forbidden auto-update components";
pub const TITLE_PROFILE_PRESENT: &str = "Checking embedded provisioning profile";
pub const TITLE_PROFILE_APPLICATION_IDENTIFIER: &str = "Checking profile application identifier";
pub const TITLE_PROFILE_TEAM_IDENTIFIER: &str = "Checking profile team identifier";
pub const TITLE_PROFILE_EXPIRATION: &str = "Checking profile expiration";
pub const TITLE_ENTITLEMENTS: &str = "Checking entitlements";
pub const TITLE_CODE_SIGNATURE: &str = "Checking code signature";
pub const TITLE_INSTALLER_SIGNATURE: &str = "Checking installer package signature";
pub const TITLE_UNIVERSAL_BINARY: &str = "Checking universal binary";

fn expected_found(expected: &str, found: Option<&str>) -> Vec<String> {
    vec![
        format!("Expected: {}", expected),
        format!("Found:    {}", display_field(found)),
    ]
}

/// Evaluates the submission checklist against an app bundle.
pub struct MasChecklist<'a> {
    settings: &'a MasSettings,
    tools: &'a dyn SigningTools,
    now: DateTime<Utc>,
}

impl<'a> MasChecklist<'a> {
    pub fn new(settings: &'a MasSettings, tools: &'a dyn SigningTools) -> Self {
        Self {
            settings,
            tools,
            now: Utc::now(),
        }
    }

    /// Evaluate expiration relative to `now` instead of the current time.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Run every rule against `bundle` and the optional installer `package`.
    pub fn evaluate(&self, bundle: &DirectoryBundle, package: Option<&Path>) -> VerificationReport {
        let profile_path = bundle.embedded_provisioning_profile_path();
        let profile = if profile_path.is_file() {
            Some(ProfileMetadata::from_path(self.tools, &profile_path))
        } else {
            None
        };
        let profile = profile.as_ref();

        let entitlements = EntitlementsMetadata::from_path(self.tools, bundle.root_dir());

        VerificationReport {
            checks: vec![
                self.check_forbidden_components(bundle),
                self.check_profile_present(&profile_path),
                self.check_profile_application_identifier(profile),
                self.check_profile_team_identifier(profile),
                self.check_profile_expiration(profile),
                self.check_entitlements(&entitlements, profile),
                self.check_code_signature(bundle.root_dir()),
                self.check_installer_signature(package),
                self.check_universal_binary(bundle),
            ],
            ..Default::default()
        }
    }

    /// Rule 1: Squirrel.framework and ShipIt must not ship.
    pub fn check_forbidden_components(&self, bundle: &DirectoryBundle) -> CheckResult {
        let mut check = CheckResult::new(TITLE_FORBIDDEN);

        let mut found = bundle.find_entries(
            "ShipIt",
            &ArtifactKind::File,
            FORBIDDEN_COMPONENT_MAX_DEPTH,
        );
        found.extend(bundle.find_entries(
            "Squirrel.framework",
            &ArtifactKind::Directory,
            FORBIDDEN_COMPONENT_MAX_DEPTH,
        ));

        check.require(
            found.is_empty(),
            "No ShipIt or Squirrel.framework found",
            "ShipIt or Squirrel.framework found in bundle",
            found
                .iter()
                .map(|p| p.display().to_string())
                .chain(std::iter::once(
                    "Auto-update components are rejected by App Store review".to_string(),
                ))
                .collect(),
        );

        check
    }

    /// Rule 2: the bundle embeds a provisioning profile.
    pub fn check_profile_present(&self, profile_path: &Path) -> CheckResult {
        let mut check = CheckResult::new(TITLE_PROFILE_PRESENT);

        check.require(
            profile_path.is_file(),
            format!("{} present", EMBEDDED_PROVISIONING_PROFILE),
            format!("{} not found", EMBEDDED_PROVISIONING_PROFILE),
            vec![format!("Expected at {}", profile_path.display())],
        );

        check
    }

    /// Resolve the decoded profile or record why it is unavailable.
    fn profile_or_fail<'p>(
        check: &mut CheckResult,
        profile: Option<&'p Result<ProfileMetadata, MasVerifyError>>,
    ) -> Option<&'p ProfileMetadata> {
        match profile {
            None => {
                check.fail("No embedded provisioning profile to inspect", vec![]);
                None
            }
            Some(Err(e)) => {
                check.fail(
                    "Could not decode embedded provisioning profile",
                    vec![e.to_string()],
                );
                None
            }
            Some(Ok(profile)) => Some(profile),
        }
    }

    /// Rule 3: the profile is for this application.
    pub fn check_profile_application_identifier(
        &self,
        profile: Option<&Result<ProfileMetadata, MasVerifyError>>,
    ) -> CheckResult {
        let mut check = CheckResult::new(TITLE_PROFILE_APPLICATION_IDENTIFIER);

        if let Some(profile) = Self::profile_or_fail(&mut check, profile) {
            let expected = self.settings.expected_application_identifier();
            let found = profile.application_identifier.as_deref();

            check.info(format!(
                "Profile ApplicationIdentifier: {}",
                display_field(found)
            ));
            check.require(
                found == Some(expected.as_str()),
                "Profile application identifier matches",
                "Wrong application identifier in profile",
                expected_found(&expected, found),
            );
        }

        check
    }

    /// Rule 4: the profile belongs to the expected team.
    pub fn check_profile_team_identifier(
        &self,
        profile: Option<&Result<ProfileMetadata, MasVerifyError>>,
    ) -> CheckResult {
        let mut check = CheckResult::new(TITLE_PROFILE_TEAM_IDENTIFIER);

        if let Some(profile) = Self::profile_or_fail(&mut check, profile) {
            let found = profile.team_identifier.as_deref();

            check.info(format!("Profile TeamIdentifier: {}", display_field(found)));
            check.require(
                found == Some(self.settings.team_id.as_str()),
                "Profile team identifier matches",
                "Wrong team identifier in profile",
                expected_found(&self.settings.team_id, found),
            );
        }

        check
    }

    /// Rule 5: the profile has not expired.
    pub fn check_profile_expiration(
        &self,
        profile: Option<&Result<ProfileMetadata, MasVerifyError>>,
    ) -> CheckResult {
        let mut check = CheckResult::new(TITLE_PROFILE_EXPIRATION);

        if let Some(profile) = Self::profile_or_fail(&mut check, profile) {
            let raw = profile.expiration_date.as_deref();
            check.info(format!("Profile ExpirationDate: {}", display_field(raw)));

            match (raw, profile.expiration()) {
                (None, _) => check.fail("Profile has no ExpirationDate", vec![]),
                (Some(raw), None) => check.fail(
                    "Could not parse profile ExpirationDate",
                    vec![format!("Value: {}", raw)],
                ),
                (Some(_), Some(expiration)) => {
                    check.require(
                        expiration > self.now,
                        format!("Profile valid until {}", expiration.format("%Y-%m-%d")),
                        "Provisioning profile has EXPIRED",
                        vec![format!(
                            "Expired {}; download a fresh profile from the developer portal",
                            expiration.format("%Y-%m-%d")
                        )],
                    );
                }
            }
        }

        check
    }

    /// Rule 6: entitlements are sandboxed and agree with the expected
    /// identifiers and the profile.
    pub fn check_entitlements(
        &self,
        entitlements: &Result<EntitlementsMetadata, MasVerifyError>,
        profile: Option<&Result<ProfileMetadata, MasVerifyError>>,
    ) -> CheckResult {
        let mut check = CheckResult::new(TITLE_ENTITLEMENTS);

        let entitlements = match entitlements {
            Ok(entitlements) => entitlements,
            Err(e) => {
                check.fail("Could not read entitlements", vec![e.to_string()]);
                return check;
            }
        };

        let expected_app_id = self.settings.expected_application_identifier();
        let app_id = entitlements.application_identifier.as_deref();
        let team_id = entitlements.team_identifier.as_deref();

        check.info(format!("application-identifier: {}", display_field(app_id)));
        check.info(format!("team-identifier: {}", display_field(team_id)));
        check.info(format!("app-sandbox: {}", entitlements.app_sandbox));

        match app_id {
            None => check.fail("Missing application-identifier entitlement", vec![]),
            Some(found) if found != expected_app_id => check.fail(
                "Wrong application-identifier entitlement",
                expected_found(&expected_app_id, Some(found)),
            ),
            Some(_) => {}
        }

        match team_id {
            None => check.fail("Missing team-identifier entitlement", vec![]),
            Some(found) if found != self.settings.team_id => check.fail(
                "Wrong team-identifier entitlement",
                expected_found(&self.settings.team_id, Some(found)),
            ),
            Some(_) => {}
        }

        if !entitlements.app_sandbox {
            check.fail(
                "Missing com.apple.security.app-sandbox entitlement",
                vec!["Mac App Store apps must be sandboxed".to_string()],
            );
        }

        match profile {
            Some(Ok(profile)) => {
                if let (Some(profile_app_id), Some(app_id)) =
                    (profile.application_identifier.as_deref(), app_id)
                {
                    if profile_app_id != app_id {
                        check.fail(
                            "Entitlements application-identifier does not match profile",
                            vec![
                                format!("Profile:      {}", profile_app_id),
                                format!("Entitlements: {}", app_id),
                            ],
                        );
                    }
                }
                if let (Some(profile_team_id), Some(team_id)) =
                    (profile.team_identifier.as_deref(), team_id)
                {
                    if profile_team_id != team_id {
                        check.fail(
                            "Entitlements team-identifier does not match profile",
                            vec![
                                format!("Profile:      {}", profile_team_id),
                                format!("Entitlements: {}", team_id),
                            ],
                        );
                    }
                }
            }
            _ => check.info("Profile unavailable; entitlements not compared against it"),
        }

        if check.passed() {
            check.pass("Entitlements are correct");
        }

        check
    }

    /// Rule 7: the app is signed with the Mac App Store application certificate.
    pub fn check_code_signature(&self, app: &Path) -> CheckResult {
        let mut check = CheckResult::new(TITLE_CODE_SIGNATURE);

        match self.tools.code_signature_details(app) {
            Ok(text) => {
                let details = SignatureDetails::from_codesign_text(&text);
                let leaf = details.leaf_authority();

                if check.require(
                    details.has_authority(&self.settings.app_authority),
                    "Signed with Mac App Store application certificate",
                    "Not signed with Mac App Store application certificate",
                    expected_found(&format!("{}: ...", self.settings.app_authority), leaf),
                ) {
                    check.info(format!("Identity: {}", display_field(leaf)));
                }
            }
            Err(e) => check.fail("Code signature verification failed", vec![e.to_string()]),
        }

        check
    }

    /// Rule 8: an accompanying installer package is signed with the Mac App
    /// Store installer certificate.
    pub fn check_installer_signature(&self, package: Option<&Path>) -> CheckResult {
        let mut check = CheckResult::new(TITLE_INSTALLER_SIGNATURE);

        let package = match package {
            Some(package) => package,
            None => {
                check.info("No installer package accompanies this build; skipped");
                return check;
            }
        };

        check.info(format!("Package: {}", package.display()));

        match self.tools.installer_signature(package) {
            Ok(text) => {
                check.require(
                    installer_signed_by(&text, &self.settings.installer_authority),
                    "Signed with Mac App Store installer certificate",
                    "Not signed with Mac App Store installer certificate",
                    vec![format!("Expected: {}: ...", self.settings.installer_authority)]
                        .into_iter()
                        .chain(text.lines().map(|l| l.trim().to_string()))
                        .filter(|l| !l.is_empty())
                        .collect(),
                );
            }
            Err(e) => check.fail("Installer package signature check failed", vec![e.to_string()]),
        }

        check
    }

    /// Rule 9: the main executable carries both Apple silicon and Intel code.
    pub fn check_universal_binary(&self, bundle: &DirectoryBundle) -> CheckResult {
        let mut check = CheckResult::new(TITLE_UNIVERSAL_BINARY);

        let binary = match bundle.main_executable_path(&self.settings.product_name) {
            Ok(binary) => binary,
            Err(e) => {
                check.fail("Could not resolve main executable", vec![e.to_string()]);
                return check;
            }
        };

        if !binary.is_file() {
            check.fail(
                "Main executable not found",
                vec![format!("Expected at {}", binary.display())],
            );
            return check;
        }

        let text = match self.tools.architectures(&binary) {
            Ok(text) => text,
            Err(e) => {
                check.fail("Could not determine binary architectures", vec![e.to_string()]);
                return check;
            }
        };

        let archs = ArchitectureList::from_lipo_text(&text);
        let missing = archs.missing_families();

        check.info(if archs.architectures.is_empty() {
            format!("Architectures: {}", MISSING)
        } else {
            format!("Architectures: {}", archs.architectures.join(" "))
        });

        if missing.is_empty() {
            check.pass(format!(
                "Universal binary ({} + {})",
                ArchitectureFamily::Arm64,
                ArchitectureFamily::Intel
            ));
        } else {
            let missing = missing
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            warn!("{} lacks {}", binary.display(), missing);

            check.fail(
                format!("Not a universal binary; missing {}", missing),
                vec![
                    text.trim().to_string(),
                    "Uploads without both architectures are rejected (TestFlight error 91167)"
                        .to_string(),
                ],
            );
        }

        check
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{report::Line, testutil::*},
        anyhow::Result,
        chrono::TimeZone,
    };

    fn fixture() -> Result<(tempfile::TempDir, MasSettings, DirectoryBundle)> {
        let (temp, td) = temp_dir()?;
        let app = create_app_bundle(&td, "Nexus Countdown.app", "Nexus Countdown")?;
        let bundle = DirectoryBundle::new_from_path(&app)?;

        Ok((temp, MasSettings::new(&td), bundle))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn failed_titles(report: &VerificationReport) -> Vec<&str> {
        report
            .checks
            .iter()
            .filter(|c| !c.passed())
            .map(|c| c.title.as_str())
            .collect()
    }

    #[test]
    fn all_rules_pass() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        let tools = FakeSigningTools::passing();

        let report = MasChecklist::new(&settings, &tools)
            .at(now())
            .evaluate(&bundle, None);

        assert_eq!(report.checks.len(), 9);
        assert!(report.passed(), "{:#?}", report);
        assert_eq!(report.exit_code(), 0);

        let installer = report.check(TITLE_INSTALLER_SIGNATURE).unwrap();
        assert_eq!(
            installer.lines,
            vec![Line::Info(
                "No installer package accompanies this build; skipped".to_string()
            )]
        );

        Ok(())
    }

    #[test]
    fn expired_profile_fails_only_its_rule() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        let tools = FakeSigningTools {
            profile: Some(profile_plist_text(APP_ID, TEAM_ID, PAST_EXPIRATION)),
            ..FakeSigningTools::passing()
        };

        let report = MasChecklist::new(&settings, &tools)
            .at(now())
            .evaluate(&bundle, None);

        assert_eq!(report.checks.len(), 9);
        assert_eq!(failed_titles(&report), vec![TITLE_PROFILE_EXPIRATION]);
        assert_eq!(
            report.check(TITLE_PROFILE_EXPIRATION).unwrap().failures(),
            vec!["Provisioning profile has EXPIRED"]
        );
        assert_eq!(report.exit_code(), 1);

        Ok(())
    }

    #[test]
    fn expiration_at_now_is_expired() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        let tools = FakeSigningTools {
            profile: Some(profile_plist_text(
                APP_ID,
                TEAM_ID,
                "2025-06-01 12:00:00 +0000",
            )),
            ..FakeSigningTools::passing()
        };

        let report = MasChecklist::new(&settings, &tools)
            .at(now())
            .evaluate(&bundle, None);

        assert_eq!(failed_titles(&report), vec![TITLE_PROFILE_EXPIRATION]);
        assert_eq!(
            report.check(TITLE_PROFILE_EXPIRATION).unwrap().failures(),
            vec!["Provisioning profile has EXPIRED"]
        );

        let report = MasChecklist::new(&settings, &tools)
            .at(Utc.with_ymd_and_hms(2025, 6, 1, 11, 59, 59).unwrap())
            .evaluate(&bundle, None);
        assert!(report.passed(), "{:#?}", report);

        Ok(())
    }

    #[test]
    fn missing_or_garbled_expiration() -> Result<()> {
        let (_temp, settings, _bundle) = fixture()?;
        let tools = FakeSigningTools::passing();
        let checklist = MasChecklist::new(&settings, &tools).at(now());

        let profile = Ok(ProfileMetadata::from_plist_text(indoc::indoc! {r#"
            {
              "Entitlements" => {
                "application-identifier" => "T6YG6KXA9D.com.nexuscountdown"
              }
              "TeamIdentifier" => [
                0 => "T6YG6KXA9D"
              ]
            }
        "#}));
        assert_eq!(
            checklist.check_profile_expiration(Some(&profile)).failures(),
            vec!["Profile has no ExpirationDate"]
        );

        let profile = Ok(ProfileMetadata::from_plist_text(&profile_plist_text(
            APP_ID,
            TEAM_ID,
            "2025-13-45 00:00:00 +0000",
        )));
        assert_eq!(
            checklist.check_profile_expiration(Some(&profile)).failures(),
            vec!["Could not parse profile ExpirationDate"]
        );

        Ok(())
    }

    #[test]
    fn undecodable_profile_fails_profile_rules() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        let tools = FakeSigningTools {
            profile: None,
            ..FakeSigningTools::passing()
        };

        let report = MasChecklist::new(&settings, &tools)
            .at(now())
            .evaluate(&bundle, None);

        assert_eq!(
            failed_titles(&report),
            vec![
                TITLE_PROFILE_APPLICATION_IDENTIFIER,
                TITLE_PROFILE_TEAM_IDENTIFIER,
                TITLE_PROFILE_EXPIRATION,
            ]
        );
        for title in [
            TITLE_PROFILE_APPLICATION_IDENTIFIER,
            TITLE_PROFILE_TEAM_IDENTIFIER,
            TITLE_PROFILE_EXPIRATION,
        ] {
            assert_eq!(
                report.check(title).unwrap().failures(),
                vec!["Could not decode embedded provisioning profile"]
            );
        }
        assert!(report.check(TITLE_PROFILE_PRESENT).unwrap().passed());
        assert!(report.check(TITLE_ENTITLEMENTS).unwrap().passed());

        Ok(())
    }

    #[test]
    fn entitlements_without_identifiers() -> Result<()> {
        let (_temp, settings, _bundle) = fixture()?;
        let tools = FakeSigningTools::passing();
        let profile = Ok(ProfileMetadata::from_plist_text(&profile_plist_text(
            APP_ID,
            TEAM_ID,
            FUTURE_EXPIRATION,
        )));
        let entitlements = Ok(EntitlementsMetadata::from_plist_text(indoc::indoc! {r#"
            {
              "com.apple.security.app-sandbox" => true
            }
        "#}));

        let check = MasChecklist::new(&settings, &tools)
            .check_entitlements(&entitlements, Some(&profile));

        assert_eq!(
            check.failures(),
            vec![
                "Missing application-identifier entitlement",
                "Missing team-identifier entitlement",
            ]
        );

        Ok(())
    }

    #[test]
    fn entitlements_agreeing_with_wrong_profile() -> Result<()> {
        let (_temp, settings, _bundle) = fixture()?;
        let tools = FakeSigningTools::passing();
        let other_app = "T6YG6KXA9D.com.example";
        let profile = Ok(ProfileMetadata::from_plist_text(&profile_plist_text(
            other_app,
            TEAM_ID,
            FUTURE_EXPIRATION,
        )));
        let entitlements = Ok(EntitlementsMetadata::from_plist_text(
            &entitlements_plist_text(other_app, TEAM_ID, true),
        ));

        let check = MasChecklist::new(&settings, &tools)
            .check_entitlements(&entitlements, Some(&profile));

        assert_eq!(
            check.failures(),
            vec!["Wrong application-identifier entitlement"]
        );

        Ok(())
    }

    #[test]
    fn forbidden_updater_fails_regardless() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        let resources = bundle
            .resolve_path("Frameworks/Squirrel.framework/Versions/A/Resources");
        std::fs::create_dir_all(&resources)?;
        std::fs::write(resources.join("ShipIt"), b"")?;

        let tools = FakeSigningTools::passing();
        let report = MasChecklist::new(&settings, &tools)
            .at(now())
            .evaluate(&bundle, None);

        assert_eq!(failed_titles(&report), vec![TITLE_FORBIDDEN]);

        let forbidden = report.check(TITLE_FORBIDDEN).unwrap();
        match &forbidden.lines[0] {
            Line::Fail { details, .. } => {
                assert!(details.iter().any(|d| d.ends_with("ShipIt")));
                assert!(details.iter().any(|d| d.ends_with("Squirrel.framework")));
            }
            other => panic!("unexpected line: {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn forbidden_component_match_is_case_insensitive() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        std::fs::create_dir_all(bundle.resolve_path("Frameworks/squirrel.FRAMEWORK"))?;

        let tools = FakeSigningTools::passing();
        let check = MasChecklist::new(&settings, &tools).check_forbidden_components(&bundle);

        assert!(!check.passed());

        Ok(())
    }

    #[test]
    fn single_architecture_names_missing() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        let tools = FakeSigningTools {
            lipo: Some(LIPO_ARM64_ONLY.to_string()),
            ..FakeSigningTools::passing()
        };

        let report = MasChecklist::new(&settings, &tools)
            .at(now())
            .evaluate(&bundle, None);

        assert_eq!(failed_titles(&report), vec![TITLE_UNIVERSAL_BINARY]);
        assert_eq!(
            report.check(TITLE_UNIVERSAL_BINARY).unwrap().failures(),
            vec!["Not a universal binary; missing x86_64"]
        );

        Ok(())
    }

    #[test]
    fn missing_profile_fails_profile_rules() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        std::fs::remove_file(bundle.embedded_provisioning_profile_path())?;

        let tools = FakeSigningTools::passing();
        let report = MasChecklist::new(&settings, &tools)
            .at(now())
            .evaluate(&bundle, None);

        assert_eq!(
            failed_titles(&report),
            vec![
                TITLE_PROFILE_PRESENT,
                TITLE_PROFILE_APPLICATION_IDENTIFIER,
                TITLE_PROFILE_TEAM_IDENTIFIER,
                TITLE_PROFILE_EXPIRATION,
            ]
        );
        assert!(report.check(TITLE_ENTITLEMENTS).unwrap().passed());

        Ok(())
    }

    #[test]
    fn wrong_identifiers_and_no_sandbox() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        let tools = FakeSigningTools {
            profile: Some(profile_plist_text(
                "ABCDE12345.com.example",
                "ABCDE12345",
                FUTURE_EXPIRATION,
            )),
            entitlements: Some(entitlements_plist_text(APP_ID, TEAM_ID, false)),
            ..FakeSigningTools::passing()
        };

        let report = MasChecklist::new(&settings, &tools)
            .at(now())
            .evaluate(&bundle, None);

        assert_eq!(
            failed_titles(&report),
            vec![
                TITLE_PROFILE_APPLICATION_IDENTIFIER,
                TITLE_PROFILE_TEAM_IDENTIFIER,
                TITLE_ENTITLEMENTS,
            ]
        );
        assert_eq!(
            report.check(TITLE_ENTITLEMENTS).unwrap().failures(),
            vec![
                "Missing com.apple.security.app-sandbox entitlement",
                "Entitlements application-identifier does not match profile",
                "Entitlements team-identifier does not match profile",
            ]
        );

        Ok(())
    }

    #[test]
    fn tool_failures_are_recorded() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        let tools = FakeSigningTools {
            codesign_details: None,
            entitlements: None,
            ..FakeSigningTools::passing()
        };

        let report = MasChecklist::new(&settings, &tools)
            .at(now())
            .evaluate(&bundle, None);

        assert_eq!(
            failed_titles(&report),
            vec![TITLE_ENTITLEMENTS, TITLE_CODE_SIGNATURE]
        );

        Ok(())
    }

    #[test]
    fn developer_id_signature_rejected() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        let tools = FakeSigningTools {
            codesign_details: Some(codesign_details_text(
                "Developer ID Application: Adam Parsons (T6YG6KXA9D)",
            )),
            ..FakeSigningTools::passing()
        };

        let check = MasChecklist::new(&settings, &tools).check_code_signature(bundle.root_dir());

        assert_eq!(
            check.failures(),
            vec!["Not signed with Mac App Store application certificate"]
        );

        Ok(())
    }

    #[test]
    fn installer_signature() -> Result<()> {
        let (_temp, settings, _bundle) = fixture()?;
        let pkg = Path::new("Nexus Countdown-1.0.0.pkg");

        let tools = FakeSigningTools::passing();
        let check = MasChecklist::new(&settings, &tools).check_installer_signature(Some(pkg));
        assert!(check.passed());

        let tools = FakeSigningTools {
            installer_signature: Some(installer_signature_text(
                "Developer ID Installer: Adam Parsons (T6YG6KXA9D)",
            )),
            ..FakeSigningTools::passing()
        };
        let check = MasChecklist::new(&settings, &tools).check_installer_signature(Some(pkg));
        assert_eq!(
            check.failures(),
            vec!["Not signed with Mac App Store installer certificate"]
        );

        let tools = FakeSigningTools {
            installer_signature: None,
            ..FakeSigningTools::passing()
        };
        let check = MasChecklist::new(&settings, &tools).check_installer_signature(Some(pkg));
        assert_eq!(
            check.failures(),
            vec!["Installer package signature check failed"]
        );

        Ok(())
    }

    #[test]
    fn missing_main_executable() -> Result<()> {
        let (_temp, settings, bundle) = fixture()?;
        std::fs::remove_file(bundle.resolve_path("MacOS/Nexus Countdown"))?;

        let tools = FakeSigningTools::passing();
        let check = MasChecklist::new(&settings, &tools).check_universal_binary(&bundle);

        assert_eq!(check.failures(), vec!["Main executable not found"]);

        Ok(())
    }
}
