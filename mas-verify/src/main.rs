// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    clap::{Arg, ArgMatches, Command},
    log::LevelFilter,
    mas_verify::{
        artifacts::locate_app,
        distribution::verify_distribution,
        error::MasVerifyError,
        profile::detect_profile,
        report::VerificationReport,
        settings::MasSettings,
        signing_config::PackageManifest,
        squirrel::remove_squirrel,
        tools::SystemSigningTools,
        verify::verify_mas,
    },
    std::path::{Path, PathBuf},
};

const VERIFY_MAS_ABOUT: &str = "\
Verifies a Mac App Store build before upload.

The app bundle is taken from the path recorded in .mas-app-path. Failing
that, the installer package recorded in .mas-pkg-path (or the first .pkg in
the packaging output) is expanded into .mas-verify-temp and the app in its
payload is used. As a last resort the first .app in the packaging output
directories is used.

The build is then checked for:

* Squirrel.framework / ShipIt auto-update components (must be absent)
* An embedded provisioning profile for the expected application and team
  that has not expired
* Sandboxed entitlements agreeing with the expected identifiers and the
  embedded profile
* A Mac App Store application signature
* A Mac App Store installer signature on the accompanying package, if any
* A universal (arm64 + x86_64) main executable

Every check runs even when earlier checks fail. The process exits non-zero
if any check failed.
";

fn settings_from_args(args: &ArgMatches) -> Result<MasSettings, MasVerifyError> {
    let root = match args.value_of("repo_root") {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()?,
    };

    Ok(MasSettings::new(std::fs::canonicalize(&root)?))
}

fn finish_report(report: VerificationReport) -> Result<(), MasVerifyError> {
    report.emit_to_console()?;

    if report.passed() {
        Ok(())
    } else {
        Err(MasVerifyError::VerificationProblems)
    }
}

fn command_detect_profile(args: &ArgMatches) -> Result<(), MasVerifyError> {
    let settings = settings_from_args(args)?;

    let path = detect_profile(&settings, &SystemSigningTools)?;
    println!("{}", path.display());

    Ok(())
}

fn command_locate_app(args: &ArgMatches) -> Result<(), MasVerifyError> {
    let settings = settings_from_args(args)?;

    let path = locate_app(&settings)?;
    println!("{}", path.display());

    Ok(())
}

fn command_print_signing_config(args: &ArgMatches) -> Result<(), MasVerifyError> {
    let settings = settings_from_args(args)?;

    let manifest = PackageManifest::from_path(&settings.package_json_path())?;
    for line in manifest.describe(&settings) {
        println!("{}", line);
    }

    Ok(())
}

fn command_remove_squirrel(args: &ArgMatches) -> Result<(), MasVerifyError> {
    let app_out_dir = args
        .value_of("app_out_dir")
        .ok_or(MasVerifyError::CliBadArgument)?;
    let product_filename = args
        .value_of("product_filename")
        .ok_or(MasVerifyError::CliBadArgument)?;

    let removed = remove_squirrel(Path::new(app_out_dir), product_filename)?;

    if removed.is_empty() {
        println!("no Squirrel components to remove");
    }
    for path in removed {
        println!("removed {}", path.display());
    }

    Ok(())
}

fn command_verify_bundle(args: &ArgMatches) -> Result<(), MasVerifyError> {
    let settings = settings_from_args(args)?;

    println!("Verifying distribution bundle");
    println!();

    finish_report(verify_distribution(&settings).map_err(MasVerifyError::Bundle)?)
}

fn command_verify_mas(args: &ArgMatches) -> Result<(), MasVerifyError> {
    let settings = settings_from_args(args)?;

    finish_report(verify_mas(&settings, &SystemSigningTools)?)
}

fn main_impl() -> Result<(), MasVerifyError> {
    let app = Command::new("Nexus Countdown release verification")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Adam Parsons")
        .about("Verify Nexus Countdown release artifacts")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .multiple_occurrences(true)
                .help("Increase logging verbosity. Can be specified multiple times."),
        )
        .arg(
            Arg::new("repo_root")
                .long("repo-root")
                .global(true)
                .takes_value(true)
                .help("Repository root directory (defaults to the current directory)"),
        );

    let app = app.subcommand(
        Command::new("detect-profile")
            .about("Find and validate the source provisioning profile and print its path"),
    );

    let app = app.subcommand(
        Command::new("locate-app")
            .about("Print the path of the Mac App Store app bundle in the packaging output"),
    );

    let app = app.subcommand(
        Command::new("print-signing-config")
            .about("Print the packaging tool's signing configuration"),
    );

    let app = app.subcommand(
        Command::new("remove-squirrel")
            .about("Remove Squirrel.framework and ShipIt from a packaged app before signing")
            .arg(
                Arg::new("app_out_dir")
                    .required(true)
                    .help("Directory holding the packaged .app"),
            )
            .arg(
                Arg::new("product_filename")
                    .required(true)
                    .help("File name of the app bundle without its .app extension"),
            ),
    );

    let app = app.subcommand(
        Command::new("verify-bundle")
            .about("Verify the direct-download app bundle and disk image"),
    );

    let app = app.subcommand(
        Command::new("verify-mas")
            .about("Verify a Mac App Store build before upload")
            .long_about(VERIFY_MAS_ABOUT),
    );

    let matches = app.get_matches();

    let log_level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    );

    // Disable log context except at higher log levels.
    if log_level <= LevelFilter::Info {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }

    builder.init();

    match matches.subcommand() {
        Some(("detect-profile", args)) => command_detect_profile(args),
        Some(("locate-app", args)) => command_locate_app(args),
        Some(("print-signing-config", args)) => command_print_signing_config(args),
        Some(("remove-squirrel", args)) => command_remove_squirrel(args),
        Some(("verify-bundle", args)) => command_verify_bundle(args),
        Some(("verify-mas", args)) => command_verify_mas(args),
        _ => Err(MasVerifyError::CliUnknownCommand),
    }
}

fn main() {
    let exit_code = match main_impl() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {}", err);
            1
        }
    };

    std::process::exit(exit_code)
}
