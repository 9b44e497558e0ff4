//! Command dispatch and handlers.

pub mod check;
pub mod collect;
pub mod create_issue;

use std::env;
use std::path::{Path, PathBuf};

use crate::cassette::session::RecordingSession;
use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::reviews::Finding;

/// Directory below which tracker traffic is recorded, when set.
pub const RECORD_ENV: &str = "TRACKBRIDGE_RECORD";
/// Cassette file to replay instead of calling the tracker, when set.
pub const REPLAY_ENV: &str = "TRACKBRIDGE_REPLAY";

/// Dispatch a parsed command to its handler.
///
/// `TRACKBRIDGE_REPLAY=<file>` serves tracker calls from a cassette;
/// `TRACKBRIDGE_RECORD=<dir>` records live tracker traffic below `dir`.
///
/// # Errors
///
/// Returns an error string if settings cannot be loaded or the command fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let settings = load_settings(cli, env::vars())?;

    if let Ok(path) = env::var(REPLAY_ENV) {
        let ctx = ServiceContext::replaying(Path::new(&path))?;
        return dispatch_with_context(&cli.command, &ctx, &settings);
    }

    let (ctx, session) = if let Ok(path) = env::var(RECORD_ENV) {
        let (ctx, session) = ServiceContext::recording_at(&PathBuf::from(path))?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(), None)
    };

    let result = dispatch_with_context(&cli.command, &ctx, &settings);

    // Finish recording even when the command failed.
    if let Some(session) = session {
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Layers environment, settings file and `--set` overrides, later wins.
///
/// # Errors
///
/// Returns an error string if the settings file or an override is invalid.
pub fn load_settings<I>(cli: &Cli, vars: I) -> Result<Settings, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut settings = Settings::from_env_vars(vars);
    if let Some(path) = &cli.settings {
        let file = Settings::from_yaml_file(path).map_err(|e| e.to_string())?;
        settings = settings.merged_with(file);
    }
    for raw in &cli.overrides {
        let (key, value) = Settings::parse_override(raw).map_err(|e| e.to_string())?;
        settings.set(key, value);
    }
    Ok(settings)
}

/// Dispatch a command with the given service context and settings.
fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    settings: &Settings,
) -> Result<(), String> {
    match command {
        Command::CreateIssue { id, severity, rule, message, comment, status, linked_issue } => {
            let finding = Finding {
                id: *id,
                severity: severity.clone(),
                rule_name: rule.clone(),
                message: message.clone(),
                status: status.clone(),
                linked_issue: linked_issue.clone(),
            };
            create_issue::run(ctx, settings, &finding, comment.as_deref())
        }
        Command::Collect { scope } => collect::run(ctx, settings, *scope),
        Command::Check => check::run(settings),
    }
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
