use std::path::{Path, PathBuf};

use pairlink::{ClearOutcome, CredentialStore, FileCredentialStore, SessionValidator, ValidationReport};
use pairlink_runtime::lease::{SessionLease, pid_is_alive};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::SessionAction;
use crate::context::CommandContext;
use crate::error::{CliError, Result};
use crate::output::print_result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PathData {
	session_id: String,
	storage_root: PathBuf,
	path: PathBuf,
	exists: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectData {
	#[serde(flatten)]
	report: ValidationReport,
	lease: Option<LeaseData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaseData {
	pid: u32,
	alive: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClearData {
	path: PathBuf,
	#[serde(flatten)]
	outcome: ClearOutcome,
}

pub fn execute(action: SessionAction, ctx: &CommandContext, name: &str) -> Result<()> {
	let path = ctx.resolver().resolve();
	match action {
		SessionAction::Path => {
			info!(target = "pairlink.cli", path = %path.display(), "session path");
			print_result(
				name,
				PathData {
					session_id: ctx.config.session_id.clone(),
					storage_root: ctx.config.storage_root.clone(),
					exists: path.is_dir(),
					path,
				},
			)
		}
		SessionAction::Inspect => {
			let report = SessionValidator::new(ctx.config.stale_after()).validate(&FileCredentialStore, &path);
			info!(target = "pairlink.cli", path = %path.display(), verdict = ?report.verdict, "session inspected");
			print_result(
				name,
				InspectData {
					lease: lease_of(&path),
					report,
				},
			)
		}
		SessionAction::Clear => {
			if let Some(LeaseData { pid, alive: true }) = lease_of(&path).filter(|lease| lease.pid != std::process::id()) {
				return Err(CliError::SessionBusy { path, pid });
			}
			let outcome = FileCredentialStore.clear(&path);
			if outcome.failed > 0 {
				warn!(target = "pairlink.cli", path = %path.display(), failed = outcome.failed, "some credential files could not be removed");
			} else {
				info!(target = "pairlink.cli", path = %path.display(), removed = outcome.removed, "session cleared");
			}
			print_result(name, ClearData { path, outcome })
		}
	}
}

fn lease_of(path: &Path) -> Option<LeaseData> {
	SessionLease::holder(path).map(|pid| LeaseData {
		pid,
		alive: pid_is_alive(pid),
	})
}
