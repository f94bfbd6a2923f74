// Session: the top-level loop. Verifies the token once, then repeatedly
// selects, archives, registers and uploads until the operator stops.

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::CloudService;
use crate::archive;
use crate::error::Result;
use crate::project::{self, Project};
use crate::quota::{self, Credential};
use crate::selection;
use crate::ui::{self, Operator};
use crate::upload;

/// Filesystem and splitting settings of a session.
#[derive(Debug, Clone)]
pub struct Settings {
    pub images_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub token_file: PathBuf,
    pub split_size: u64,
}

/// Names of the projects started during a session.
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub started: Vec<String>,
}

fn spinner(msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Run the whole session. Returns once the operator declines to continue,
/// or with the first fatal error.
pub fn run<C, O>(settings: &Settings, service: &C, operator: &mut O) -> Result<Summary>
where
    C: CloudService + ?Sized,
    O: Operator + ?Sized,
{
    ui::step("Verifying token...");
    let credential = quota::load_credential(service, &settings.token_file)?;
    ui::info(&format!("File size limit: {}", ui::megabytes(credential.limit_filesize)));
    ui::info(&format!("Photo limit: {}", credential.limit_photos));
    ui::info(&format!("Available credit: {}", credential.credit));

    let mut summary = Summary::default();
    loop {
        match process_once(settings, service, operator, &credential) {
            Ok(Some(project)) => summary.started.push(project.name().to_string()),
            Ok(None) => {}
            Err(e) if !e.is_fatal() => {
                tracing::warn!(error = %e, "iteration abandoned");
                ui::warn(&e.to_string());
            }
            Err(e) => return Err(e),
        }
        if !operator.confirm_another()? {
            ui::info("Done.");
            return Ok(summary);
        }
    }
}

/// One iteration: pick folders, build the selection, archive, register and
/// upload it. `None` when there was nothing to pick or the operator picked
/// nothing.
fn process_once<C, O>(
    settings: &Settings,
    service: &C,
    operator: &mut O,
    credential: &Credential,
) -> Result<Option<Project>>
where
    C: CloudService + ?Sized,
    O: Operator + ?Sized,
{
    ui::step("Preparing image set...");
    let available = selection::list_folders(&settings.images_dir)?;
    if available.is_empty() {
        ui::error(&format!("No folders found in {}", settings.images_dir.display()));
        return Ok(None);
    }
    let folders = operator.choose_folders(&available)?;
    if folders.is_empty() {
        tracing::info!("no folders chosen");
        return Ok(None);
    }

    let selection = selection::build(&settings.images_dir, &folders, credential)?;
    ui::info(&format!("Total images: {}", selection.photo_count()));
    ui::info(&format!("Total set size: {}", ui::megabytes(selection.total_size())));

    ui::step("Compressing images...");
    let zipping = spinner("Writing archive...");
    let staged = archive::package(
        &settings.images_dir,
        &selection,
        &settings.temp_dir,
        settings.split_size,
        Utc::now(),
    );
    zipping.finish_and_clear();
    let staged = staged?;
    ui::info(&format!("Project name: {}", staged.name));
    ui::info(&format!("Parts created: {}", staged.parts.len()));

    ui::step("Preparing project on the OpenScanCloud server...");
    let project = project::register(service, credential, staged)?;

    ui::step("Uploading files...");
    upload::upload_and_start(service, credential, &project)?;
    ui::step("Processing started. You will receive an email soon.");
    Ok(Some(project))
}
