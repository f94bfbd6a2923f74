// Uploader: sends the parts of a registered project one after another and
// only then asks the service to start processing.

use indicatif::{ProgressBar, ProgressStyle};

use crate::api::CloudService;
use crate::error::{Result, UploaderError};
use crate::project::Project;
use crate::quota::Credential;

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    let style = ProgressStyle::with_template("{spinner} [{bar:30}] part {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style.progress_chars("=> "));
    bar
}

/// Upload every part of `project` to its link, in part order, then send the
/// start request.
///
/// The first failed transfer stops the upload with `UploadFailed`; the
/// remaining parts are not sent and processing is never started.
pub fn upload_and_start<C: CloudService + ?Sized>(
    service: &C,
    credential: &Credential,
    project: &Project,
) -> Result<()> {
    let bar = progress_bar(project.parts().len() as u64);
    for (part, target) in project.transfers() {
        bar.set_message(format!("{} bytes", part.size));
        tracing::info!(part = part.index, size = part.size, "uploading part");
        if let Err(e) = service.upload_part(target, &part.path) {
            bar.abandon();
            return Err(match e {
                UploaderError::UploadFailed { reason, .. } => UploaderError::UploadFailed {
                    index: part.index,
                    reason,
                },
                other => UploaderError::UploadFailed {
                    index: part.index,
                    reason: other.to_string(),
                },
            });
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    let request = project.request(credential);
    service.start_project(&request, project.targets())?;
    tracing::info!(project = %project.name(), "processing started");
    Ok(())
}
