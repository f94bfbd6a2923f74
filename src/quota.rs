// Quota authority: the per-user token and the limits the service attaches
// to it. Runs once at startup; the resulting Credential lives for the
// whole run.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::api::CloudService;
use crate::error::{Result, UploaderError};

/// A verified token with its usage limits.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub token: String,
    /// Largest total image size accepted in one project, in bytes.
    pub limit_filesize: u64,
    /// Largest number of photos accepted in one project.
    pub limit_photos: u64,
    pub credit: f64,
}

/// Read the token stored at `path`. A missing or blank file is
/// `MissingCredential`.
pub fn read_token(path: &Path) -> Result<String> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(UploaderError::MissingCredential {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    let token = data.trim();
    if token.is_empty() {
        return Err(UploaderError::MissingCredential {
            path: path.to_path_buf(),
        });
    }
    Ok(token.to_string())
}

/// Ask the service for the limits of `token`.
pub fn verify_token<C: CloudService + ?Sized>(service: &C, token: String) -> Result<Credential> {
    let info = service.token_info(&token)?;
    tracing::info!(
        limit_filesize = info.limit_filesize,
        limit_photos = info.limit_photos,
        credit = info.credit,
        "token verified"
    );
    Ok(Credential {
        token,
        limit_filesize: info.limit_filesize,
        limit_photos: info.limit_photos,
        credit: info.credit,
    })
}

/// Read the token file and verify it. No request is made when the file is
/// unusable.
pub fn load_credential<C: CloudService + ?Sized>(service: &C, path: &Path) -> Result<Credential> {
    let token = read_token(path)?;
    verify_token(service, token)
}
