// Project registrar: announces a staged archive to the service and pairs
// each part with the upload link the service hands back.

use crate::api::{CloudService, ProjectRequest};
use crate::archive::{Archive, Part};
use crate::error::{Result, UploaderError};
use crate::quota::Credential;

/// An archive the service knows about. `targets[i]` receives `parts()[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    archive: Archive,
    targets: Vec<String>,
}

impl Project {
    pub fn name(&self) -> &str {
        &self.archive.name
    }

    pub fn photo_count(&self) -> u64 {
        self.archive.photo_count
    }

    pub fn total_size(&self) -> u64 {
        self.archive.total_size
    }

    pub fn parts(&self) -> &[Part] {
        &self.archive.parts
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Each part with the link it must be sent to, in upload order.
    pub fn transfers(&self) -> impl Iterator<Item = (&Part, &str)> {
        self.archive
            .parts
            .iter()
            .zip(self.targets.iter().map(String::as_str))
    }

    /// Metadata sent with `createProject` and `startProject`.
    pub fn request(&self, credential: &Credential) -> ProjectRequest {
        request_for(&self.archive, credential)
    }
}

fn request_for(archive: &Archive, credential: &Credential) -> ProjectRequest {
    ProjectRequest {
        token: credential.token.clone(),
        project: archive.name.clone(),
        photos: archive.photo_count,
        filesize: archive.total_size,
        parts: archive.parts.len(),
    }
}

/// Create the project on the service and attach the returned upload links.
///
/// A refused request, or a link count that does not match the part count,
/// is `ProjectCreationFailed`.
pub fn register<C: CloudService + ?Sized>(
    service: &C,
    credential: &Credential,
    archive: Archive,
) -> Result<Project> {
    let request = request_for(&archive, credential);
    let targets = service.create_project(&request)?;
    if targets.len() != archive.parts.len() {
        return Err(UploaderError::ProjectCreationFailed(format!(
            "service returned {} upload links for {} parts",
            targets.len(),
            archive.parts.len()
        )));
    }
    tracing::info!(project = %archive.name, parts = targets.len(), "project registered");
    Ok(Project { archive, targets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockCloudService;
    use std::path::PathBuf;

    fn credential() -> Credential {
        Credential {
            token: "tok".into(),
            limit_filesize: 1_000_000_000,
            limit_photos: 100,
            credit: 3.0,
        }
    }

    fn archive(parts: usize) -> Archive {
        Archive {
            name: "170000000000-OSC.zip".into(),
            photo_count: 12,
            total_size: 450,
            parts: (1..=parts)
                .map(|index| Part {
                    index,
                    path: PathBuf::from(format!("temp/170000000000-OSC.zip_{index}")),
                    offset: (index as u64 - 1) * 200,
                    size: 200,
                })
                .collect(),
        }
    }

    #[test]
    fn sends_archive_metadata_and_keeps_link_order() {
        let mut service = MockCloudService::new();
        service
            .expect_create_project()
            .withf(|req: &ProjectRequest| {
                req.token == "tok"
                    && req.project == "170000000000-OSC.zip"
                    && req.photos == 12
                    && req.filesize == 450
                    && req.parts == 3
            })
            .times(1)
            .returning(|_| Ok(vec!["u1".into(), "u2".into(), "u3".into()]));

        let project = register(&service, &credential(), archive(3)).unwrap();
        let pairs: Vec<_> = project.transfers().map(|(p, t)| (p.index, t)).collect();
        assert_eq!(pairs, vec![(1, "u1"), (2, "u2"), (3, "u3")]);
        assert_eq!(project.name(), "170000000000-OSC.zip");
        assert_eq!(project.request(&credential()).parts, 3);
    }

    #[test]
    fn refused_registration_is_fatal() {
        let mut service = MockCloudService::new();
        service
            .expect_create_project()
            .returning(|_| Err(UploaderError::ProjectCreationFailed("500".into())));
        let err = register(&service, &credential(), archive(1)).unwrap_err();
        assert!(matches!(err, UploaderError::ProjectCreationFailed(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn link_count_must_match_parts() {
        let mut service = MockCloudService::new();
        service
            .expect_create_project()
            .returning(|_| Ok(vec!["only-one".into()]));
        let err = register(&service, &credential(), archive(2)).unwrap_err();
        assert!(matches!(err, UploaderError::ProjectCreationFailed(_)));
    }
}
