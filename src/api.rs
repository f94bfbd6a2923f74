// API client module: a small blocking HTTP client that talks to the
// OpenScanCloud service. Every call is synchronous; the pipeline sends one
// request at a time and waits for the answer.

use anyhow::{Context, Result as AnyResult};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::{Result, UploaderError};

/// Usage limits attached to a token, as returned by `getTokenInfo`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub limit_filesize: u64,
    pub limit_photos: u64,
    pub credit: f64,
}

/// Project metadata sent to `createProject` and `startProject`. Field
/// names are the query parameter names the service expects.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProjectRequest {
    pub token: String,
    pub project: String,
    pub photos: u64,
    pub filesize: u64,
    pub parts: usize,
}

impl ProjectRequest {
    /// Query pairs for `startProject`: the project metadata followed by one
    /// `ulink` pair per upload target, in part order.
    pub fn start_query(&self, ulinks: &[String]) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("token", self.token.clone()),
            ("project", self.project.clone()),
            ("photos", self.photos.to_string()),
            ("filesize", self.filesize.to_string()),
            ("parts", self.parts.to_string()),
        ];
        query.extend(ulinks.iter().map(|link| ("ulink", link.clone())));
        query
    }
}

#[derive(Deserialize, Debug)]
struct CreateProjectResponse {
    ulink: Vec<String>,
}

/// The remote processing service, as seen by the pipeline.
///
/// `ApiClient` talks to the real service; tests use the generated
/// `MockCloudService`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait CloudService {
    /// Look up the limits of `token`. A rejected token is `InvalidCredential`.
    fn token_info(&self, token: &str) -> Result<TokenInfo>;

    /// Register a project and return one upload link per part.
    fn create_project(&self, req: &ProjectRequest) -> Result<Vec<String>>;

    /// Send the raw bytes of the staged part file at `part` to `target`.
    fn upload_part(&self, target: &str, part: &Path) -> Result<()>;

    /// Ask the service to start processing an uploaded project.
    fn start_project(&self, req: &ProjectRequest, ulinks: &[String]) -> Result<()>;
}

/// Blocking API client holding a reqwest client, the base URL of the
/// service and the shared identity every request authenticates with.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    user: String,
    password: String,
}

impl ApiClient {
    /// Build a client for `base_url`. No request timeout is set: a part
    /// upload may legitimately take minutes.
    pub fn new(base_url: &str, user: &str, password: &str) -> AnyResult<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
            password: password.to_string(),
        })
    }

    fn endpoint(&self, cmd: &str) -> String {
        format!("{}/{}", self.base_url, cmd)
    }

    /// GET `cmd` with the given query, authenticated as the shared identity.
    fn call<Q: Serialize + ?Sized>(&self, cmd: &str, query: &Q) -> reqwest::Result<Response> {
        tracing::debug!(cmd, "calling service");
        self.client
            .get(self.endpoint(cmd))
            .basic_auth(&self.user, Some(&self.password))
            .query(query)
            .send()
    }
}

/// Status plus body text of a failed response, for error messages.
fn describe_failure(res: Response) -> String {
    let status = res.status();
    let txt = res.text().unwrap_or_else(|_| "".into());
    if txt.is_empty() {
        status.to_string()
    } else {
        format!("{} - {}", status, txt)
    }
}

impl CloudService for ApiClient {
    fn token_info(&self, token: &str) -> Result<TokenInfo> {
        let res = self.call("getTokenInfo", &[("token", token)])?;
        if !res.status().is_success() {
            return Err(UploaderError::InvalidCredential(describe_failure(res)));
        }
        Ok(res.json::<TokenInfo>()?)
    }

    fn create_project(&self, req: &ProjectRequest) -> Result<Vec<String>> {
        let res = self
            .call("createProject", req)
            .map_err(|e| UploaderError::ProjectCreationFailed(e.to_string()))?;
        if !res.status().is_success() {
            return Err(UploaderError::ProjectCreationFailed(describe_failure(res)));
        }
        let body: CreateProjectResponse = res
            .json()
            .map_err(|e| UploaderError::ProjectCreationFailed(format!("unreadable response: {}", e)))?;
        Ok(body.ulink)
    }

    fn upload_part(&self, target: &str, part: &Path) -> Result<()> {
        let file = File::open(part)?;
        let res = self
            .client
            .post(target)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(file)
            .send()?;
        if !res.status().is_success() {
            // The caller knows the part index and rewraps this.
            return Err(UploaderError::UploadFailed {
                index: 0,
                reason: describe_failure(res),
            });
        }
        Ok(())
    }

    fn start_project(&self, req: &ProjectRequest, ulinks: &[String]) -> Result<()> {
        let res = self
            .call("startProject", &req.start_query(ulinks))
            .map_err(|e| UploaderError::StartFailed(e.to_string()))?;
        if !res.status().is_success() {
            return Err(UploaderError::StartFailed(describe_failure(res)));
        }
        Ok(())
    }
}
