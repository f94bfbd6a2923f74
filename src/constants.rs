// Fixed values shared by the pipeline: service defaults, the image
// allow-list and the staging conventions.

/// Default OpenScanCloud endpoint.
pub const DEFAULT_SERVER: &str = "http://openscanfeedback.dnsuser.de:1334/";

/// Shared identity every client authenticates with. The per-user token is
/// sent as a query parameter on top of it.
pub const DEFAULT_USER: &str = "openscan";
pub const DEFAULT_PASSWORD: &str = "free";

/// Largest part sent in one transfer (200 MB). The whole archive may be
/// several parts.
pub const DEFAULT_SPLIT_SIZE: u64 = 200_000_000;

/// Image extensions accepted into a selection. Matching is case-sensitive.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".JPG", ".JPEG", ".png", ".PNG"];

/// Appended to the timestamp to form the project (and archive) name.
pub const PROJECT_SUFFIX: &str = "-OSC.zip";

/// Entry in the staging directory that clearing must leave alone.
pub const PLACEHOLDER_FILE: &str = ".gitkeep";

pub const DEFAULT_IMAGES_DIR: &str = "images";
pub const DEFAULT_TEMP_DIR: &str = "temp";

/// Token file looked up in the working directory first.
pub const TOKEN_FILE_NAME: &str = "token_OSC";

/// Fallback token file in the user's home directory.
pub const HOME_TOKEN_FILE_NAME: &str = ".osc_token";
