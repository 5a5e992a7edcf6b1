//! Global constants used throughout the installer.
//!
//! File names that identify framework plugins, remote-host defaults and the
//! timeouts applied to subprocesses and HTTP requests.

use std::time::Duration;

/// Marker file present in the root of every framework plugin package.
pub const PLUGIN_MARKER_FILE: &str = "adapt-authoring.json";

/// Path, relative to a plugin package root, of its configuration schema.
pub const CONFIG_SCHEMA_FILE: &str = "conf/config.schema.json";

/// Package manifest file name.
pub const PACKAGE_MANIFEST_FILE: &str = "package.json";

/// Directory holding installed modules inside an application checkout.
pub const DEFAULT_MODULES_DIR: &str = "node_modules";

/// Repository (owner/name) of the application on the remote host.
pub const DEFAULT_REPOSITORY: &str = "adapt-security/adapt-authoring";

/// Base URL of the remote host's REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Minimum number of directories read concurrently while scanning a module tree.
pub const MIN_PARALLELISM: usize = 10;

/// Multiplier applied to the CPU core count for scan parallelism.
pub const PARALLELISM_CORE_MULTIPLIER: usize = 2;

/// Core count assumed when `std::thread::available_parallelism()` fails.
pub const FALLBACK_CORE_COUNT: usize = 4;

/// Upper bound on concurrently open directories during a scan.
///
/// Each open directory holds a file descriptor; this stays far below the
/// common 1024 soft limit.
pub const MAX_PARALLEL_DIR_READS: usize = 64;

/// Number of tagged releases requested from the remote host.
pub const RELEASES_PER_PAGE: u32 = 10;

/// Key under which the synthetic super-user registration schema is reported.
pub const SUPER_USER_SCHEMA_KEY: &str = "superuser";

/// Default timeout for a single HTTP request to the remote host.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Attempts made for a remote request that fails at the transport level.
pub const REMOTE_RETRY_ATTEMPTS: usize = 3;

/// Starting delay for exponential backoff between remote retries.
///
/// Multiplied by the backoff factor of 2, so the first retry waits 100ms.
pub const STARTING_BACKOFF_DELAY_MS: u64 = 50;

/// Maximum backoff delay between remote retries (2s).
pub const MAX_BACKOFF_DELAY_MS: u64 = 2_000;

/// Timeout for Git fetch operations (60 seconds).
pub const GIT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for Git clone operations (300 seconds).
///
/// The application repository is large enough that a cold clone on a slow
/// link regularly exceeds two minutes.
pub const GIT_CLONE_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for `git checkout` of a release or branch.
pub const GIT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for short, local git queries such as `git log -1`.
pub const GIT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for `npm install` / `npm ci` (15 minutes).
pub const NPM_INSTALL_TIMEOUT: Duration = Duration::from_secs(900);
