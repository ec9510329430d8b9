//! API constants

/// Versioned prefix of every JSON endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Path of the served OpenAPI document.
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Multipart overhead allowed on top of the configured file size.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Cache lifetime of served uploads. Files are content-addressed and never change.
pub const FILE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
