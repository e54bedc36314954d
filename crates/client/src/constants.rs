use std::time::Duration;

/// Public endpoint of the hosted builder service.
pub const DEFAULT_BUILDER_API_URL: &str = "https://api.quarry.build";

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) const REGISTER_PATH: &str = "/v0/register";
pub(crate) const BUILD_PATH: &str = "/v0/build";

pub(crate) const CONTENT_TYPE_JSON: &str = "application/json";
pub(crate) const CONTENT_ENCODING_GZIP: &str = "gzip";

pub(crate) const REGISTER_RESULT_SUCCESS: &str = "success";

/// Chunks in flight between the gzip producer and the request body.
pub(crate) const BODY_CHANNEL_CAPACITY: usize = 16;
