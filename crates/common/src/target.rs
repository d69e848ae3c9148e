//! Remote bucket targets
//!
//! A volume is created with a set of free-form string options. They are
//! converted here, once, into a [`RemoteTarget`]: the endpoint, bucket and
//! credentials that identify which remote bucket a volume name refers to.
//! Nothing past this module sees the raw option map.
//!
//! Two targets are the same target only if all four fields are equal. That
//! equality is what [`matches_existing`] uses to decide whether a repeated
//! create is an idempotent no-op or a conflict.

use std::collections::HashMap;
use std::fmt;

use url::Url;

/// Option key for the endpoint of the remote server.
pub const ENDPOINT_OPTION: &str = "endpoint";
/// Option key for the bucket to mount.
pub const BUCKET_OPTION: &str = "bucket";
/// Option key for the access key.
pub const ACCESS_KEY_OPTION: &str = "access-key";
/// Option key for the secret key.
pub const SECRET_KEY_OPTION: &str = "secret-key";

/// One of the four fields making up a [`RemoteTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetField {
    Endpoint,
    Bucket,
    AccessKey,
    SecretKey,
}

impl TargetField {
    /// Fields in the order they are validated and compared.
    pub const ALL: [TargetField; 4] = [
        TargetField::Endpoint,
        TargetField::Bucket,
        TargetField::AccessKey,
        TargetField::SecretKey,
    ];

    /// The volume option key that carries this field.
    pub fn option_key(&self) -> &'static str {
        match self {
            TargetField::Endpoint => ENDPOINT_OPTION,
            TargetField::Bucket => BUCKET_OPTION,
            TargetField::AccessKey => ACCESS_KEY_OPTION,
            TargetField::SecretKey => SECRET_KEY_OPTION,
        }
    }

    /// Alternative spellings accepted for the option key.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            TargetField::AccessKey => &["access_key", "accessKey"],
            TargetField::SecretKey => &["secret_key", "secretKey"],
            _ => &[],
        }
    }

    fn is_secret(&self) -> bool {
        matches!(self, TargetField::AccessKey | TargetField::SecretKey)
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_key())
    }
}

/// Connection details of the remote bucket a volume is bound to.
///
/// Immutable once built. Construct it with [`validate`] or [`RemoteTarget::new`].
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    endpoint: Url,
    bucket: String,
    access_key: String,
    secret_key: String,
}

impl RemoteTarget {
    /// Build a target from already separated values.
    ///
    /// Applies the same checks as [`validate`].
    pub fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, ValidationError> {
        let endpoint = require(TargetField::Endpoint, Some(endpoint))?;
        let bucket = require(TargetField::Bucket, Some(bucket))?;
        let access_key = require(TargetField::AccessKey, Some(access_key))?;
        let secret_key = require(TargetField::SecretKey, Some(secret_key))?;

        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            bucket: bucket.to_string(),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Whether the endpoint scheme asks for TLS.
    pub fn is_secure(&self) -> bool {
        self.endpoint.scheme() == "https"
    }

    /// URL of the bucket itself, e.g. `https://play.min.io:9000/imgs`.
    pub fn bucket_url(&self) -> String {
        format!(
            "{}/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            self.bucket
        )
    }

    fn field_differs(&self, other: &RemoteTarget, field: TargetField) -> bool {
        match field {
            TargetField::Endpoint => self.endpoint != other.endpoint,
            TargetField::Bucket => self.bucket != other.bucket,
            TargetField::AccessKey => self.access_key != other.access_key,
            TargetField::SecretKey => self.secret_key != other.secret_key,
        }
    }
}

impl fmt::Debug for RemoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTarget")
            .field("endpoint", &self.endpoint.as_str())
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Reasons a set of volume options cannot be turned into a [`RemoteTarget`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no options provided, expected -o endpoint=... -o bucket=... -o access-key=... -o secret-key=...")]
    NoOptions,
    #[error("{0} option cannot be empty")]
    MissingField(TargetField),
    #[error("endpoint {0:?} is not a valid http(s) URL, expected e.g. https://my-minio.com:9000")]
    MalformedEndpoint(String),
    #[error("volume name cannot be empty")]
    EmptyName,
    #[error("volume name {0:?} must be a single path component")]
    InvalidName(String),
}

/// A create request named an existing volume but described a different target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("volume already exists with a different {field}{detail}, cannot create duplicate volume")]
pub struct ConflictError {
    pub field: TargetField,
    detail: String,
}

impl ConflictError {
    fn new(field: TargetField, existing: &RemoteTarget) -> Self {
        let detail = match field {
            TargetField::Endpoint => format!(" (bound to {})", existing.endpoint),
            TargetField::Bucket => format!(" (bound to bucket {})", existing.bucket),
            _ => String::new(),
        };
        Self { field, detail }
    }
}

/// Turn raw volume options into a [`RemoteTarget`].
///
/// Fields are checked in [`TargetField::ALL`] order and the first missing or
/// empty one is reported. The endpoint must be an `http` or `https` URL with a
/// host; the parsed URL is what gets stored.
pub fn validate(options: Option<&HashMap<String, String>>) -> Result<RemoteTarget, ValidationError> {
    let options = options.ok_or(ValidationError::NoOptions)?;

    let lookup = |field: TargetField| -> Result<&str, ValidationError> {
        let value = std::iter::once(field.option_key())
            .chain(field.aliases().iter().copied())
            .find_map(|key| options.get(key))
            .map(String::as_str);
        require(field, value)
    };

    let endpoint = lookup(TargetField::Endpoint)?;
    let bucket = lookup(TargetField::Bucket)?;
    let access_key = lookup(TargetField::AccessKey)?;
    let secret_key = lookup(TargetField::SecretKey)?;

    Ok(RemoteTarget {
        endpoint: parse_endpoint(endpoint)?,
        bucket: bucket.to_string(),
        access_key: access_key.to_string(),
        secret_key: secret_key.to_string(),
    })
}

/// Check that a volume name can be used as a directory under the mount root.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name == "." || name == ".." || name.contains('/') || name.contains('\0') {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Compare the target of an existing volume with the one a create request asks for.
///
/// Reports the first field that differs. Identical targets are a match.
pub fn matches_existing(
    existing: &RemoteTarget,
    requested: &RemoteTarget,
) -> Result<(), ConflictError> {
    match TargetField::ALL
        .into_iter()
        .find(|field| existing.field_differs(requested, *field))
    {
        Some(field) => Err(ConflictError::new(field, existing)),
        None => Ok(()),
    }
}

fn require(field: TargetField, value: Option<&str>) -> Result<&str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ValidationError> {
    let malformed = || ValidationError::MalformedEndpoint(endpoint.to_string());
    let url = Url::parse(endpoint).map_err(|_| malformed())?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(url),
        _ => Err(malformed()),
    }
}
