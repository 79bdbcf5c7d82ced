//! Failure audit log and masking of sensitive values in log lines.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{KitError, Result};

const LOG_FILE_NAME: &str = "log.txt";

/// Request parameters whose values never reach the log unmasked.
const SECRET_PARAMS: &[&str] = &[
    "first_name",
    "token",
    "subscriber_code",
    "signed_subscriber_id",
    "code",
    "code_verifier",
    "access_token",
    "refresh_token",
    "client_secret",
];

/// Endpoints whose trailing path segment is a signed subscriber ID.
const SECRET_ENDPOINT_PREFIXES: &[&str] = &["profile/"];

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();
static INNER_CHAR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)[_a-z0-9-]+(\.[_a-z0-9-]+)*@[a-z0-9-]+(\.[a-z0-9-]+)*(\.[a-z]{2,})")
            .expect("email pattern is valid")
    })
}

fn inner_char_pattern() -> &'static Regex {
    INNER_CHAR_PATTERN.get_or_init(|| Regex::new(r"\B[^@.]").expect("mask pattern is valid"))
}

/// Masks every e-mail address in `text`, keeping the first character of each
/// dot/at-separated segment: `john.doe@example.com` becomes
/// `j***.d**@e******.c**`.
pub fn mask_email(text: &str) -> String {
    email_pattern()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            inner_char_pattern().replace_all(&caps[0], "*").into_owned()
        })
        .into_owned()
}

/// Masks all but the last four characters of a secret.
pub fn mask_string(value: &str) -> String {
    let count = value.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let visible: String = value.chars().skip(count - 4).collect();
    format!("{}{visible}", "*".repeat(count - 4))
}

/// Replaces the signed ID in endpoints like `profile/{id}` with asterisks.
pub fn mask_endpoint(endpoint: &str) -> String {
    for prefix in SECRET_ENDPOINT_PREFIXES {
        if let Some(secret) = endpoint.strip_prefix(prefix) {
            return format!("{prefix}{}", "*".repeat(secret.chars().count()));
        }
    }
    endpoint.to_string()
}

/// Copy of `params` with secret values passed through [`mask_string`], at
/// any depth. E-mail addresses are left for [`AuditLog::add`] to mask.
pub fn mask_params(params: &Map<String, Value>) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(key, value)| {
                let masked = match value {
                    Value::String(s) if SECRET_PARAMS.contains(&key.as_str()) => {
                        Value::String(mask_string(s))
                    }
                    Value::Object(nested) => mask_params(nested),
                    other => other.clone(),
                };
                (key.clone(), masked)
            })
            .collect(),
    )
}

/// Append-only text log of API requests and failures, one timestamped line per entry.
///
/// # Example
/// ```no_run
/// use kit_api::audit::AuditLog;
///
/// let log = AuditLog::new("/var/log/kit")?;
/// log.add("API: Error: subscriber jane@example.com not found")?;
/// println!("{}", log.read(50)?);
/// # Ok::<(), kit_api::error::KitError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Open (creating the directory if needed) the log in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(LOG_FILE_NAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Append an entry prefixed with the current UTC time. E-mail addresses
    /// in the entry are masked.
    pub fn add(&self, entry: &str) -> Result<()> {
        let line = format!(
            "({}) {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            mask_email(entry)
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// First `number_of_lines` lines of the log, or an empty string when the
    /// log does not exist.
    pub fn read(&self, number_of_lines: usize) -> Result<String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(String::new()),
            Err(err) => return Err(KitError::Io(err)),
        };
        Ok(contents
            .split_inclusive('\n')
            .take(number_of_lines)
            .collect())
    }

    pub fn clear(&self) -> Result<()> {
        fs::write(&self.path, "")?;
        Ok(())
    }

    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(KitError::Io(err)),
        }
    }
}
