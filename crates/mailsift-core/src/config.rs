//! Mailbox connection settings.

use std::fmt;
use std::path::Path;

use mailsift_imap::{Config, Security};
use mailsift_mime::DEFAULT_HEADER_CHARSET;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Folder opened when the configuration does not name one.
pub const DEFAULT_FOLDER: &str = "INBOX";

/// Connection parameters for one mailbox.
///
/// Deserializes from the deployment's JSON file format:
///
/// ```json
/// {
///   "Host": "imap.exmail.qq.com:993",
///   "TLS": true,
///   "InsecureSkipVerify": false,
///   "User": "robot@example.com",
///   "Pwd": "secret",
///   "Folder": "INBOX",
///   "ReadOnly": false
/// }
/// ```
///
/// Unknown keys are ignored.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MailboxConfig {
    /// Server host, optionally `host:port`.
    pub host: String,
    /// Implicit TLS.
    #[serde(rename = "TLS", default)]
    pub tls: bool,
    /// Accept any server certificate.
    #[serde(default)]
    pub insecure_skip_verify: bool,
    /// Login name.
    pub user: String,
    /// Login password.
    #[serde(rename = "Pwd")]
    pub password: String,
    /// Folder to open.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Open with EXAMINE instead of SELECT.
    #[serde(default)]
    pub read_only: bool,
    /// Charset of raw header bytes, used before encoded-word decoding.
    #[serde(default = "default_header_charset")]
    pub header_charset: String,
}

fn default_folder() -> String {
    DEFAULT_FOLDER.to_string()
}

fn default_header_charset() -> String {
    DEFAULT_HEADER_CHARSET.to_string()
}

impl fmt::Debug for MailboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxConfig")
            .field("host", &self.host)
            .field("tls", &self.tls)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("folder", &self.folder)
            .field("read_only", &self.read_only)
            .field("header_charset", &self.header_charset)
            .finish()
    }
}

impl MailboxConfig {
    /// Settings with TLS on, verification on and the default folder.
    #[must_use]
    pub fn new(host: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            tls: true,
            insecure_skip_verify: false,
            user: user.into(),
            password: password.into(),
            folder: default_folder(),
            read_only: false,
            header_charset: default_header_charset(),
        }
    }

    /// Parses settings from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the JSON is invalid or a required key
    /// is missing.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        if config.folder.is_empty() {
            config.folder = default_folder();
        }
        Ok(config)
    }

    /// Reads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Host name and port, with the port defaulting from the TLS flag.
    #[must_use]
    pub fn host_and_port(&self) -> (String, u16) {
        let default_port = self.security().default_port();
        let host = self.host.trim();

        if let Some(rest) = host.strip_prefix('[')
            && let Some((name, tail)) = rest.split_once(']')
        {
            let port = tail
                .strip_prefix(':')
                .and_then(|p| p.parse().ok())
                .unwrap_or(default_port);
            return (name.to_string(), port);
        }

        match host.rsplit_once(':') {
            Some((name, port)) if !name.contains(':') => match port.parse() {
                Ok(port) => (name.to_string(), port),
                Err(_) => (host.to_string(), default_port),
            },
            _ => (host.to_string(), default_port),
        }
    }

    /// Transport security implied by the TLS flag.
    #[must_use]
    pub const fn security(&self) -> Security {
        if self.tls {
            Security::Implicit
        } else {
            Security::None
        }
    }

    /// Connection settings for the IMAP client.
    #[must_use]
    pub fn imap_config(&self) -> Config {
        let (host, port) = self.host_and_port();
        Config::builder(host)
            .port(port)
            .security(self.security())
            .verify_certificates(!self.insecure_skip_verify)
            .build()
    }
}
