//! Connection settings.

use std::time::Duration;

/// Transport security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// Plain TCP.
    None,
    /// TLS from the first byte.
    #[default]
    Implicit,
}

impl Security {
    /// 993 for TLS, 143 otherwise.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None => 143,
            Self::Implicit => 993,
        }
    }
}

/// Where and how to connect.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Transport security.
    pub security: Security,
    /// Check the server certificate against the webpki roots.
    pub verify_certificates: bool,
    /// Limit for TCP connect plus TLS handshake.
    pub connect_timeout: Duration,
    /// Limit for each command round trip.
    pub io_timeout: Duration,
    /// Limit for the LOGOUT exchange during teardown.
    pub logout_timeout: Duration,
}

impl Config {
    /// Implicit TLS on 993 with verification on.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        ConfigBuilder::new(host).build()
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host)
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: Option<u16>,
    security: Security,
    verify_certificates: bool,
    connect_timeout: Duration,
    io_timeout: Duration,
    logout_timeout: Duration,
}

impl ConfigBuilder {
    /// Builder with defaults: implicit TLS, verification on, 30 s connect,
    /// 60 s I/O and 30 s logout timeouts.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            security: Security::Implicit,
            verify_certificates: true,
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(60),
            logout_timeout: Duration::from_secs(30),
        }
    }

    /// Port; defaults from the security mode.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Transport security.
    #[must_use]
    pub const fn security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Certificate verification.
    #[must_use]
    pub const fn verify_certificates(mut self, verify: bool) -> Self {
        self.verify_certificates = verify;
        self
    }

    /// Connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Per-command timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// LOGOUT timeout.
    #[must_use]
    pub const fn logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = timeout;
        self
    }

    /// Finishes the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            host: self.host,
            port: self.port.unwrap_or_else(|| self.security.default_port()),
            security: self.security,
            verify_certificates: self.verify_certificates,
            connect_timeout: self.connect_timeout,
            io_timeout: self.io_timeout,
            logout_timeout: self.logout_timeout,
        }
    }
}
