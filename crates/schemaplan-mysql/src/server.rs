//! Server flavor, version and defaults.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Marker MariaDB puts in its version string.
const MARIADB_MARKER: &str = "MariaDB";

/// Prefix MariaDB adds to its version for old replication clients.
const REPLICATION_PREFIX: &str = "5.5.5-";

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid server version {0:?}")]
pub struct ParseVersionError(pub String);

/// A `major.minor.patch` server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl ServerVersion {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for ServerVersion {
    type Err = ParseVersionError;

    /// Parses the leading dotted digits of `s`, ignoring any build suffix
    /// such as `-log` or `-MariaDB`. Missing components default to zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let end = s
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(s.len());
        let mut parts = s[..end].split('.').map(str::parse::<u32>);
        let mut next = |required: bool| match parts.next() {
            Some(Ok(n)) => Ok(n),
            None if !required => Ok(0),
            _ => Err(ParseVersionError(s.to_string())),
        };
        Ok(Self {
            major: next(true)?,
            minor: next(false)?,
            patch: next(false)?,
        })
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Server implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flavor {
    /// Oracle MySQL.
    #[default]
    Mysql,
    /// MariaDB.
    MariaDb,
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mysql => f.write_str("MySQL"),
            Self::MariaDb => f.write_str("MariaDB"),
        }
    }
}

/// What the planner knows about the target server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// Server implementation.
    pub flavor: Flavor,
    /// Server version.
    pub version: ServerVersion,
    /// Default character set (`@@character_set_server`).
    pub charset: String,
    /// Default collation (`@@collation_server`).
    pub collation: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            flavor: Flavor::Mysql,
            version: ServerVersion::new(8, 0, 0),
            charset: "utf8mb4".to_string(),
            collation: "utf8mb4_0900_ai_ci".to_string(),
        }
    }
}

impl ServerInfo {
    /// Builds server info from the values of `@@version`,
    /// `@@character_set_server` and `@@collation_server`.
    ///
    /// # Errors
    ///
    /// Returns an error if the version string has no leading version number.
    pub fn from_variables(
        version: &str,
        charset: impl Into<String>,
        collation: impl Into<String>,
    ) -> Result<Self, ParseVersionError> {
        let flavor = if version.contains(MARIADB_MARKER) {
            Flavor::MariaDb
        } else {
            Flavor::Mysql
        };
        let version = match flavor {
            Flavor::MariaDb => version.strip_prefix(REPLICATION_PREFIX).unwrap_or(version),
            Flavor::Mysql => version,
        };
        Ok(Self {
            flavor,
            version: version.parse()?,
            charset: charset.into(),
            collation: collation.into(),
        })
    }

    /// Returns true for MariaDB servers.
    #[must_use]
    pub const fn is_mariadb(&self) -> bool {
        matches!(self.flavor, Flavor::MariaDb)
    }

    /// Returns true if the server version is older than `version`.
    #[must_use]
    pub fn version_lt(&self, version: ServerVersion) -> bool {
        self.version < version
    }

    /// Returns true if JSON columns need an explicit `json_valid` check.
    ///
    /// MariaDB implements `JSON` as an alias of `LONGTEXT` and only adds the
    /// check itself starting with 10.4.3.
    #[must_use]
    pub fn needs_json_check(&self) -> bool {
        self.is_mariadb() && self.version_lt(ServerVersion::new(10, 4, 3))
    }
}
