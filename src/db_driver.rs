//! Database driver enum identifying supported database backends.

use crate::InstallError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::IntoEnumIterator;

/// The database backend the application will be configured against.
///
/// Each variant corresponds to a driver identifier accepted in user settings
/// (`"mysql"`, `"pgsql"`, `"sqlite"`) and to the prefix of the generated
/// connection string.
///
/// # Example
///
/// ```rust
/// use install_preflight::DbDriver;
///
/// for driver in DbDriver::all() {
///     println!("{}: {}", driver.display_name(), driver.identifier());
/// }
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum DbDriver {
    /// MySQL / MariaDB
    Mysql,
    /// PostgreSQL
    Pgsql,
    /// SQLite, file based
    Sqlite,
}

impl DbDriver {
    /// The identifier used in settings and as the connection string prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use install_preflight::DbDriver;
    ///
    /// assert_eq!(DbDriver::Mysql.identifier(), "mysql");
    /// assert_eq!(DbDriver::Pgsql.identifier(), "pgsql");
    /// ```
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Pgsql => "pgsql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Human-readable name for messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mysql => "MySQL",
            Self::Pgsql => "PostgreSQL",
            Self::Sqlite => "SQLite",
        }
    }

    /// Name of the runtime module providing this driver's client library.
    pub fn module_name(&self) -> &'static str {
        match self {
            Self::Mysql => "pdo_mysql",
            Self::Pgsql => "pdo_pgsql",
            Self::Sqlite => "pdo_sqlite",
        }
    }

    /// Port used when the settings do not name one. File based drivers have none.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::Mysql => Some(3306),
            Self::Pgsql => Some(5432),
            Self::Sqlite => None,
        }
    }

    /// Whether the driver addresses a local file instead of a host and port.
    pub fn is_file_based(&self) -> bool {
        matches!(self, Self::Sqlite)
    }

    /// Iterator over all supported drivers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use install_preflight::DbDriver;
    ///
    /// assert_eq!(DbDriver::all().count(), 3);
    /// ```
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}

impl FromStr for DbDriver {
    type Err = InstallError;

    /// Parse a driver identifier. Anything outside the supported set is a
    /// configuration defect, not a user-correctable input error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|driver| driver.identifier() == s)
            .ok_or_else(|| InstallError::UnknownDriver {
                driver: s.to_string(),
                fix: format!(
                    "Use one of the supported drivers: {}",
                    Self::all()
                        .map(|d| d.identifier())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}

impl std::fmt::Display for DbDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert_eq!(DbDriver::Mysql.identifier(), "mysql");
        assert_eq!(DbDriver::Pgsql.identifier(), "pgsql");
        assert_eq!(DbDriver::Sqlite.identifier(), "sqlite");
    }

    #[test]
    fn test_parse_known_drivers() {
        assert_eq!("mysql".parse::<DbDriver>().unwrap(), DbDriver::Mysql);
        assert_eq!("pgsql".parse::<DbDriver>().unwrap(), DbDriver::Pgsql);
        assert_eq!("sqlite".parse::<DbDriver>().unwrap(), DbDriver::Sqlite);
    }

    #[test]
    fn test_parse_unknown_driver() {
        let err = "oracle".parse::<DbDriver>().unwrap_err();
        assert!(matches!(err, InstallError::UnknownDriver { ref driver, .. } if driver == "oracle"));
        assert!(err.fix_suggestion().contains("mysql"));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("MySQL".parse::<DbDriver>().is_err());
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(DbDriver::Mysql.default_port(), Some(3306));
        assert_eq!(DbDriver::Pgsql.default_port(), Some(5432));
        assert_eq!(DbDriver::Sqlite.default_port(), None);
        assert!(DbDriver::Sqlite.is_file_based());
        assert!(!DbDriver::Mysql.is_file_based());
    }

    #[test]
    fn test_derives() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(DbDriver::Mysql);
        set.insert(DbDriver::Sqlite);
        assert_eq!(set.len(), 2);

        let json = serde_json::to_string(&DbDriver::Pgsql).unwrap();
        assert_eq!(json, "\"pgsql\"");
        let back: DbDriver = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DbDriver::Pgsql);
    }
}
