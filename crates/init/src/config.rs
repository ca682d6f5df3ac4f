//! Provisioning configuration loaded from environment variables.
//!
//! All values have defaults that reproduce the two-fragment local setup
//! (`p1` on port 14331, `p2` on port 14332). Invalid values are reported
//! as [`ConfigError`] rather than silently replaced.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use research_core::backoff::BackoffPolicy;
use research_core::error::CoreError;
use research_core::fragment::{DatabaseName, Department, FragmentId, FragmentMap};
use research_core::seed::SeedCatalog;
use research_db::ConnectionProfile;

/// Fragments provisioned when `RESEARCH_FRAGMENTS` is unset.
pub const DEFAULT_FRAGMENTS: &str = "p1,p2";

/// Port of the first fragment's server; each later fragment adds one.
pub const DEFAULT_BASE_PORT: u16 = 14331;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_ADMIN_DATABASE: &str = "postgres";
const DEFAULT_USER: &str = "postgres";
const DEFAULT_PASSWORD: &str = "postgres";
const DEFAULT_CREATION_PAUSE_SECS: u64 = 2;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },

    #[error("RESEARCH_FRAGMENTS does not name any fragment")]
    NoFragments,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to read seed file {}: {source}", .path.display())]
    SeedFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything needed to provision one fragment.
#[derive(Debug, Clone)]
pub struct FragmentProfile {
    pub fragment: FragmentId,
    pub department: Department,
    /// Database holding the fragment's tables.
    pub database: DatabaseName,
    /// Connection to the server's administrative database.
    pub admin: ConnectionProfile,
    /// Connection to [`FragmentProfile::database`] on the same server.
    pub target: ConnectionProfile,
}

/// Provisioning configuration.
#[derive(Debug, Clone)]
pub struct InitConfig {
    /// Fragments in provisioning order.
    pub fragments: Vec<FragmentProfile>,
    /// Retry budget for server availability probes.
    pub probe: BackoffPolicy,
    /// Wait after `CREATE DATABASE` before probing the new database.
    pub creation_pause: Duration,
    /// JSON seed catalog replacing the built-in rows.
    pub seed_file: Option<PathBuf>,
}

impl InitConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                            |
    /// |----------------------------------|------------------------------------|
    /// | `RESEARCH_FRAGMENTS`             | `p1,p2`                            |
    /// | `RESEARCH_<F>_HOST`              | `localhost`                        |
    /// | `RESEARCH_<F>_PORT`              | `14331` + fragment index           |
    /// | `RESEARCH_<F>_DATABASE`          | `ResearchDB_<F>`                   |
    /// | `RESEARCH_<F>_DEPARTMENT`        | `<F>`                              |
    /// | `RESEARCH_<F>_ADMIN_DATABASE`    | `postgres`                         |
    /// | `RESEARCH_<F>_USER`              | `DB_USER`, else `postgres`         |
    /// | `RESEARCH_<F>_PASSWORD`          | `DB_PASSWORD`, else `postgres`     |
    /// | `RESEARCH_<F>_TRUST_CERT`        | `true`                             |
    /// | `PROBE_MAX_ATTEMPTS`             | `30`                               |
    /// | `PROBE_MAX_DELAY_SECS`           | `30`                               |
    /// | `PROBE_CONNECT_TIMEOUT_SECS`     | `5`                                |
    /// | `DB_CREATE_PAUSE_SECS`           | `2`                                |
    /// | `RESEARCH_SEED_FILE`             | unset (built-in seed rows)         |
    ///
    /// `<F>` is the uppercased fragment name, e.g. `RESEARCH_P1_PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`InitConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let names = env
            .get("RESEARCH_FRAGMENTS")
            .unwrap_or_else(|| DEFAULT_FRAGMENTS.to_string());
        let mut fragments = Vec::new();
        for (index, name) in names
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .enumerate()
        {
            let fragment = FragmentId::parse(name)?;
            fragments.push(env.fragment_profile(fragment, index)?);
        }
        if fragments.is_empty() {
            return Err(ConfigError::NoFragments);
        }

        // Rejects two fragments with the same name or department.
        FragmentMap::from_pairs(
            fragments
                .iter()
                .map(|p| (p.fragment.clone(), p.department.clone())),
        )?;

        let defaults = BackoffPolicy::default();
        let max_attempts: u32 = env.parse("PROBE_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "PROBE_MAX_ATTEMPTS".into(),
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        let probe = BackoffPolicy {
            max_attempts,
            max_delay: env.secs("PROBE_MAX_DELAY_SECS", defaults.max_delay)?,
            connect_timeout: env.secs("PROBE_CONNECT_TIMEOUT_SECS", defaults.connect_timeout)?,
            ..defaults
        };

        Ok(Self {
            fragments,
            probe,
            creation_pause: env.secs(
                "DB_CREATE_PAUSE_SECS",
                Duration::from_secs(DEFAULT_CREATION_PAUSE_SECS),
            )?,
            seed_file: env.get("RESEARCH_SEED_FILE").map(PathBuf::from),
        })
    }

    /// Department ↔ fragment map of the configured fragments.
    pub fn fragment_map(&self) -> Result<FragmentMap, CoreError> {
        FragmentMap::from_pairs(
            self.fragments
                .iter()
                .map(|p| (p.fragment.clone(), p.department.clone())),
        )
    }

    /// The seed catalog from `seed_file`, or the built-in one.
    pub fn load_seed_catalog(&self) -> Result<SeedCatalog, ConfigError> {
        let Some(path) = &self.seed_file else {
            return Ok(SeedCatalog::builtin());
        };
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::SeedFile {
            path: path.clone(),
            source,
        })?;
        Ok(SeedCatalog::from_json(&json)?)
    }
}

/// Variable lookup with the parsing rules shared by every setting.
struct Env<L>(L);

impl<L> Env<L>
where
    L: Fn(&str) -> Option<String>,
{
    /// The trimmed value of `key`. Blank counts as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: e.to_string(),
                value,
            }),
        }
    }

    fn secs(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        self.parse(key, default.as_secs()).map(Duration::from_secs)
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var: key.to_string(),
                value,
                reason: "expected true or false".into(),
            }),
        }
    }

    fn fragment_profile(
        &self,
        fragment: FragmentId,
        index: usize,
    ) -> Result<FragmentProfile, ConfigError> {
        let key = fragment.env_key();
        let var = |suffix: &str| format!("RESEARCH_{key}_{suffix}");

        let default_port =
            DEFAULT_BASE_PORT.saturating_add(u16::try_from(index).unwrap_or(u16::MAX));

        let database = DatabaseName::parse(
            &self
                .get(&var("DATABASE"))
                .unwrap_or_else(|| format!("ResearchDB_{key}")),
        )?;
        let department =
            Department::parse(&self.get(&var("DEPARTMENT")).unwrap_or_else(|| key.clone()))?;

        let admin = ConnectionProfile {
            host: self
                .get(&var("HOST"))
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.parse(&var("PORT"), default_port)?,
            database: self
                .get(&var("ADMIN_DATABASE"))
                .unwrap_or_else(|| DEFAULT_ADMIN_DATABASE.to_string()),
            username: self
                .get(&var("USER"))
                .or_else(|| self.get("DB_USER"))
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: self
                .get(&var("PASSWORD"))
                .or_else(|| self.get("DB_PASSWORD"))
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            trust_server_certificate: self.flag(&var("TRUST_CERT"), true)?,
        };
        let target = admin.with_database(database.as_str());

        Ok(FragmentProfile {
            fragment,
            department,
            database,
            admin,
            target,
        })
    }
}
