use crate::compat::errors::CompatError;
use crate::java;
use jni::objects::JString;
use jni::JNIEnv;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

const BUKKIT_CLASS: &str = "org/bukkit/Bukkit";

/// The version of the Bukkit API the running server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> ServerVersion {
        ServerVersion {
            major,
            minor,
            patch,
        }
    }

    /// Reads the version from `Bukkit#getBukkitVersion()` on the running server.
    pub fn detect(env: &mut JNIEnv) -> Result<ServerVersion, CompatError> {
        let value = env
            .call_static_method(
                BUKKIT_CLASS,
                "getBukkitVersion",
                "()Ljava/lang/String;",
                &[],
            )
            .map_err(|e| detect_error(env, e))?;
        let value = value.l().map_err(|e| detect_error(env, e))?;
        let raw: String = env
            .get_string(&JString::from(value))
            .map_err(|e| detect_error(env, e))?
            .into();
        raw.parse()
    }
}

fn detect_error(env: &mut JNIEnv, source: jni::errors::Error) -> CompatError {
    java::clear_pending_exception(env, &source);
    CompatError::Invocation {
        class: BUKKIT_CLASS.to_string(),
        method: "getBukkitVersion".to_string(),
        source,
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ServerVersion {
    type Err = CompatError;

    /// Parses Bukkit version strings such as `1.8.8-R0.1-SNAPSHOT` or `1.13-R0.1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let base = s.trim().split('-').next().unwrap_or_default();
        let parts: Vec<&str> = base.split('.').collect();

        if parts.len() != 2 && parts.len() != 3 {
            return Err(CompatError::Version(s.to_string()));
        }

        let number = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| CompatError::Version(s.to_string()))
        };

        let major = number(parts[0])?;
        let minor = number(parts[1])?;
        let patch = if parts.len() == 3 { number(parts[2])? } else { 0 };

        Ok(ServerVersion::new(major, minor, patch))
    }
}

/// The version range guarding a reflective member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gate {
    /// Servers older than 1.9, where splash potions are `Potion` data.
    Ancient,
    /// Servers older than 1.13, before the material flattening.
    Legacy,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Ancient => write!(f, "ancient"),
            Gate::Legacy => write!(f, "legacy"),
        }
    }
}

/// Version classification computed once at startup, immutable afterwards.
///
/// `is_ancient` implies `is_legacy`: every pre-1.9 server is also pre-1.13.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionFlags {
    pub is_ancient: bool,
    pub is_legacy: bool,
}

impl VersionFlags {
    pub fn from_version(version: ServerVersion) -> VersionFlags {
        VersionFlags {
            is_ancient: version < ServerVersion::new(1, 9, 0),
            is_legacy: version < ServerVersion::new(1, 13, 0),
        }
    }

    pub fn allows(&self, gate: Gate) -> bool {
        match gate {
            Gate::Ancient => self.is_ancient,
            Gate::Legacy => self.is_legacy,
        }
    }
}
