use crate::host::ServerHost;
use crate::java;
use crate::signature;
use crate::version::{Gate, ServerVersion, VersionFlags};
use anyhow::Context;
use errors::CompatError;
use jni::JNIEnv;
use log::{error, info};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

pub mod errors;

mod banner;
mod potion;

pub use banner::DyeColor;

/// Keys identifying the version-gated members carried by the registry.
pub mod keys {
    pub const POTION_FROM_ITEM_STACK: &str = "potion_from_item_stack";
    pub const POTION_GET_EFFECTS: &str = "potion_get_effects";
    pub const POTION_IS_SPLASH: &str = "potion_is_splash";
    pub const BANNER_GET_BASE_COLOR: &str = "banner_get_base_color";
}

/// A version-gated API member declared in the embedded registry.
#[derive(Debug, Deserialize)]
pub struct CompatMember {
    pub class: String,
    pub method: String,
    pub signature: String,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    pub gate: Gate,
}

/// The set of API members that only exist on some server versions.
#[derive(Debug, Deserialize)]
pub struct CompatRegistry {
    members: HashMap<String, CompatMember>,
}

impl CompatRegistry {
    pub fn load() -> Result<CompatRegistry, CompatError> {
        let contents = include_str!("../../compat.json");
        let registry: CompatRegistry = serde_json::from_str(contents)?;

        for (key, member) in &registry.members {
            signature::validate(&member.signature).map_err(|reason| {
                CompatError::RegistrySignature {
                    key: key.clone(),
                    reason,
                }
            })?;
        }

        Ok(registry)
    }

    /// The members whose gate holds under the given flags, and nothing else.
    pub fn members_for(
        &self,
        flags: VersionFlags,
    ) -> impl Iterator<Item = (&str, &CompatMember)> {
        self.members
            .iter()
            .filter(move |(_, member)| flags.allows(member.gate))
            .map(|(key, member)| (key.as_str(), member))
    }
}

/// A member that was verified to exist on the running server.
#[derive(Debug, Clone)]
pub struct ResolvedMethod {
    pub class: String,
    pub name: String,
    pub signature: String,
    pub is_static: bool,
}

impl From<&CompatMember> for ResolvedMethod {
    fn from(member: &CompatMember) -> ResolvedMethod {
        ResolvedMethod {
            class: member.class.clone(),
            name: member.method.clone(),
            signature: member.signature.clone(),
            is_static: member.is_static,
        }
    }
}

/// Stable call surface over API members that differ across server versions.
///
/// Handles are resolved once at startup and never reassigned; a handle is
/// present exactly when its gate held at resolution time.
#[derive(Debug)]
pub struct Compat {
    flags: VersionFlags,
    handles: HashMap<String, ResolvedMethod>,
}

impl Compat {
    pub fn instance() -> &'static Compat {
        Compat::try_instance().unwrap_or_else(|e| {
            error!("Failed to initialize the compat layer: {:?}", e);
            panic!("Failed to initialize the compat layer");
        })
    }

    /// Fallible variant of [`Compat::instance`] for callers that must not
    /// panic, such as the agent entry point.
    pub fn try_instance() -> anyhow::Result<&'static Compat> {
        static INSTANCE: OnceLock<Arc<Compat>> = OnceLock::new();

        if let Some(compat) = INSTANCE.get() {
            return Ok(compat);
        }

        let compat = Compat::attach()?;
        Ok(INSTANCE.get_or_init(|| Arc::new(compat)))
    }

    fn attach() -> anyhow::Result<Compat> {
        let host = ServerHost::instance();
        let mut env = host
            .get_env()
            .context("failed to attach to the server JVM")?;

        let version = ServerVersion::detect(&mut env)?;
        let flags = VersionFlags::from_version(version);
        info!("Detected server {} ({:?})", version, flags);

        Ok(Compat::resolve(&mut env, flags)?)
    }

    /// Verifies every member the flags select and stores its handle.
    ///
    /// A lookup failure here means the member is missing even though its gate
    /// held, so it is surfaced instead of being recorded as absent.
    pub fn resolve(env: &mut JNIEnv, flags: VersionFlags) -> Result<Compat, CompatError> {
        let registry = CompatRegistry::load()?;
        let mut handles = HashMap::new();

        for (key, member) in registry.members_for(flags) {
            let class = env
                .find_class(&member.class)
                .map_err(|e| Self::resolution_error(env, member, e))?;

            let lookup = if member.is_static {
                env.get_static_method_id(&class, &member.method, &member.signature)
                    .map(|_| ())
            } else {
                env.get_method_id(&class, &member.method, &member.signature)
                    .map(|_| ())
            };
            lookup.map_err(|e| Self::resolution_error(env, member, e))?;

            info!(
                "Resolved {}#{} for {} servers",
                member.class, member.method, member.gate
            );
            handles.insert(key.to_string(), ResolvedMethod::from(member));
        }

        Ok(Compat { flags, handles })
    }

    pub fn flags(&self) -> VersionFlags {
        self.flags
    }

    pub fn is_resolved(&self, key: &str) -> bool {
        self.handles.contains_key(key)
    }

    fn env(&self) -> Result<JNIEnv<'static>, CompatError> {
        ServerHost::instance().get_env().map_err(CompatError::Attach)
    }

    /// Shared preamble of every version-gated wrapper.
    ///
    /// The gate check comes first and fails loudly; a handle missing despite
    /// the gate is degraded to `default` with an error log, since crashing
    /// the host server is worse than a wrong but documented value.
    fn gated<T>(
        &self,
        operation: &'static str,
        gate: Gate,
        key: &str,
        reason: &'static str,
        default: T,
        invoke: impl FnOnce(&ResolvedMethod) -> Result<T, CompatError>,
    ) -> Result<T, CompatError> {
        if !self.flags.allows(gate) {
            return Err(CompatError::ContractViolation {
                operation,
                gate,
                reason,
            });
        }

        match self.handles.get(key) {
            Some(method) => invoke(method),
            None => {
                error!(
                    "{}: no resolved handle for '{}' despite the {} flag, returning the safe default",
                    operation, key, gate
                );
                Ok(default)
            }
        }
    }

    fn resolution_error(
        env: &mut JNIEnv,
        member: &CompatMember,
        source: jni::errors::Error,
    ) -> CompatError {
        java::clear_pending_exception(env, &source);
        CompatError::Resolution {
            class: member.class.clone(),
            method: member.method.clone(),
            source,
        }
    }

    fn invocation_error(
        env: &mut JNIEnv,
        method: &ResolvedMethod,
        source: jni::errors::Error,
    ) -> CompatError {
        java::clear_pending_exception(env, &source);
        CompatError::Invocation {
            class: method.class.clone(),
            method: method.name.clone(),
            source,
        }
    }

    #[cfg(test)]
    fn for_tests(flags: VersionFlags, handles: HashMap<String, ResolvedMethod>) -> Compat {
        Compat { flags, handles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ancient() -> VersionFlags {
        VersionFlags {
            is_ancient: true,
            is_legacy: true,
        }
    }

    fn legacy() -> VersionFlags {
        VersionFlags {
            is_ancient: false,
            is_legacy: true,
        }
    }

    fn modern() -> VersionFlags {
        VersionFlags {
            is_ancient: false,
            is_legacy: false,
        }
    }

    fn splash_handle() -> ResolvedMethod {
        ResolvedMethod {
            class: "org/bukkit/potion/Potion".to_string(),
            name: "isSplash".to_string(),
            signature: "()Z".to_string(),
            is_static: false,
        }
    }

    fn selected_keys(flags: VersionFlags) -> Vec<String> {
        let registry = CompatRegistry::load().unwrap();
        let mut keys: Vec<String> = registry
            .members_for(flags)
            .map(|(key, _)| key.to_string())
            .collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn registry_parses_and_signatures_validate() {
        let registry = CompatRegistry::load().unwrap();
        assert_eq!(registry.members.len(), 4);

        let from_item_stack = &registry.members[keys::POTION_FROM_ITEM_STACK];
        assert!(from_item_stack.is_static);
        assert_eq!(from_item_stack.gate, Gate::Ancient);

        let base_color = &registry.members[keys::BANNER_GET_BASE_COLOR];
        assert!(!base_color.is_static);
        assert_eq!(base_color.gate, Gate::Legacy);
    }

    #[test]
    fn ancient_flags_select_every_member() {
        assert_eq!(
            selected_keys(ancient()),
            vec![
                keys::BANNER_GET_BASE_COLOR,
                keys::POTION_FROM_ITEM_STACK,
                keys::POTION_GET_EFFECTS,
                keys::POTION_IS_SPLASH,
            ]
        );
    }

    #[test]
    fn legacy_flags_select_the_banner_member_only() {
        assert_eq!(selected_keys(legacy()), vec![keys::BANNER_GET_BASE_COLOR]);
    }

    #[test]
    fn modern_flags_select_nothing() {
        assert!(selected_keys(modern()).is_empty());
    }

    #[test]
    fn gated_rejects_calls_on_the_wrong_version() {
        let compat = Compat::for_tests(modern(), HashMap::new());

        let result = compat.gated(
            "potion_is_splash",
            Gate::Ancient,
            keys::POTION_IS_SPLASH,
            "not supported here",
            false,
            |_| Ok(true),
        );

        assert!(matches!(
            result,
            Err(CompatError::ContractViolation { gate: Gate::Ancient, .. })
        ));
    }

    #[test]
    fn gated_returns_the_default_when_the_handle_is_missing() {
        let compat = Compat::for_tests(ancient(), HashMap::new());

        let result = compat.gated(
            "potion_is_splash",
            Gate::Ancient,
            keys::POTION_IS_SPLASH,
            "not supported here",
            7,
            |_| Ok(13),
        );

        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn gated_forwards_the_resolved_handle_unchanged() {
        let mut handles = HashMap::new();
        handles.insert(keys::POTION_IS_SPLASH.to_string(), splash_handle());
        let compat = Compat::for_tests(ancient(), handles);

        let result = compat.gated(
            "potion_is_splash",
            Gate::Ancient,
            keys::POTION_IS_SPLASH,
            "not supported here",
            String::new(),
            |method| Ok(format!("{}#{}{}", method.class, method.name, method.signature)),
        );

        assert_eq!(result.unwrap(), "org/bukkit/potion/Potion#isSplash()Z");
    }

    #[test]
    fn is_resolved_reflects_the_handle_set() {
        let mut handles = HashMap::new();
        handles.insert(keys::POTION_IS_SPLASH.to_string(), splash_handle());
        let compat = Compat::for_tests(ancient(), handles);

        assert!(compat.is_resolved(keys::POTION_IS_SPLASH));
        assert!(!compat.is_resolved(keys::BANNER_GET_BASE_COLOR));
    }
}
