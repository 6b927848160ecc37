use crate::compat::errors::CompatError;
use crate::compat::{keys, Compat};
use crate::java;
use crate::version::Gate;
use jni::objects::JObject;
use log::warn;

/// Fallback when the base color cannot be read.
const DEFAULT_COLOR: DyeColor = DyeColor::White;

/// The sixteen Bukkit dye colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DyeColor {
    White,
    Orange,
    Magenta,
    LightBlue,
    Yellow,
    Lime,
    Pink,
    Gray,
    LightGray,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    Black,
}

impl DyeColor {
    pub fn from_java_name(name: &str) -> Option<DyeColor> {
        let color = match name {
            "WHITE" => DyeColor::White,
            "ORANGE" => DyeColor::Orange,
            "MAGENTA" => DyeColor::Magenta,
            "LIGHT_BLUE" => DyeColor::LightBlue,
            "YELLOW" => DyeColor::Yellow,
            "LIME" => DyeColor::Lime,
            "PINK" => DyeColor::Pink,
            "GRAY" => DyeColor::Gray,
            // Pre-1.13 servers call this color SILVER
            "SILVER" | "LIGHT_GRAY" => DyeColor::LightGray,
            "CYAN" => DyeColor::Cyan,
            "PURPLE" => DyeColor::Purple,
            "BLUE" => DyeColor::Blue,
            "BROWN" => DyeColor::Brown,
            "GREEN" => DyeColor::Green,
            "RED" => DyeColor::Red,
            "BLACK" => DyeColor::Black,
            _ => return None,
        };
        Some(color)
    }
}

impl Compat {
    /// Reads the base color of a `BannerMeta`.
    ///
    /// Defaults to white when the reflective handle is missing, when the
    /// meta carries no color or when the color name is unrecognized.
    pub fn banner_base_color(&self, meta: &JObject) -> Result<DyeColor, CompatError> {
        self.gated(
            "banner_base_color",
            Gate::Legacy,
            keys::BANNER_GET_BASE_COLOR,
            "derive the color from the banner material name instead",
            DEFAULT_COLOR,
            |method| {
                let mut env = self.env()?;

                let value = env
                    .call_method(meta, &method.name, &method.signature, &[])
                    .map_err(|e| Self::invocation_error(&mut env, method, e))?;
                let color = value
                    .l()
                    .map_err(|e| Self::invocation_error(&mut env, method, e))?;

                if color.is_null() {
                    warn!("BannerMeta#getBaseColor returned null, falling back to white");
                    return Ok(DEFAULT_COLOR);
                }

                let name = java::enum_name(&mut env, &color)
                    .map_err(|e| Self::invocation_error(&mut env, method, e))?;
                match DyeColor::from_java_name(&name) {
                    Some(color) => Ok(color),
                    None => {
                        warn!("Unknown dye color '{}', falling back to white", name);
                        Ok(DEFAULT_COLOR)
                    }
                }
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionFlags;
    use std::collections::HashMap;

    #[test]
    fn banner_wrapper_rejects_flattened_servers() {
        let compat = Compat::for_tests(
            VersionFlags {
                is_ancient: false,
                is_legacy: false,
            },
            HashMap::new(),
        );

        assert!(matches!(
            compat.banner_base_color(&JObject::null()),
            Err(CompatError::ContractViolation { gate: Gate::Legacy, .. })
        ));
    }

    #[test]
    fn banner_wrapper_defaults_to_white_without_a_handle() {
        let compat = Compat::for_tests(
            VersionFlags {
                is_ancient: false,
                is_legacy: true,
            },
            HashMap::new(),
        );

        assert_eq!(
            compat.banner_base_color(&JObject::null()).unwrap(),
            DyeColor::White
        );
    }

    #[test]
    fn dye_colors_map_java_names() {
        assert_eq!(DyeColor::from_java_name("WHITE"), Some(DyeColor::White));
        assert_eq!(DyeColor::from_java_name("LIGHT_BLUE"), Some(DyeColor::LightBlue));
        assert_eq!(DyeColor::from_java_name("BLACK"), Some(DyeColor::Black));

        // Both spellings of light gray resolve to the same color
        assert_eq!(DyeColor::from_java_name("SILVER"), Some(DyeColor::LightGray));
        assert_eq!(DyeColor::from_java_name("LIGHT_GRAY"), Some(DyeColor::LightGray));

        assert_eq!(DyeColor::from_java_name("CHARTREUSE"), None);
        assert_eq!(DyeColor::from_java_name("red"), None);
    }
}
