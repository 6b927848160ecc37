use crate::compat::errors::CompatError;
use crate::compat::{keys, Compat};
use crate::java::JavaCollection;
use crate::version::Gate;
use jni::objects::{GlobalRef, JObject, JValue};

impl Compat {
    /// Looks up the legacy `Potion` representation of a potion item.
    ///
    /// `None` means the item carries no potion data; it is also the degraded
    /// fallback when the reflective handle is missing.
    pub fn potion_from_item_stack(
        &self,
        item: &JObject,
    ) -> Result<Option<GlobalRef>, CompatError> {
        self.gated(
            "potion_from_item_stack",
            Gate::Ancient,
            keys::POTION_FROM_ITEM_STACK,
            "check the item material against SPLASH_POTION instead",
            None,
            |method| {
                let mut env = self.env()?;

                let class = env
                    .find_class(&method.class)
                    .map_err(|e| Self::invocation_error(&mut env, method, e))?;
                let value = env
                    .call_static_method(
                        class,
                        &method.name,
                        &method.signature,
                        &[JValue::Object(item)],
                    )
                    .map_err(|e| Self::invocation_error(&mut env, method, e))?;
                let potion = value
                    .l()
                    .map_err(|e| Self::invocation_error(&mut env, method, e))?;

                if potion.is_null() {
                    return Ok(None);
                }

                let potion = env
                    .new_global_ref(potion)
                    .map_err(|e| Self::invocation_error(&mut env, method, e))?;
                Ok(Some(potion))
            },
        )
    }

    /// Whether a legacy `Potion` is a splash potion. Defaults to `false` when
    /// the reflective handle is missing.
    pub fn potion_is_splash(&self, potion: &JObject) -> Result<bool, CompatError> {
        self.gated(
            "potion_is_splash",
            Gate::Ancient,
            keys::POTION_IS_SPLASH,
            "splash potions are a dedicated material here",
            false,
            |method| {
                let mut env = self.env()?;

                let value = env
                    .call_method(potion, &method.name, &method.signature, &[])
                    .map_err(|e| Self::invocation_error(&mut env, method, e))?;
                value
                    .z()
                    .map_err(|e| Self::invocation_error(&mut env, method, e))
            },
        )
    }

    /// The effects carried by a legacy `Potion`, as opaque references.
    /// Defaults to an empty list when the reflective handle is missing.
    pub fn potion_get_effects(&self, potion: &JObject) -> Result<Vec<GlobalRef>, CompatError> {
        self.gated(
            "potion_get_effects",
            Gate::Ancient,
            keys::POTION_GET_EFFECTS,
            "read the effects from the item meta here",
            Vec::new(),
            |method| {
                let mut env = self.env()?;

                let value = env
                    .call_method(potion, &method.name, &method.signature, &[])
                    .map_err(|e| Self::invocation_error(&mut env, method, e))?;
                let collection = value
                    .l()
                    .map_err(|e| Self::invocation_error(&mut env, method, e))?;

                if collection.is_null() {
                    return Ok(Vec::new());
                }

                let collection = JavaCollection::new(
                    env.new_global_ref(collection)
                        .map_err(|e| Self::invocation_error(&mut env, method, e))?,
                );
                collection
                    .to_vec(&mut env)
                    .map_err(|e| Self::invocation_error(&mut env, method, e))
            },
        )
    }

    /// Whether an item stack is a splash potion, via the legacy `Potion` data.
    pub fn is_splash_potion(&self, item: &JObject) -> Result<bool, CompatError> {
        match self.potion_from_item_stack(item)? {
            Some(potion) => self.potion_is_splash(potion.as_obj()),
            None => Ok(false),
        }
    }
}
