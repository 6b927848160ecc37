use jni::objects::{GlobalRef, JObject, JString};
use jni::JNIEnv;
use std::ops::Deref;

/// Wrapper around a `java.util.Collection` held as a global reference.
pub struct JavaCollection {
    pub jni_ref: GlobalRef,
}

impl JavaCollection {
    pub fn new(jni_ref: GlobalRef) -> JavaCollection {
        JavaCollection { jni_ref }
    }

    /// Drains the collection into global references through its `Iterator`.
    pub fn to_vec(&self, env: &mut JNIEnv) -> jni::errors::Result<Vec<GlobalRef>> {
        let iterator = env
            .call_method(
                self.jni_ref.as_obj(),
                "iterator",
                "()Ljava/util/Iterator;",
                &[],
            )?
            .l()?;

        let mut items = Vec::new();
        loop {
            let has_next = env.call_method(&iterator, "hasNext", "()Z", &[])?.z()?;
            if !has_next {
                break;
            }

            let item = env
                .call_method(&iterator, "next", "()Ljava/lang/Object;", &[])?
                .l()?;
            items.push(env.new_global_ref(item)?);
        }

        Ok(items)
    }
}

impl Deref for JavaCollection {
    type Target = GlobalRef;

    fn deref(&self) -> &Self::Target {
        &self.jni_ref
    }
}

/// Reads `Enum#name()` from a Java enum constant.
pub fn enum_name(env: &mut JNIEnv, value: &JObject) -> jni::errors::Result<String> {
    let name = env
        .call_method(value, "name", "()Ljava/lang/String;", &[])?
        .l()?;
    Ok(env.get_string(&JString::from(name))?.into())
}

/// Whether a failed JNI call left a Java exception pending on the thread.
pub(crate) fn leaves_exception_pending(source: &jni::errors::Error) -> bool {
    matches!(source, jni::errors::Error::JavaException)
}

/// Clears the Java exception a failed JNI call left behind, if any.
///
/// A pending exception must not leak back into the server's call path.
pub(crate) fn clear_pending_exception(env: &mut JNIEnv, source: &jni::errors::Error) {
    if leaves_exception_pending(source) {
        let _ = env.exception_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_java_exceptions_leave_an_exception_pending() {
        assert!(leaves_exception_pending(&jni::errors::Error::JavaException));
        assert!(!leaves_exception_pending(&jni::errors::Error::NullPtr(
            "call_static_method"
        )));
    }
}
