use crate::LogExpect;
use jni::sys::{jsize, JNI_GetCreatedJavaVMs, JNI_OK};
use jni::{JNIEnv, JavaVM};
use std::sync::{Arc, OnceLock};

/// Handle to the JVM the Bukkit server runs in.
///
/// The library is loaded into an already-running server process, so the VM is
/// looked up rather than created.
#[derive(Debug)]
pub struct ServerHost {
    jvm: Arc<JavaVM>,
}

impl ServerHost {
    pub fn instance() -> &'static ServerHost {
        static INSTANCE: OnceLock<Arc<ServerHost>> = OnceLock::new();

        INSTANCE.get_or_init(|| unsafe {
            Arc::new(ServerHost::new().log_expect("Failed to locate the server JVM"))
        })
    }

    unsafe fn new() -> Result<Self, &'static str> {
        let mut java_vm: *mut jni::sys::JavaVM = std::ptr::null_mut();
        let mut count: jsize = 0;

        if JNI_GetCreatedJavaVMs(&mut java_vm, 1, &mut count) != JNI_OK || count == 0 {
            return Err("Failed to get Java VMs");
        }

        let java_vm: Arc<JavaVM> = Arc::new(match JavaVM::from_raw(java_vm) {
            Ok(jvm) => jvm,
            Err(_) => return Err("Could not get JavaVM"),
        });

        Ok(ServerHost { jvm: java_vm })
    }

    pub fn get_env(&self) -> jni::errors::Result<JNIEnv<'_>> {
        self.jvm.attach_current_thread_as_daemon()
    }
}
