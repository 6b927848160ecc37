#![cfg_attr(debug_assertions, allow(dead_code))]

pub mod compat;
mod host;
mod java;
pub mod signature;
pub mod version;

pub use compat::errors::CompatError;
pub use compat::{Compat, DyeColor};
pub use version::{Gate, ServerVersion, VersionFlags};

use log::{error, info, LevelFilter};
use simplelog::{Config, WriteLogger};
use std::fs::File;
use std::sync::atomic::{AtomicBool, Ordering};

// Flag to make sure the library is only initialized once
static INITIALIZED: AtomicBool = AtomicBool::new(false);

pub trait LogExpect<T> {
    fn log_expect(self, msg: impl AsRef<str>) -> T;
}

impl<T, E: std::fmt::Debug> LogExpect<T> for Result<T, E> {
    fn log_expect(self, msg: impl AsRef<str>) -> T {
        self.unwrap_or_else(|e| {
            error!("{}: {:?}", msg.as_ref(), e);
            panic!("{}: {:?}", msg.as_ref(), e);
        })
    }
}

impl<T> LogExpect<T> for Option<T> {
    fn log_expect(self, msg: impl AsRef<str>) -> T {
        self.unwrap_or_else(|| {
            error!("{}", msg.as_ref());
            panic!("{}", msg.as_ref());
        })
    }
}

/// Entry point when the library is loaded into the server JVM as an agent.
///
/// Detects the running server version, resolves every reflective member the
/// version supports and logs the outcome. Safe to call more than once. On
/// failure the layer is left uninitialized and the error is logged; the host
/// server keeps running.
#[no_mangle]
pub extern "C" fn bukkit_compat_init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        info!("Compat layer already initialized");
        return;
    }

    // Initialize the logger
    match WriteLogger::init(
        LevelFilter::Debug,
        Config::default(),
        File::create("bukkit_compat.log").unwrap(),
    ) {
        Ok(_) => info!("Logger initialized"),
        Err(e) => eprintln!("Error during logger initialization: {:?}", e),
    }

    match Compat::try_instance() {
        Ok(compat) => {
            info!("Compat layer ready: {:?}", compat.flags());
            for key in [
                compat::keys::POTION_FROM_ITEM_STACK,
                compat::keys::POTION_GET_EFFECTS,
                compat::keys::POTION_IS_SPLASH,
                compat::keys::BANNER_GET_BASE_COLOR,
            ] {
                info!(
                    "{}: {}",
                    key,
                    if compat.is_resolved(key) {
                        "resolved"
                    } else {
                        "absent"
                    }
                );
            }
        }
        Err(e) => error!("Compat layer unavailable: {:?}", e),
    }
}
