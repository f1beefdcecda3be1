//! Metamod plugin exported functions.
//!
//! These are the C functions that Metamod expects to find in the plugin DLL.

use std::ffi::{c_char, c_int, CStr};
use std::panic::{self, AssertUnwindSafe};

use super::types::*;
use crate::plugin::{AttachError, PLUGIN};

// =============================================================================
// Plugin Information
// =============================================================================

/// Metamod interface version
const META_INTERFACE_VERSION: &CStr = c"5:13";

/// Plugin version (null-terminated)
const PLUGIN_VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();

/// Static plugin information - must remain valid for the plugin's lifetime
#[no_mangle]
pub static PLUGIN_INFO: PluginInfo = PluginInfo {
    ifvers: META_INTERFACE_VERSION.as_ptr(),
    name: c"Metamod Rust Example".as_ptr(),
    version: PLUGIN_VERSION.as_ptr().cast::<c_char>(),
    date: c"2026".as_ptr(),
    author: c"metamod-example".as_ptr(),
    url: c"https://github.com/metamod-example/metamod-example".as_ptr(),
    logtag: c"MMEXAMPLE".as_ptr(),
    loadable: PluginLoadTime::Startup,
    unloadable: PluginLoadTime::Anytime,
};

// =============================================================================
// Metamod API Functions
// =============================================================================

/// Called before GiveFnptrsToDll to identify this as a Metamod plugin.
#[no_mangle]
pub extern "C" fn Meta_Init() {
    PLUGIN.lock().on_init();
}

/// Query plugin information.
///
/// # Safety
/// Called by Metamod with valid pointers.
#[no_mangle]
pub unsafe extern "C" fn Meta_Query(
    interface_version: *const c_char,
    plugin_info: *mut *const PluginInfo,
    _meta_util_funcs: *mut MetaUtilFuncs,
) -> c_int {
    if plugin_info.is_null() {
        return 0;
    }

    *plugin_info = &PLUGIN_INFO;

    let metamod_version = if interface_version.is_null() {
        None
    } else {
        CStr::from_ptr(interface_version).to_str().ok()
    };
    let ours = META_INTERFACE_VERSION.to_str().unwrap_or_default();

    PLUGIN.lock().on_query(metamod_version, ours);

    1 // TRUE - success
}

/// Attach plugin to Metamod.
///
/// # Safety
/// Called by Metamod with valid pointers.
#[no_mangle]
pub unsafe extern "C" fn Meta_Attach(
    _now: PluginLoadTime,
    function_table: *mut MetaFunctions,
    _meta_globals: *mut MetaGlobals,
    _gamedll_funcs: *mut GameDllFuncs,
) -> c_int {
    let mut plugin = PLUGIN.lock();

    if function_table.is_null() {
        plugin.reject_attach(AttachError::NullFunctionTable);
        return 0;
    }

    // We hook no game or engine functions
    (*function_table).pfn_get_entity_api = None;
    (*function_table).pfn_get_entity_api_post = None;
    (*function_table).pfn_get_entity_api2 = None;
    (*function_table).pfn_get_entity_api2_post = None;
    (*function_table).pfn_get_new_dll_functions = None;
    (*function_table).pfn_get_new_dll_functions_post = None;
    (*function_table).pfn_get_engine_functions = None;
    (*function_table).pfn_get_engine_functions_post = None;

    match plugin.attach(server_command) {
        Ok(()) => 1,
        Err(e) => {
            plugin.log_error(&format!("attach failed: {e}"));
            0
        }
    }
}

/// Detach plugin from Metamod.
#[no_mangle]
pub extern "C" fn Meta_Detach(_now: PluginLoadTime, _reason: PluginUnloadReason) -> c_int {
    PLUGIN.lock().detach();

    1 // TRUE - success
}

/// Provide engine function pointers to the plugin.
///
/// # Safety
/// Called by Metamod with valid pointers.
#[no_mangle]
pub unsafe extern "C" fn GiveFnptrsToDll(
    engine_funcs: *mut EngineFuncs,
    global_vars: *mut GlobalVars,
) {
    PLUGIN.lock().set_engine_funcs(engine_funcs, global_vars);
}

// =============================================================================
// Console commands
// =============================================================================

/// Callback for every console command the plugin registers; the handler is
/// picked by `Cmd_Argv(0)`.
unsafe extern "C" fn server_command() {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        PLUGIN.lock().run_command();
    }));

    if let Err(e) = result {
        eprintln!("[MMEXAMPLE] Panic in console command: {e:?}");
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::*;

    #[test]
    fn test_query_without_info_pointer_fails() {
        let result = unsafe { Meta_Query(c"5:13".as_ptr(), ptr::null_mut(), ptr::null_mut()) };
        assert_eq!(result, 0);
    }

    #[test]
    fn test_query_tolerates_version_mismatch() {
        let mut info: *const PluginInfo = ptr::null();
        let result = unsafe { Meta_Query(c"5:12".as_ptr(), &mut info, ptr::null_mut()) };
        assert_eq!(result, 1);
        assert!(ptr::eq(info, &PLUGIN_INFO));
    }

    #[test]
    fn test_query_without_metamod_version() {
        let mut info: *const PluginInfo = ptr::null();
        let result = unsafe { Meta_Query(ptr::null(), &mut info, ptr::null_mut()) };
        assert_eq!(result, 1);
        assert!(!info.is_null());
    }

    #[test]
    fn test_attach_with_null_function_table_fails() {
        let result = unsafe {
            Meta_Attach(
                PluginLoadTime::Startup,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        assert_eq!(result, 0);
    }

    #[test]
    fn test_plugin_info_strings() {
        let name = unsafe { CStr::from_ptr(PLUGIN_INFO.name) };
        let logtag = unsafe { CStr::from_ptr(PLUGIN_INFO.logtag) };
        let version = unsafe { CStr::from_ptr(PLUGIN_INFO.version) };
        let ifvers = unsafe { CStr::from_ptr(PLUGIN_INFO.ifvers) };

        assert_eq!(name.to_str().unwrap(), "Metamod Rust Example");
        assert_eq!(logtag.to_str().unwrap(), "MMEXAMPLE");
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
        assert_eq!(ifvers, META_INTERFACE_VERSION);
        assert_eq!(PLUGIN_INFO.loadable, PluginLoadTime::Startup);
        assert_eq!(PLUGIN_INFO.unloadable, PluginLoadTime::Anytime);
    }
}
