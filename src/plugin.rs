//! Plugin state management.
//!
//! Holds the engine tables Metamod hands us and, while attached, the
//! [`PluginContext`] the console commands run against.

use std::ffi::CStr;
use std::fmt;
use std::io::{self, Write};
use std::ptr::{self, NonNull};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::commands::{self, CommandError};
use crate::config::{PluginConfig, CVAR_TRACE_MAX, CVAR_TRACE_MIN};
use crate::context::PluginContext;
use crate::engine::Engine;
use crate::metamod::host::HostEngine;
use crate::metamod::types::{cvar_t, EngineFuncs, GlobalVars, FCVAR_SERVER};

/// Prefix for everything the plugin prints
const LOG_TAG: &str = "[MMEXAMPLE]";

/// Lower trace bound cvar, registered on attach
static mut TRACE_MIN_CVAR: cvar_t = cvar_t {
    name: c"mmex_trace_min".as_ptr(),
    string: c"0".as_ptr(),
    flags: FCVAR_SERVER,
    value: 0.0,
    next: ptr::null_mut(),
};

/// Upper trace bound cvar, registered on attach
static mut TRACE_MAX_CVAR: cvar_t = cvar_t {
    name: c"mmex_trace_max".as_ptr(),
    string: c"1000".as_ptr(),
    flags: FCVAR_SERVER,
    value: 1000.0,
    next: ptr::null_mut(),
};

/// Console command names as the engine stores them
const COMMAND_CNAMES: [&CStr; 2] = [c"entinfo", c"traceline"];

/// Global plugin instance
pub static PLUGIN: Lazy<Mutex<Plugin>> = Lazy::new(|| Mutex::new(Plugin::new()));

/// Why the plugin refused to attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachError {
    /// GiveFnptrsToDll was never called
    NoEngineFunctions,
    /// Metamod passed no function table
    NullFunctionTable,
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEngineFunctions => f.write_str("engine functions were not provided"),
            Self::NullFunctionTable => f.write_str("Metamod passed a null function table"),
        }
    }
}

impl std::error::Error for AttachError {}

/// Plugin state
pub struct Plugin {
    /// Engine function pointers
    engine_funcs: *mut EngineFuncs,
    /// Global variables
    global_vars: *mut GlobalVars,
    /// Present between attach and detach
    context: Option<PluginContext<HostEngine>>,
    /// Defaults applied when the cvars are unusable
    config: PluginConfig,
    /// The engine can't unregister commands, so only add them once
    commands_registered: bool,
    cvars_registered: bool,
}

// SAFETY: Plugin is only accessed through a Mutex, from the engine thread
unsafe impl Send for Plugin {}

impl Plugin {
    /// Create a new plugin instance.
    pub fn new() -> Self {
        Self {
            engine_funcs: ptr::null_mut(),
            global_vars: ptr::null_mut(),
            context: None,
            config: PluginConfig::default(),
            commands_registered: false,
            cvars_registered: false,
        }
    }

    /// Called from Meta_Init, before any engine functions are known.
    pub fn on_init(&self) {
        self.log_info("called Meta_Init");
    }

    /// Called from Meta_Query.
    pub fn on_query(&self, metamod_version: Option<&str>, our_version: &str) {
        self.log_info("called Meta_Query");

        match metamod_version {
            Some(version) if version != our_version => {
                tracing::warn!(
                    metamod = version,
                    plugin = our_version,
                    "Metamod interface version differs"
                );
            }
            None => tracing::debug!("Metamod did not report an interface version"),
            Some(_) => {}
        }

        if self.engine_funcs.is_null() {
            tracing::debug!("engine functions not received yet");
        }
    }

    /// Set engine function pointers.
    ///
    /// # Safety
    /// Pointers must be valid for the lifetime of the plugin.
    pub unsafe fn set_engine_funcs(
        &mut self,
        engine_funcs: *mut EngineFuncs,
        global_vars: *mut GlobalVars,
    ) {
        self.engine_funcs = engine_funcs;
        self.global_vars = global_vars;
    }

    /// Build a fresh handle to the engine, if we have its table.
    fn host(&self) -> Option<HostEngine> {
        let funcs = NonNull::new(self.engine_funcs)?;
        // SAFETY: set_engine_funcs requires the tables to outlive the plugin
        Some(unsafe { HostEngine::new(funcs, self.global_vars) })
    }

    /// Called from Meta_Attach: create the context and register cvars and commands.
    pub fn attach(&mut self, command_callback: unsafe extern "C" fn()) -> Result<(), AttachError> {
        self.log_info("called Meta_Attach");

        let host = self.host().ok_or(AttachError::NoEngineFunctions)?;

        self.register_cvars(&host);

        if !self.commands_registered {
            for name in COMMAND_CNAMES {
                if !host.add_server_command(name, command_callback) {
                    tracing::warn!(command = ?name, "engine has no AddServerCommand");
                }
            }
            self.commands_registered = true;
        }

        self.context = Some(PluginContext::new(host, self.config.clone()));
        Ok(())
    }

    /// Called from Meta_Attach when Metamod's arguments are unusable.
    pub fn reject_attach(&self, error: AttachError) {
        self.log_info("called Meta_Attach");
        self.log_error(&error.to_string());
    }

    /// Called from Meta_Detach.
    pub fn detach(&mut self) {
        self.log_info("called Meta_Detach");
        self.context = None;
    }

    /// Register plugin cvars.
    fn register_cvars(&mut self, host: &HostEngine) {
        if self.cvars_registered {
            return;
        }

        // SAFETY: the cvars are statics that live as long as the library;
        // the engine writes to them only from its own thread.
        let registered = unsafe {
            host.register_cvar(&raw mut TRACE_MIN_CVAR)
                && host.register_cvar(&raw mut TRACE_MAX_CVAR)
        };

        if registered {
            tracing::debug!(min = CVAR_TRACE_MIN, max = CVAR_TRACE_MAX, "registered cvars");
            self.cvars_registered = true;
        } else {
            tracing::warn!("engine has no CVarRegister, trace limits use defaults");
        }
    }

    /// Run the console command the engine is currently executing.
    pub fn run_command(&self) {
        let Some(ctx) = &self.context else {
            let name = self
                .host()
                .and_then(|host| host.command_args().into_iter().next())
                .unwrap_or_default();
            self.log_error(&format!("{name}: {}", CommandError::NotAttached));
            return;
        };

        let args = ctx.engine().command_args();
        commands::execute(ctx, &args);
    }

    /// Log an info message.
    pub fn log_info(&self, msg: &str) {
        self.server_print(&format!("{LOG_TAG} {msg}\n"));
    }

    /// Log an error message.
    pub fn log_error(&self, msg: &str) {
        self.server_print(&format!("{LOG_TAG} ERROR: {msg}\n"));
    }

    /// Print to server console.
    fn server_print(&self, msg: &str) {
        match self.host() {
            Some(host) => host.server_print(msg),
            // No engine yet (Meta_Init)
            None => {
                let mut out = io::stdout().lock();
                let _ = out.write_all(msg.as_bytes());
                let _ = out.flush();
            }
        }
    }
}

impl Default for Plugin {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TraceLimits;
    use crate::metamod::host::fake::{self, STATE};

    unsafe extern "C" fn noop() {}

    fn attached(funcs: &mut EngineFuncs) -> Plugin {
        let mut plugin = Plugin::new();
        unsafe { plugin.set_engine_funcs(funcs, ptr::null_mut()) };
        plugin.attach(noop).unwrap();
        plugin
    }

    #[test]
    fn test_command_names_match_handlers() {
        let names: Vec<&str> = COMMAND_CNAMES.iter().map(|c| c.to_str().unwrap()).collect();
        assert_eq!(names, commands::COMMAND_NAMES);
    }

    #[test]
    fn test_cvar_statics_match_config() {
        // SAFETY: only read here
        let (min, max) = unsafe {
            (
                CStr::from_ptr((*(&raw const TRACE_MIN_CVAR)).name),
                CStr::from_ptr((*(&raw const TRACE_MAX_CVAR)).name),
            )
        };
        assert_eq!(min.to_str().unwrap(), CVAR_TRACE_MIN);
        assert_eq!(max.to_str().unwrap(), CVAR_TRACE_MAX);

        let (min_default, max_default) = unsafe {
            (
                CStr::from_ptr((*(&raw const TRACE_MIN_CVAR)).string),
                CStr::from_ptr((*(&raw const TRACE_MAX_CVAR)).string),
            )
        };
        let defaults = TraceLimits::default();
        let (min_value, max_value) =
            unsafe { ((*(&raw const TRACE_MIN_CVAR)).value, (*(&raw const TRACE_MAX_CVAR)).value) };
        assert_eq!(min_value, defaults.min_distance);
        assert_eq!(max_value, defaults.max_distance);
        assert_eq!(min_default.to_str().unwrap().parse::<f32>().unwrap(), defaults.min_distance);
        assert_eq!(max_default.to_str().unwrap().parse::<f32>().unwrap(), defaults.max_distance);
    }

    #[test]
    fn test_attach_without_engine_fails() {
        let mut plugin = Plugin::new();
        assert_eq!(plugin.attach(noop), Err(AttachError::NoEngineFunctions));
        assert!(plugin.context.is_none());
    }

    #[test]
    fn test_attach_registers_commands_once() {
        let mut funcs = fake::engine_funcs();
        let mut plugin = attached(&mut funcs);
        assert!(plugin.context.is_some());

        plugin.detach();
        assert!(plugin.context.is_none());
        plugin.attach(noop).unwrap();

        STATE.with_borrow(|state| {
            assert_eq!(state.commands, ["entinfo", "traceline"]);
            assert_eq!(state.cvars.len(), 2);
        });
        assert!(fake::printed().contains("[MMEXAMPLE] called Meta_Attach\n"));
        assert!(fake::printed().contains("[MMEXAMPLE] called Meta_Detach\n"));
    }

    #[test]
    fn test_run_command_through_engine() {
        let mut funcs = fake::engine_funcs();
        let plugin = attached(&mut funcs);

        let world = fake::edict();
        fake::spawn(world);
        let mut player = fake::edict();
        player.v.netname = fake::intern("Gordon");
        player.v.classname = fake::intern("player");
        fake::spawn(player);

        fake::set_args("entinfo 1");
        plugin.run_command();
        let out = fake::printed();
        assert!(out.contains("Netname: Gordon\n"), "{out}");
        assert!(out.contains("Classname: player\n"), "{out}");

        fake::set_args("entinfo 0");
        plugin.run_command();
        assert!(fake::printed().ends_with("Entity is null\n"));
    }

    #[test]
    fn test_trace_limits_follow_registered_cvars() {
        let mut funcs = fake::engine_funcs();
        let plugin = attached(&mut funcs);
        fake::spawn(fake::edict());
        fake::spawn(fake::edict());

        fake::set_args("traceline 1 1500");
        plugin.run_command();
        assert!(fake::printed().ends_with("Distance must not exceed 1000\n"));

        fake::set_args("traceline 1 500");
        plugin.run_command();
        let out = fake::printed();
        assert!(out.contains("Trace line\n"), "{out}");
        assert!(out.contains("End: [500, 0, 0]\n"), "{out}");
        assert!(out.ends_with("Hit: none\nHitGroup: 1\n"), "{out}");
    }

    #[test]
    fn test_rejected_attach_still_logs_lifecycle() {
        let mut funcs = fake::engine_funcs();
        let mut plugin = Plugin::new();
        unsafe { plugin.set_engine_funcs(&mut *funcs, ptr::null_mut()) };

        plugin.reject_attach(AttachError::NullFunctionTable);
        assert_eq!(
            fake::printed(),
            "[MMEXAMPLE] called Meta_Attach\n\
             [MMEXAMPLE] ERROR: Metamod passed a null function table\n"
        );
        assert!(plugin.context.is_none());
    }

    #[test]
    fn test_log_without_engine_goes_to_stdout() {
        let plugin = Plugin::new();
        plugin.on_init();
        plugin.log_error("still here");
        assert!(fake::printed().is_empty());
    }

    #[test]
    fn test_run_command_after_detach() {
        let mut funcs = fake::engine_funcs();
        let mut plugin = attached(&mut funcs);
        plugin.detach();

        fake::set_args("entinfo 1");
        plugin.run_command();
        assert!(fake::printed().ends_with("[MMEXAMPLE] ERROR: entinfo: plugin is not attached\n"));
    }
}
