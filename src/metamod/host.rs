//! [`Engine`] implementation over the engine function table Metamod passes
//! to `GiveFnptrsToDll`.

use std::ffi::{c_char, CStr, CString};
use std::ptr::{self, NonNull};

use glam::Vec3;

use super::types::{cvar_t, edict_t, string_t, vec3_t, EngineFuncs, GlobalVars};
use crate::engine::{Engine, EntityVars, TraceMode, TraceResult};

/// Handle to the running engine.
pub struct HostEngine {
    funcs: NonNull<EngineFuncs>,
    globals: *const GlobalVars,
}

impl HostEngine {
    /// Wrap the engine tables.
    ///
    /// # Safety
    /// `funcs` and (if non-null) `globals` must stay valid while this value
    /// is alive, and the engine functions may only be called from the
    /// engine's main thread.
    pub unsafe fn new(funcs: NonNull<EngineFuncs>, globals: *const GlobalVars) -> Self {
        Self { funcs, globals }
    }

    fn funcs(&self) -> &EngineFuncs {
        // SAFETY: valid for our lifetime per `new`
        unsafe { self.funcs.as_ref() }
    }

    /// Resolve a string pool offset.
    fn string(&self, offset: string_t) -> String {
        if offset == 0 {
            return String::new();
        }

        // SAFETY: the engine returns pointers into its string pool
        let ptr: *const c_char = unsafe {
            if let Some(sz_from_index) = self.funcs().pfn_sz_from_index {
                sz_from_index(offset)
            } else if !self.globals.is_null() && !(*self.globals).p_string_base.is_null() {
                (*self.globals).p_string_base.offset(offset as isize)
            } else {
                ptr::null()
            }
        };

        if ptr.is_null() {
            return String::new();
        }

        // SAFETY: non-null, NUL-terminated engine string
        unsafe { CStr::from_ptr(ptr) }
            .to_string_lossy()
            .into_owned()
    }

    /// Arguments of the server command currently being executed.
    pub fn command_args(&self) -> Vec<String> {
        let (Some(argc), Some(argv)) = (self.funcs().pfn_cmd_argc, self.funcs().pfn_cmd_argv) else {
            tracing::warn!("engine has no Cmd_Argc/Cmd_Argv");
            return Vec::new();
        };

        // SAFETY: only called from inside a command callback
        let count = unsafe { argc() };
        (0..count)
            .map(|i| {
                // SAFETY: i is below Cmd_Argc
                let arg = unsafe { argv(i) };
                if arg.is_null() {
                    String::new()
                } else {
                    // SAFETY: the engine returns NUL-terminated strings
                    unsafe { CStr::from_ptr(arg) }.to_string_lossy().into_owned()
                }
            })
            .collect()
    }

    /// Register a server console command.
    ///
    /// The engine keeps `name` without copying it, hence `'static`.
    pub fn add_server_command(
        &self,
        name: &'static CStr,
        callback: unsafe extern "C" fn(),
    ) -> bool {
        let Some(add) = self.funcs().pfn_add_server_command else {
            return false;
        };

        // SAFETY: name is a static NUL-terminated string
        unsafe { add(name.as_ptr(), Some(callback)) };
        true
    }

    /// Register a console variable.
    ///
    /// # Safety
    /// `cvar` must point to a static the engine may keep and write to.
    pub unsafe fn register_cvar(&self, cvar: *mut cvar_t) -> bool {
        let Some(register) = self.funcs().pfn_cvar_register else {
            return false;
        };

        register(cvar);
        true
    }
}

fn vector(v: &vec3_t) -> Vec3 {
    Vec3::from_array(*v)
}

impl Engine for HostEngine {
    type Entity = NonNull<edict_t>;

    fn entity_of_index(&self, index: i32) -> Option<NonNull<edict_t>> {
        let Some(lookup) = self.funcs().pfn_pentity_of_ent_index else {
            tracing::warn!("engine has no PEntityOfEntIndex");
            return None;
        };

        // SAFETY: the engine bounds-checks the index
        NonNull::new(unsafe { lookup(index) })
    }

    fn is_null_entity(&self, entity: NonNull<edict_t>) -> bool {
        // Offset 0 is worldspawn.
        let Some(offset_of) = self.funcs().pfn_ent_offset_of_pentity else {
            tracing::warn!("engine has no EntOffsetOfPEntity");
            return false;
        };

        // SAFETY: entity came from the engine
        let offset = unsafe { offset_of(entity.as_ptr()) };
        offset == 0
    }

    fn entity_vars(&self, entity: NonNull<edict_t>) -> Option<EntityVars> {
        // SAFETY: entity came from the engine and stays allocated for the frame
        let edict = unsafe { entity.as_ref() };
        if edict.free != 0 || edict.v.containing_entity.is_null() {
            return None;
        }

        let v = &edict.v;
        Some(EntityVars {
            netname: self.string(v.netname),
            classname: self.string(v.classname),
            globalname: self.string(v.globalname),
            model: self.string(v.model),
            viewmodel: self.string(v.viewmodel),
            weaponmodel: self.string(v.weaponmodel),
            origin: vector(&v.origin),
            angles: vector(&v.angles),
            v_angle: vector(&v.v_angle),
            view_ofs: vector(&v.view_ofs),
            health: v.health,
            max_health: v.max_health,
            max_speed: v.maxspeed,
        })
    }

    fn serial_number(&self, entity: NonNull<edict_t>) -> i32 {
        // SAFETY: see entity_vars
        unsafe { entity.as_ref() }.serialnumber
    }

    fn trace_line(
        &self,
        start: Vec3,
        end: Vec3,
        mode: TraceMode,
        ignore: NonNull<edict_t>,
    ) -> TraceResult<NonNull<edict_t>> {
        let Some(trace_line) = self.funcs().pfn_trace_line else {
            tracing::warn!("engine has no TraceLine, reporting an unobstructed trace");
            return TraceResult {
                all_solid: false,
                start_solid: false,
                in_open: true,
                in_water: false,
                fraction: 1.0,
                end_pos: end,
                hit: None,
                hit_group: 0,
            };
        };

        let start = start.to_array();
        let end = end.to_array();

        // SAFETY: all-zero is a valid TraceResult (ints, floats, null pointer)
        let mut tr: super::types::TraceResult = unsafe { std::mem::zeroed() };
        // SAFETY: pointers are valid for the duration of the call
        unsafe {
            trace_line(
                start.as_ptr(),
                end.as_ptr(),
                mode.raw(),
                ignore.as_ptr(),
                &raw mut tr,
            );
        }

        TraceResult {
            all_solid: tr.all_solid != 0,
            start_solid: tr.start_solid != 0,
            in_open: tr.in_open != 0,
            in_water: tr.in_water != 0,
            fraction: tr.fraction,
            end_pos: vector(&tr.end_pos),
            hit: NonNull::new(tr.hit),
            hit_group: tr.hitgroup,
        }
    }

    fn cvar_float(&self, name: &str) -> Option<f32> {
        let get_pointer = self.funcs().pfn_cvar_get_pointer?;
        let name = CString::new(name).ok()?;

        // SAFETY: name is NUL-terminated; the engine returns null for unknown cvars
        let cvar = unsafe { get_pointer(name.as_ptr()) };
        if cvar.is_null() {
            return None;
        }

        // SAFETY: checked above
        Some(unsafe { (*cvar).value })
    }

    fn server_print(&self, msg: &str) {
        let Some(print_fn) = self.funcs().pfn_server_print else {
            print!("{msg}");
            return;
        };

        let c_msg = CString::new(msg.replace('\0', "")).unwrap_or_default();
        // SAFETY: NUL-terminated for the duration of the call
        unsafe { print_fn(c_msg.as_ptr()) };
    }
}
