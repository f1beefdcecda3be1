//! Metamod and engine FFI type definitions.
//!
//! Layouts follow the Metamod-P SDK (meta_api.h, plinfo.h) and the HLSDK
//! (eiface.h, edict.h, progdefs.h). Only the parts this plugin touches are
//! typed; unused engine table slots are kept as untyped pointers so the
//! offsets stay correct.

#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_float, c_int, c_short, c_uchar, c_void};

/// Three floats, as the engine passes vectors.
pub type vec3_t = [c_float; 3];

/// Offset into the engine's string pool.
pub type string_t = c_int;

/// Engine boolean.
pub type qboolean = c_int;

// =============================================================================
// Entities
// =============================================================================

/// Entity variables (progdefs.h)
// Layout only; the engine owns most of these fields.
#[allow(dead_code)]
#[repr(C)]
pub struct entvars_s {
    pub classname: string_t,
    pub globalname: string_t,

    pub origin: vec3_t,
    pub oldorigin: vec3_t,
    pub velocity: vec3_t,
    pub basevelocity: vec3_t,
    pub clbasevelocity: vec3_t,
    pub movedir: vec3_t,

    pub angles: vec3_t,
    pub avelocity: vec3_t,
    pub punchangle: vec3_t,
    pub v_angle: vec3_t,

    pub endpos: vec3_t,
    pub startpos: vec3_t,
    pub impacttime: c_float,
    pub starttime: c_float,

    pub fixangle: c_int,
    pub idealpitch: c_float,
    pub pitch_speed: c_float,
    pub ideal_yaw: c_float,
    pub yaw_speed: c_float,

    pub modelindex: c_int,
    pub model: string_t,
    pub viewmodel: string_t,
    pub weaponmodel: string_t,

    pub absmin: vec3_t,
    pub absmax: vec3_t,
    pub mins: vec3_t,
    pub maxs: vec3_t,
    pub size: vec3_t,

    pub ltime: c_float,
    pub nextthink: c_float,

    pub movetype: c_int,
    pub solid: c_int,

    pub skin: c_int,
    pub body: c_int,
    pub effects: c_int,

    pub gravity: c_float,
    pub friction: c_float,

    pub light_level: c_int,

    pub sequence: c_int,
    pub gaitsequence: c_int,
    pub frame: c_float,
    pub animtime: c_float,
    pub framerate: c_float,
    pub controller: [c_uchar; 4],
    pub blending: [c_uchar; 2],

    pub scale: c_float,

    pub rendermode: c_int,
    pub renderamt: c_float,
    pub rendercolor: vec3_t,
    pub renderfx: c_int,

    pub health: c_float,
    pub frags: c_float,
    pub weapons: c_int,
    pub takedamage: c_float,

    pub deadflag: c_int,
    pub view_ofs: vec3_t,

    pub button: c_int,
    pub impulse: c_int,

    pub chain: *mut edict_t,
    pub dmg_inflictor: *mut edict_t,
    pub enemy: *mut edict_t,
    pub aiment: *mut edict_t,
    pub owner: *mut edict_t,
    pub groundentity: *mut edict_t,

    pub spawnflags: c_int,
    pub flags: c_int,

    pub colormap: c_int,
    pub team: c_int,

    pub max_health: c_float,
    pub teleport_time: c_float,
    pub armortype: c_float,
    pub armorvalue: c_float,
    pub waterlevel: c_int,
    pub watertype: c_int,

    pub target: string_t,
    pub targetname: string_t,
    pub netname: string_t,
    pub message: string_t,

    pub dmg_take: c_float,
    pub dmg_save: c_float,
    pub dmg: c_float,
    pub dmgtime: c_float,

    pub noise: string_t,
    pub noise1: string_t,
    pub noise2: string_t,
    pub noise3: string_t,

    pub speed: c_float,
    pub air_finished: c_float,
    pub pain_finished: c_float,
    pub radsuit_finished: c_float,

    /// Back pointer to the edict that owns this block
    pub containing_entity: *mut edict_t,

    pub playerclass: c_int,
    pub maxspeed: c_float,

    pub fov: c_float,
    pub weaponanim: c_int,

    pub pushmsec: c_int,

    pub in_duck: c_int,
    pub time_step_sound: c_int,
    pub swim_time: c_int,
    pub duck_time: c_int,
    pub step_left: c_int,
    pub fall_velocity: c_float,

    pub gamestate: c_int,

    pub oldbuttons: c_int,

    pub groupinfo: c_int,

    pub iuser: [c_int; 4],
    pub fuser: [c_float; 4],
    pub vuser: [vec3_t; 4],
    pub euser: [*mut edict_t; 4],
}
pub type entvars_t = entvars_s;

/// Doubly linked list node used by the engine's area nodes
#[allow(dead_code)]
#[repr(C)]
pub struct link_s {
    pub prev: *mut link_s,
    pub next: *mut link_s,
}

/// Leafs an entity can be linked into
pub const MAX_ENT_LEAFS: usize = 48;

/// Entity dictionary slot (edict.h)
#[allow(dead_code)]
#[repr(C)]
pub struct edict_s {
    /// Slot is unused
    pub free: qboolean,
    pub serialnumber: c_int,
    pub area: link_s,
    pub headnode: c_int,
    pub num_leafs: c_int,
    pub leafnums: [c_short; MAX_ENT_LEAFS],
    pub freetime: c_float,
    /// Game DLL private data
    pub private_data: *mut c_void,
    pub v: entvars_t,
}
pub type edict_t = edict_s;

/// Result of the engine's trace functions (eiface.h)
#[allow(dead_code)]
#[repr(C)]
pub struct TraceResult {
    pub all_solid: c_int,
    pub start_solid: c_int,
    pub in_open: c_int,
    pub in_water: c_int,
    pub fraction: c_float,
    pub end_pos: vec3_t,
    pub plane_dist: c_float,
    pub plane_normal: vec3_t,
    pub hit: *mut edict_t,
    pub hitgroup: c_int,
}

/// Console variable
#[allow(dead_code)]
#[repr(C)]
pub struct cvar_s {
    pub name: *const c_char,
    pub string: *const c_char,
    pub flags: c_int,
    pub value: c_float,
    pub next: *mut cvar_s,
}
pub type cvar_t = cvar_s;

/// Cvar is visible to clients in server queries
pub const FCVAR_SERVER: c_int = 1 << 2;

// =============================================================================
// Metamod Plugin Info
// =============================================================================

/// When the plugin can be loaded
#[allow(dead_code)]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginLoadTime {
    Never = 0,
    Startup = 1,
    Changelevel = 2,
    Anytime = 3,
    Anypause = 4,
}

/// Reasons for unloading the plugin
#[allow(dead_code)]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginUnloadReason {
    Null = 0,
    IniDeleted = 1,
    FileNewer = 2,
    Command = 3,
    CmdForced = 4,
    Delayed = 5,
    PluginRemoved = 6,
    Reload = 7,
}

/// Plugin information structure returned by Meta_Query
#[allow(dead_code)]
#[repr(C)]
pub struct PluginInfo {
    /// Interface version string (e.g., "5:13")
    pub ifvers: *const c_char,
    pub name: *const c_char,
    pub version: *const c_char,
    pub date: *const c_char,
    pub author: *const c_char,
    pub url: *const c_char,
    /// Tag Metamod prefixes to our log lines
    pub logtag: *const c_char,
    pub loadable: PluginLoadTime,
    pub unloadable: PluginLoadTime,
}

// SAFETY: PluginInfo contains only static string pointers
unsafe impl Sync for PluginInfo {}
unsafe impl Send for PluginInfo {}

// =============================================================================
// Metamod tables
// =============================================================================

/// Globals Metamod shares with every plugin; only hooks read them.
#[repr(C)]
pub struct MetaGlobals {
    _opaque: [u8; 0],
}

/// Game DLL function table; this plugin hooks none of it.
#[repr(C)]
pub struct DllFunctions {
    _opaque: [u8; 0],
}

/// Newer game DLL function table; not hooked either.
#[repr(C)]
pub struct NewDllFunctions {
    _opaque: [u8; 0],
}

/// Utility functions provided by Metamod; not used.
#[repr(C)]
pub struct MetaUtilFuncs {
    _opaque: [u8; 0],
}

/// Pointers to the real game DLL's tables; not read.
#[repr(C)]
pub struct GameDllFuncs {
    _opaque: [u8; 0],
}

pub type GetEntityApiFn = unsafe extern "C" fn(*mut DllFunctions, c_int) -> c_int;
pub type GetEntityApi2Fn = unsafe extern "C" fn(*mut DllFunctions, *mut c_int) -> c_int;
pub type GetNewDllFunctionsFn = unsafe extern "C" fn(*mut NewDllFunctions, *mut c_int) -> c_int;
pub type GetEngineFunctionsFn = unsafe extern "C" fn(*mut EngineFuncs, *mut c_int) -> c_int;

/// Hook table getters the plugin hands to Metamod in Meta_Attach
#[allow(dead_code)]
#[repr(C)]
pub struct MetaFunctions {
    pub pfn_get_entity_api: Option<GetEntityApiFn>,
    pub pfn_get_entity_api_post: Option<GetEntityApiFn>,
    pub pfn_get_entity_api2: Option<GetEntityApi2Fn>,
    pub pfn_get_entity_api2_post: Option<GetEntityApi2Fn>,
    pub pfn_get_new_dll_functions: Option<GetNewDllFunctionsFn>,
    pub pfn_get_new_dll_functions_post: Option<GetNewDllFunctionsFn>,
    pub pfn_get_engine_functions: Option<GetEngineFunctionsFn>,
    pub pfn_get_engine_functions_post: Option<GetEngineFunctionsFn>,
}

// =============================================================================
// Engine globals
// =============================================================================

/// Engine global variables
#[allow(dead_code)]
#[repr(C)]
pub struct GlobalVars {
    pub time: c_float,
    pub frametime: c_float,
    pub force_retouch: c_float,
    pub mapname: string_t,
    pub startspot: string_t,
    pub deathmatch: c_float,
    pub coop: c_float,
    pub teamplay: c_float,
    pub serverflags: c_float,
    pub found_secrets: c_float,
    pub v_forward: vec3_t,
    pub v_up: vec3_t,
    pub v_right: vec3_t,
    pub trace_allsolid: c_float,
    pub trace_startsolid: c_float,
    pub trace_fraction: c_float,
    pub trace_endpos: vec3_t,
    pub trace_plane_normal: vec3_t,
    pub trace_plane_dist: c_float,
    pub trace_ent: *mut edict_t,
    pub trace_inopen: c_float,
    pub trace_inwater: c_float,
    pub trace_hitgroup: c_int,
    pub trace_flags: c_int,
    pub msg_entity: c_int,
    pub cd_audio_track: c_int,
    pub max_clients: c_int,
    pub max_entities: c_int,
    /// Base of the string pool `string_t` offsets point into
    pub p_string_base: *const c_char,
    pub p_save_data: *mut c_void,
    pub vec_landmark_offset: vec3_t,
}

// =============================================================================
// Engine functions (eiface.h, through pfnAddServerCommand)
// =============================================================================

/// Engine table slot this plugin never calls
pub type Unused = Option<unsafe extern "C" fn()>;

pub type PfnServerPrint = Option<unsafe extern "C" fn(*const c_char)>;
pub type PfnCvarGetFloat = Option<unsafe extern "C" fn(*const c_char) -> c_float>;
pub type PfnCvarGetPointer = Option<unsafe extern "C" fn(*const c_char) -> *mut cvar_t>;
pub type PfnCvarRegister = Option<unsafe extern "C" fn(*mut cvar_t)>;
pub type PfnTraceLine = Option<
    unsafe extern "C" fn(*const c_float, *const c_float, c_int, *mut edict_t, *mut TraceResult),
>;
pub type PfnSzFromIndex = Option<unsafe extern "C" fn(string_t) -> *const c_char>;
pub type PfnEntOffsetOfPEntity = Option<unsafe extern "C" fn(*const edict_t) -> c_int>;
pub type PfnPEntityOfEntIndex = Option<unsafe extern "C" fn(c_int) -> *mut edict_t>;
pub type PfnCmdArgv = Option<unsafe extern "C" fn(c_int) -> *const c_char>;
pub type PfnCmdArgc = Option<unsafe extern "C" fn() -> c_int>;
pub type PfnAddServerCommand =
    Option<unsafe extern "C" fn(*const c_char, Option<unsafe extern "C" fn()>)>;

/// Engine function table prefix. Metamod hands out a pointer to the full
/// table; everything after `pfn_add_server_command` is never read.
#[allow(dead_code)]
#[repr(C)]
pub struct EngineFuncs {
    pub pfn_precache_model: Unused,
    pub pfn_precache_sound: Unused,
    pub pfn_set_model: Unused,
    pub pfn_model_index: Unused,
    pub pfn_model_frames: Unused,
    pub pfn_set_size: Unused,
    pub pfn_change_level: Unused,
    pub pfn_get_spawn_parms: Unused,
    pub pfn_save_spawn_parms: Unused,
    pub pfn_vec_to_yaw: Unused,
    pub pfn_vec_to_angles: Unused,
    pub pfn_move_to_origin: Unused,
    pub pfn_change_yaw: Unused,
    pub pfn_change_pitch: Unused,
    pub pfn_find_entity_by_string: Unused,
    pub pfn_get_entity_illum: Unused,
    pub pfn_find_entity_in_sphere: Unused,
    pub pfn_find_client_in_pvs: Unused,
    pub pfn_entities_in_pvs: Unused,
    pub pfn_make_vectors: Unused,
    pub pfn_angle_vectors: Unused,
    pub pfn_create_entity: Unused,
    pub pfn_remove_entity: Unused,
    pub pfn_create_named_entity: Unused,
    pub pfn_make_static: Unused,
    pub pfn_ent_is_on_floor: Unused,
    pub pfn_drop_to_floor: Unused,
    pub pfn_walk_move: Unused,
    pub pfn_set_origin: Unused,
    pub pfn_emit_sound: Unused,
    pub pfn_emit_ambient_sound: Unused,
    pub pfn_trace_line: PfnTraceLine,
    pub pfn_trace_toss: Unused,
    pub pfn_trace_monster_hull: Unused,
    pub pfn_trace_hull: Unused,
    pub pfn_trace_model: Unused,
    pub pfn_trace_texture: Unused,
    pub pfn_trace_sphere: Unused,
    pub pfn_get_aim_vector: Unused,
    pub pfn_server_command: Unused,
    pub pfn_server_execute: Unused,
    pub pfn_client_command: Unused,
    pub pfn_particle_effect: Unused,
    pub pfn_light_style: Unused,
    pub pfn_decal_index: Unused,
    pub pfn_point_contents: Unused,
    pub pfn_message_begin: Unused,
    pub pfn_message_end: Unused,
    pub pfn_write_byte: Unused,
    pub pfn_write_char: Unused,
    pub pfn_write_short: Unused,
    pub pfn_write_long: Unused,
    pub pfn_write_angle: Unused,
    pub pfn_write_coord: Unused,
    pub pfn_write_string: Unused,
    pub pfn_write_entity: Unused,
    pub pfn_cvar_register: PfnCvarRegister,
    pub pfn_cvar_get_float: PfnCvarGetFloat,
    pub pfn_cvar_get_string: Unused,
    pub pfn_cvar_set_float: Unused,
    pub pfn_cvar_set_string: Unused,
    pub pfn_alert_message: Unused,
    pub pfn_engine_fprintf: Unused,
    pub pfn_alloc_ent_private_data: Unused,
    pub pfn_ent_private_data: Unused,
    pub pfn_free_ent_private_data: Unused,
    pub pfn_sz_from_index: PfnSzFromIndex,
    pub pfn_alloc_string: Unused,
    pub pfn_get_vars_of_ent: Unused,
    pub pfn_pentity_of_ent_offset: Unused,
    pub pfn_ent_offset_of_pentity: PfnEntOffsetOfPEntity,
    pub pfn_index_of_edict: Unused,
    pub pfn_pentity_of_ent_index: PfnPEntityOfEntIndex,
    pub pfn_find_entity_by_vars: Unused,
    pub pfn_get_model_ptr: Unused,
    pub pfn_reg_user_msg: Unused,
    pub pfn_animation_auto_move: Unused,
    pub pfn_get_bone_position: Unused,
    pub pfn_function_from_name: Unused,
    pub pfn_name_for_function: Unused,
    pub pfn_client_printf: Unused,
    pub pfn_server_print: PfnServerPrint,
    pub pfn_cmd_args: Unused,
    pub pfn_cmd_argv: PfnCmdArgv,
    pub pfn_cmd_argc: PfnCmdArgc,
    pub pfn_get_attachment: Unused,
    pub pfn_crc32_init: Unused,
    pub pfn_crc32_process_buffer: Unused,
    pub pfn_crc32_process_byte: Unused,
    pub pfn_crc32_final: Unused,
    pub pfn_random_long: Unused,
    pub pfn_random_float: Unused,
    pub pfn_set_view: Unused,
    pub pfn_time: Unused,
    pub pfn_crosshair_angle: Unused,
    pub pfn_load_file_for_me: Unused,
    pub pfn_free_file: Unused,
    pub pfn_end_section: Unused,
    pub pfn_compare_file_time: Unused,
    pub pfn_get_game_dir: Unused,
    pub pfn_cvar_register_variable: Unused,
    pub pfn_fade_client_volume: Unused,
    pub pfn_set_client_max_speed: Unused,
    pub pfn_create_fake_client: Unused,
    pub pfn_run_player_move: Unused,
    pub pfn_number_of_entities: Unused,
    pub pfn_get_info_key_buffer: Unused,
    pub pfn_info_key_value: Unused,
    pub pfn_set_key_value: Unused,
    pub pfn_set_client_key_value: Unused,
    pub pfn_is_map_valid: Unused,
    pub pfn_static_decal: Unused,
    pub pfn_precache_generic: Unused,
    pub pfn_get_player_userid: Unused,
    pub pfn_build_sound_msg: Unused,
    pub pfn_is_dedicated_server: Unused,
    pub pfn_cvar_get_pointer: PfnCvarGetPointer,
    pub pfn_get_player_wonid: Unused,
    pub pfn_info_remove_key: Unused,
    pub pfn_get_physics_key_value: Unused,
    pub pfn_set_physics_key_value: Unused,
    pub pfn_get_physics_info_string: Unused,
    pub pfn_precache_event: Unused,
    pub pfn_playback_event: Unused,
    pub pfn_set_fat_pvs: Unused,
    pub pfn_set_fat_pas: Unused,
    pub pfn_check_visibility: Unused,
    pub pfn_delta_set_field: Unused,
    pub pfn_delta_unset_field: Unused,
    pub pfn_delta_add_encoder: Unused,
    pub pfn_get_current_player: Unused,
    pub pfn_can_skip_player: Unused,
    pub pfn_delta_find_field: Unused,
    pub pfn_delta_set_field_by_index: Unused,
    pub pfn_delta_unset_field_by_index: Unused,
    pub pfn_set_group_mask: Unused,
    pub pfn_create_instanced_baseline: Unused,
    pub pfn_cvar_direct_set: Unused,
    pub pfn_force_unmodified: Unused,
    pub pfn_get_player_stats: Unused,
    pub pfn_add_server_command: PfnAddServerCommand,
}

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use super::*;

    #[test]
    fn test_entvars_layout() {
        assert_eq!(offset_of!(entvars_t, origin), 8);
        assert_eq!(offset_of!(entvars_t, v_angle), 8 + 9 * 12);
        assert_eq!(offset_of!(entvars_t, health), 0x160);
    }

    #[test]
    fn test_trace_result_layout() {
        assert_eq!(offset_of!(TraceResult, end_pos), 20);
        assert_eq!(offset_of!(TraceResult, hit), 48);
    }

    #[test]
    fn test_engine_table_slots() {
        let slot = size_of::<Unused>();
        assert_eq!(offset_of!(EngineFuncs, pfn_trace_line), 31 * slot);
        assert_eq!(offset_of!(EngineFuncs, pfn_server_print), 81 * slot);
        assert_eq!(offset_of!(EngineFuncs, pfn_cvar_get_pointer), 116 * slot);
        assert_eq!(offset_of!(EngineFuncs, pfn_add_server_command), 140 * slot);
    }
}
