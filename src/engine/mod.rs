//! Engine capability interface.
//!
//! Everything the plugin needs from the game server goes through [`Engine`].
//! The Metamod host implements it over the raw engine function table; tests
//! implement it over plain data.

use glam::Vec3;

/// How a line trace treats monsters along its path.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceMode {
    DontIgnoreMonsters = 0,
    IgnoreMonsters = 1,
    Missile = 2,
}

impl TraceMode {
    /// Value passed as the engine's `fNoMonsters` argument.
    pub fn raw(self) -> i32 {
        self as i32
    }
}

/// Snapshot of the fields of an entity variable block the commands print.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityVars {
    pub netname: String,
    pub classname: String,
    pub globalname: String,
    pub model: String,
    pub viewmodel: String,
    pub weaponmodel: String,
    pub origin: Vec3,
    pub angles: Vec3,
    /// View angles (player aim).
    pub v_angle: Vec3,
    /// Eye position relative to `origin`.
    pub view_ofs: Vec3,
    pub health: f32,
    pub max_health: f32,
    pub max_speed: f32,
}

/// Outcome of a line trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceResult<E> {
    pub all_solid: bool,
    pub start_solid: bool,
    pub in_open: bool,
    pub in_water: bool,
    /// Portion of the segment travelled before the first obstruction, 1.0 if none.
    pub fraction: f32,
    pub end_pos: Vec3,
    pub hit: Option<E>,
    pub hit_group: i32,
}

/// Operations the game server provides to the plugin.
pub trait Engine {
    /// Opaque entity handle.
    type Entity: Copy;

    /// Look up an entity by its index.
    fn entity_of_index(&self, index: i32) -> Option<Self::Entity>;

    /// Whether the handle refers to no entity (or to the world).
    fn is_null_entity(&self, entity: Self::Entity) -> bool;

    /// Read the entity's variables. `None` when the block is not valid.
    fn entity_vars(&self, entity: Self::Entity) -> Option<EntityVars>;

    fn serial_number(&self, entity: Self::Entity) -> i32;

    /// Cast a line from `start` to `end`, skipping `ignore`.
    fn trace_line(
        &self,
        start: Vec3,
        end: Vec3,
        mode: TraceMode,
        ignore: Self::Entity,
    ) -> TraceResult<Self::Entity>;

    /// Current value of a console variable, `None` if it doesn't exist.
    fn cvar_float(&self, name: &str) -> Option<f32>;

    /// Print a line to the server console.
    fn server_print(&self, msg: &str);
}
