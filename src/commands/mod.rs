//! Server console commands.
//!
//! Handlers build their whole report as a string; [`execute`] prints either
//! the report or the error. A failing command never affects anything beyond
//! its own invocation.

mod entinfo;
mod traceline;

use std::fmt::{self, Write};

use crate::context::PluginContext;
use crate::engine::{Engine, EntityVars};

/// Separator printed above every report.
const RULE: &str = "=====================================";

/// Command handler signature. `args[0]` is the command name.
pub type Handler<E> = fn(&PluginContext<E>, &[String]) -> Result<String, CommandError>;

/// Names of all commands registered with the engine.
pub const COMMAND_NAMES: [&str; 2] = [entinfo::NAME, traceline::NAME];

/// Why a command invocation was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Too few arguments; carries the usage line.
    Usage(&'static str),
    InvalidEntityIndex,
    EntityNotFound,
    NullEntity,
    InvalidEntity,
    InvalidDistance,
    /// Distance at or below the lower bound.
    DistanceTooSmall(f32),
    /// Distance above the upper bound.
    DistanceTooLarge(f32),
    UnknownCommand(String),
    NotAttached,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(usage) => write!(f, "Usage: {usage}"),
            Self::InvalidEntityIndex => f.write_str("Invalid entity index"),
            Self::EntityNotFound => f.write_str("Entity not found"),
            Self::NullEntity => f.write_str("Entity is null"),
            Self::InvalidEntity => f.write_str("Entity is not valid"),
            Self::InvalidDistance => f.write_str("Invalid distance"),
            Self::DistanceTooSmall(min) => write!(f, "Distance must be greater than {min}"),
            Self::DistanceTooLarge(max) => write!(f, "Distance must not exceed {max}"),
            Self::UnknownCommand(name) => write!(f, "Unknown command: {name}"),
            Self::NotAttached => f.write_str("plugin is not attached"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Look up a handler by command name.
pub fn find<E: Engine>(name: &str) -> Option<Handler<E>> {
    match name {
        entinfo::NAME => Some(entinfo::run::<E>),
        traceline::NAME => Some(traceline::run::<E>),
        _ => None,
    }
}

/// Run the command named by `args[0]` and print its output.
pub fn execute<E: Engine>(ctx: &PluginContext<E>, args: &[String]) {
    let name = args.first().map_or("", String::as_str);

    let result = match find::<E>(name) {
        Some(handler) => handler(ctx, args),
        None => Err(CommandError::UnknownCommand(name.to_string())),
    };

    match result {
        Ok(report) => ctx.engine().server_print(&report),
        Err(e) => {
            tracing::debug!(command = name, error = %e, "command rejected");
            ctx.engine().server_print(&format!("{e}\n"));
        }
    }
}

/// Line-oriented command output.
struct Report(String);

impl Report {
    /// Start a report with a blank line, the rule and a title.
    fn new(title: &str) -> Self {
        Self(format!("\n{RULE}\n{title}\n"))
    }

    fn field(&mut self, label: &str, value: impl fmt::Display) -> &mut Self {
        // Writing into a String can't fail.
        let _ = writeln!(self.0, "{label}: {value}");
        self
    }

    fn line(&mut self, text: &str) -> &mut Self {
        self.0.push_str(text);
        self.0.push('\n');
        self
    }

    fn finish(self) -> String {
        self.0
    }
}

/// Entity resolved from a command argument.
struct Target<T> {
    index: i32,
    entity: T,
    vars: EntityVars,
}

/// Parse an entity index and check the entity is usable.
fn resolve_entity<E: Engine>(engine: &E, arg: &str) -> Result<Target<E::Entity>, CommandError> {
    let index: i32 = arg.parse().map_err(|_| CommandError::InvalidEntityIndex)?;

    let entity = engine
        .entity_of_index(index)
        .ok_or(CommandError::EntityNotFound)?;

    if engine.is_null_entity(entity) {
        return Err(CommandError::NullEntity);
    }

    let vars = engine
        .entity_vars(entity)
        .ok_or(CommandError::InvalidEntity)?;

    Ok(Target {
        index,
        entity,
        vars,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use glam::Vec3;

    use crate::config::PluginConfig;
    use crate::context::PluginContext;
    use crate::engine::mock::{MockEngine, MockEntity};
    use crate::engine::EntityVars;

    pub fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    pub fn player() -> MockEntity {
        MockEntity {
            null: false,
            serial: 7,
            vars: Some(EntityVars {
                netname: "Gordon".to_string(),
                classname: "player".to_string(),
                globalname: String::new(),
                model: "models/player.mdl".to_string(),
                viewmodel: "models/v_crowbar.mdl".to_string(),
                weaponmodel: "models/p_crowbar.mdl".to_string(),
                origin: Vec3::new(100.0, 200.0, 36.0),
                angles: Vec3::new(0.0, 90.0, 0.0),
                v_angle: Vec3::new(0.0, 90.0, 0.0),
                view_ofs: Vec3::new(0.0, 0.0, 28.0),
                health: 100.0,
                max_health: 100.0,
                max_speed: 320.0,
            }),
        }
    }

    pub fn engine() -> MockEngine {
        MockEngine::default()
            .with_entity(
                0,
                MockEntity {
                    null: true,
                    ..MockEntity::default()
                },
            )
            .with_entity(1, player())
            .with_entity(
                2,
                MockEntity {
                    null: false,
                    serial: 3,
                    vars: None,
                },
            )
    }

    pub fn context(engine: MockEngine) -> PluginContext<MockEngine> {
        PluginContext::new(engine, PluginConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_command_names_resolve() {
        for name in COMMAND_NAMES {
            assert!(find::<crate::engine::mock::MockEngine>(name).is_some(), "{name}");
        }
        assert!(find::<crate::engine::mock::MockEngine>("noclip").is_none());
    }

    #[test]
    fn test_execute_prints_report() {
        let ctx = context(engine());
        execute(&ctx, &args("entinfo 1"));

        let out = ctx.engine().output();
        assert!(out.contains("Entity info"));
        assert!(out.contains("Netname: Gordon"));
    }

    #[test]
    fn test_execute_prints_error_line() {
        let ctx = context(engine());
        execute(&ctx, &args("entinfo 42"));
        assert_eq!(ctx.engine().output(), "Entity not found\n");
    }

    #[test]
    fn test_execute_unknown_command() {
        let ctx = context(engine());
        execute(&ctx, &args("noclip"));
        assert_eq!(ctx.engine().output(), "Unknown command: noclip\n");
    }

    #[test]
    fn test_resolve_entity_order() {
        let engine = engine();
        assert_eq!(
            resolve_entity(&engine, "abc").err(),
            Some(CommandError::InvalidEntityIndex)
        );
        assert_eq!(
            resolve_entity(&engine, "99").err(),
            Some(CommandError::EntityNotFound)
        );
        assert_eq!(
            resolve_entity(&engine, "0").err(),
            Some(CommandError::NullEntity)
        );
        assert_eq!(
            resolve_entity(&engine, "2").err(),
            Some(CommandError::InvalidEntity)
        );

        let target = resolve_entity(&engine, "1").unwrap();
        assert_eq!(target.index, 1);
        assert_eq!(target.entity, 1);
        assert_eq!(target.vars.classname, "player");
    }

    #[test]
    fn test_index_is_not_trimmed() {
        let engine = engine();
        assert_eq!(
            resolve_entity(&engine, " 1").err(),
            Some(CommandError::InvalidEntityIndex)
        );
        assert_eq!(
            resolve_entity(&engine, "1.0").err(),
            Some(CommandError::InvalidEntityIndex)
        );
    }
}
