//! `entinfo <entityIndex>`: dump an entity's variables.

use super::{resolve_entity, CommandError, Report};
use crate::context::PluginContext;
use crate::engine::Engine;

pub const NAME: &str = "entinfo";
const USAGE: &str = "entinfo <entityIndex>";

pub fn run<E: Engine>(ctx: &PluginContext<E>, args: &[String]) -> Result<String, CommandError> {
    if args.len() < 2 {
        return Err(CommandError::Usage(USAGE));
    }

    let engine = ctx.engine();
    let target = resolve_entity(engine, &args[1])?;
    let vars = &target.vars;

    let mut report = Report::new("Entity info");
    report
        .field("Index", target.index)
        .field("SerialNumber", engine.serial_number(target.entity))
        .field("Netname", &vars.netname)
        .field("Classname", &vars.classname)
        .field("Globalname", &vars.globalname)
        .field("Origin", vars.origin)
        .field("Angles", vars.angles)
        .field("VAngle", vars.v_angle)
        .field("Model", &vars.model)
        .field("ViewModel", &vars.viewmodel)
        .field("WeaponModel", &vars.weaponmodel)
        .field("Health", vars.health)
        .field("Max Health", vars.max_health)
        .field("Max Speed", vars.max_speed);

    Ok(report.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use crate::commands::RULE;

    #[test]
    fn test_usage_without_index() {
        let ctx = context(engine());
        let err = run(&ctx, &args("entinfo")).unwrap_err();
        assert_eq!(err.to_string(), "Usage: entinfo <entityIndex>");
    }

    #[test]
    fn test_validation_messages() {
        let ctx = context(engine());
        let message = |line: &str| run(&ctx, &args(line)).unwrap_err().to_string();

        assert_eq!(message("entinfo x"), "Invalid entity index");
        assert_eq!(message("entinfo 5"), "Entity not found");
        assert_eq!(message("entinfo 0"), "Entity is null");
        assert_eq!(message("entinfo 2"), "Entity is not valid");
    }

    #[test]
    fn test_report_fields() {
        let ctx = context(engine());
        let report = run(&ctx, &args("entinfo 1")).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(
            lines,
            [
                "",
                RULE,
                "Entity info",
                "Index: 1",
                "SerialNumber: 7",
                "Netname: Gordon",
                "Classname: player",
                "Globalname: ",
                "Origin: [100, 200, 36]",
                "Angles: [0, 90, 0]",
                "VAngle: [0, 90, 0]",
                "Model: models/player.mdl",
                "ViewModel: models/v_crowbar.mdl",
                "WeaponModel: models/p_crowbar.mdl",
                "Health: 100",
                "Max Health: 100",
                "Max Speed: 320",
            ]
        );
    }

    #[test]
    fn test_extra_arguments_ignored() {
        let ctx = context(engine());
        assert!(run(&ctx, &args("entinfo 1 extra")).is_ok());
    }
}
