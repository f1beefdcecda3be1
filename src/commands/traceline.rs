//! `traceline <entityIndex> <forwardDistance>`: trace along an entity's aim.

use super::{resolve_entity, CommandError, Report};
use crate::config::TraceLimits;
use crate::context::PluginContext;
use crate::engine::{Engine, TraceMode};
use crate::math::angles_to_forward;

pub const NAME: &str = "traceline";
const USAGE: &str = "traceline <entityID> <forwardDistance>";

pub fn run<E: Engine>(ctx: &PluginContext<E>, args: &[String]) -> Result<String, CommandError> {
    if args.len() < 3 {
        return Err(CommandError::Usage(USAGE));
    }

    let engine = ctx.engine();
    let target = resolve_entity(engine, &args[1])?;
    let distance = parse_distance(&args[2], ctx.trace_limits())?;

    let vars = &target.vars;
    let start = vars.origin + vars.view_ofs;
    let end = start + angles_to_forward(vars.v_angle) * distance;

    let trace = engine.trace_line(start, end, TraceMode::DontIgnoreMonsters, target.entity);

    let mut report = Report::new("Trace line");
    report
        .field("Start", start)
        .field("End", end)
        .field("AllSolid", trace.all_solid)
        .field("StartSolid", trace.start_solid)
        .field("InOpen", trace.in_open)
        .field("InWater", trace.in_water)
        .field("Fraction", trace.fraction)
        .field("EndPos", trace.end_pos);

    let hit_vars = trace
        .hit
        .filter(|&hit| !engine.is_null_entity(hit))
        .and_then(|hit| engine.entity_vars(hit));

    match hit_vars {
        Some(hit) => {
            report
                .field("Hit NetName", &hit.netname)
                .field("Hit Classname", &hit.classname);
        }
        None => {
            report.line("Hit: none");
        }
    }

    report.field("HitGroup", trace.hit_group);

    Ok(report.finish())
}

/// Parse the distance argument and check it against `limits`.
fn parse_distance(arg: &str, limits: TraceLimits) -> Result<f32, CommandError> {
    let distance: f32 = arg
        .parse()
        .ok()
        .filter(|d: &f32| d.is_finite())
        .ok_or(CommandError::InvalidDistance)?;

    if distance <= limits.min_distance {
        return Err(CommandError::DistanceTooSmall(limits.min_distance));
    }

    if distance > limits.max_distance {
        return Err(CommandError::DistanceTooLarge(limits.max_distance));
    }

    Ok(distance)
}
