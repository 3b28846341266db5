//! Fight behavior: deliver queued signals to each controller, then advance
//! its re-evaluation task by the scaled tick time.

use std::collections::BTreeMap;

use hecs::{Entity, World};
use tracing::{error, info};

use skirmish_core::error::FightError;
use skirmish_core::events::{FightEvent, FightSignal};
use skirmish_core::types::UnitId;
use skirmish_fight_ai::{ControllerOutput, EngagementController, Mobility};

use crate::arena::FightContext;
use crate::mailbox::FightMailbox;

/// Returns the units whose controllers ordered an escape this tick.
pub fn run(
    world: &World,
    index: &BTreeMap<UnitId, Entity>,
    controllers: &mut BTreeMap<UnitId, EngagementController<UnitId>>,
    mailbox: &mut FightMailbox,
    dt: f64,
    events: &mut Vec<FightEvent>,
) -> Result<Vec<UnitId>, FightError> {
    let mut ctx = FightContext::new(world, index);

    for (&unit, controller) in controllers.iter_mut() {
        for signal in mailbox.drain(unit) {
            match signal {
                FightSignal::Lifecycle(event) => {
                    // The opponent is read before handling: a tracking test
                    // leaves the controller idle again.
                    let opponent = ctx.tracked_unit(unit);
                    let output = controller
                        .handle_lifecycle(event, &mut ctx)
                        .inspect_err(|err| {
                            error!(%unit, ?event, %err, "controller rejected event")
                        })?;
                    record(unit, opponent, controller, output, events);
                }
                FightSignal::Proximity(event) => {
                    controller.handle_proximity(event, &ctx);
                }
            }
        }

        let opponent = controller.primary_opponent();
        let output = controller
            .tick(dt, &mut ctx)
            .inspect_err(|err| error!(%unit, %err, "re-evaluation failed"))?;
        record(unit, opponent, controller, output, events);
    }

    Ok(ctx.into_escapes())
}

fn record(
    unit: UnitId,
    fallback_opponent: Option<UnitId>,
    controller: &EngagementController<UnitId>,
    output: ControllerOutput<UnitId>,
    events: &mut Vec<FightEvent>,
) {
    if let Some(opponent) = output.started {
        events.push(FightEvent::FightStarted { unit, opponent });
    }
    if output.escaped {
        let opponent = controller.primary_opponent().or(fallback_opponent);
        if let (Some(opponent), Some(assessment)) = (opponent, output.assessment) {
            events.push(FightEvent::EscapeOrdered {
                unit,
                opponent,
                win_time: assessment.win_time,
                lose_time: assessment.lose_time,
            });
        }
    }
    if let Some(reason) = output.ended {
        info!(%unit, ?reason, "fight ended");
        events.push(FightEvent::FightEnded { unit, reason });
    }
}
