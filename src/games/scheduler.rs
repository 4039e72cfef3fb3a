use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use super::{GameSession, Phase, SessionResult, Transition};

/// Run a session until it finishes, interleaving player inputs with ticks.
///
/// Ticks are only delivered while the session is `Playing`. Returns `None` if
/// the input channel closes before the session finishes (abandoned game).
pub async fn drive<G, F>(
    mut session: G,
    mut inputs: mpsc::Receiver<G::Input>,
    tick_every: Duration,
    mut tick_input: F,
) -> Option<SessionResult>
where
    G: GameSession,
    F: FnMut() -> G::Input,
{
    let mut ticker = interval(tick_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let transition = tokio::select! {
            input = inputs.recv() => match input {
                Some(input) => session.handle(input),
                None => {
                    debug!("{} session abandoned at score {}", session.game_type(), session.score());
                    return None;
                }
            },
            _ = ticker.tick() => {
                if session.phase() != Phase::Playing {
                    continue;
                }
                session.handle(tick_input())
            }
        };

        if let Transition::Finished(result) = transition {
            debug!("{} session finished with score {}", result.game_type, result.score);
            return Some(result);
        }
    }
}
