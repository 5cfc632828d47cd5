//! Turn clock parameters into search deadlines.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use karst_core::Color;

use crate::search::control::SearchControl;

/// Budget for one move from remaining time `t` and increment `inc`:
///
/// - soft (don't start another iteration): `min(t/20 + inc/2, t/2)`
/// - hard (abort mid-search):              `min(t/5 + inc/2, t)`
pub fn compute_limits(remaining: Duration, increment: Duration) -> (Duration, Duration) {
    let t = remaining.as_millis() as u64;
    let inc = increment.as_millis() as u64;

    let soft = (t / 20 + inc / 2).min(t / 2);
    let hard = (t / 5 + inc / 2).min(t);

    (
        Duration::from_millis(soft.max(1)),
        Duration::from_millis(hard.max(1)),
    )
}

/// Go-command time fields, already reduced to the side to move.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoTimes {
    pub wtime: Option<Duration>,
    pub btime: Option<Duration>,
    pub winc: Option<Duration>,
    pub binc: Option<Duration>,
    pub movetime: Option<Duration>,
    pub infinite: bool,
}

/// Build the [`SearchControl`] for a `go` command.
///
/// `movetime` pins both deadlines; a clock yields the standard split;
/// `infinite` or a bare/depth-only `go` never stops on its own.
pub fn limits_from_go(times: &GoTimes, side: Color, stopped: Arc<AtomicBool>) -> SearchControl {
    if times.infinite {
        return SearchControl::infinite(stopped);
    }

    if let Some(movetime) = times.movetime {
        return SearchControl::timed(stopped, movetime, movetime);
    }

    let (remaining, increment) = match side {
        Color::White => (times.wtime, times.winc),
        Color::Black => (times.btime, times.binc),
    };
    if let Some(remaining) = remaining {
        let (soft, hard) = compute_limits(remaining, increment.unwrap_or(Duration::ZERO));
        return SearchControl::timed(stopped, soft, hard);
    }

    SearchControl::infinite(stopped)
}
