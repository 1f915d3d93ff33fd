// Gate state classification
//
// Pure mapping from one telemetry snapshot to a discrete gate state.
// No I/O, no mutable state; the controller decides what to do with the
// answer.

use strum::Display;

use varco_api::TelemetrySnapshot;

/// Discrete operating state of the gate.
///
/// Derived from telemetry only -- callers never set it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum GateState {
    Open,
    Moving,
    Closed,
    Stopped,
    /// Telemetry could not be classified. The safe default.
    Unknown,
}

/// Classify a telemetry snapshot.
///
/// First match wins, and the order is load-bearing: motion beats
/// partial-position ambiguity, and the rest-with-positive-position check
/// runs before the all-zero check -- a fully closed gate (every field
/// zero) reads as Closed, not Stopped, only because the Stopped rule
/// demands a strictly positive position.
pub fn classify(snapshot: &TelemetrySnapshot) -> GateState {
    let TelemetrySnapshot {
        first_engine_pos: pos1,
        second_engine_pos: pos2,
        first_engine_vel: vel1,
        second_engine_vel: vel2,
    } = *snapshot;

    let at_rest = vel1 == 0 && vel2 == 0;

    if pos1 == 100 && pos2 == 100 && at_rest {
        return GateState::Open;
    }
    if at_rest && (pos1 > 0 || pos2 > 0) {
        return GateState::Stopped;
    }
    if pos1 == 0 && pos2 == 0 && at_rest {
        return GateState::Closed;
    }
    if vel1 > 0 || vel2 > 0 {
        return GateState::Moving;
    }

    GateState::Unknown
}
