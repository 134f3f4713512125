//! Optional trace of the geometry checked during a run, recorded as JSON.
//!
//! Everything compiles to nothing unless the `debug` feature is enabled.

use crate::math::Point2d;
#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_TRACE: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

/// Records a motion step that was checked against the environment.
#[allow(unused)]
pub fn debug_step(step: usize, from: Point2d, to: Point2d) {
    #[cfg(feature = "debug")]
    DEBUG_TRACE.with(|trace| {
        trace.borrow_mut().push(json!({
            "type": "step",
            "step": step,
            "from": [from.x, from.y],
            "to": [to.x, to.y],
        }))
    })
}

/// Records where a run collided, and the obstacle edge it crossed if known.
#[allow(unused)]
pub fn debug_collision(at: Point2d, edge: Option<[Point2d; 2]>) {
    #[cfg(feature = "debug")]
    DEBUG_TRACE.with(|trace| {
        trace.borrow_mut().push(json!({
            "type": "collision",
            "at": [at.x, at.y],
            "edge": edge.map(|[a, b]| [[a.x, a.y], [b.x, b.y]]),
        }))
    })
}

/// Takes everything recorded on this thread since the last call.
#[cfg(feature = "debug")]
pub fn take_debug_trace() -> serde_json::Value {
    json!(DEBUG_TRACE.with(|trace| trace.take()))
}
