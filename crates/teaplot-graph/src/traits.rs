use crate::animation::{StartOutcome, StepOutcome};
use crate::error::GraphResult;
use crate::range::AxisRanges;
use crate::scene::SceneContext;

/// Something that owns nodes in the scenes.
pub trait Drawable {
    /// Add (or rebuild) the object's nodes.
    fn draw(&mut self, ctx: &mut SceneContext<'_>);

    /// Remove the object's nodes, keeping its own state.
    fn erase(&mut self, ctx: &mut SceneContext<'_>);
}

pub trait Scalable {
    fn set_limits(&mut self, limits: &AxisRanges, ctx: &mut SceneContext<'_>) -> GraphResult<()>;
}

/// A reveal sweep stepped once per displayed frame.
pub trait Animatable {
    fn start_animation(&mut self, duration_ms: f64, now_ms: f64, ctx: &mut SceneContext<'_>) -> StartOutcome;

    fn step_animation(&mut self, now_ms: f64, ctx: &mut SceneContext<'_>) -> StepOutcome;

    fn stop_animation(&mut self) -> bool;

    fn is_animating(&self) -> bool;
}
