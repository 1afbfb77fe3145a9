use std::cell::Cell;
use std::rc::Rc;

use pw_core::model::GameObject;
use pw_core::{Context, Event, Interceptor, Property};
use pw_script::Value;

use super::ball::Ball;
use super::events::{BALL, KIND, MOVE, MoveBall, ReverseBall};

/// Keeps balls inside the arena.
///
/// Every event is looked at once and stamped. A move whose ball is touching
/// an edge and heading through it is vetoed; in its place the property
/// queues a pre-stamped move and, above it, a reverse, so the ball turns
/// around before it takes the replacement step.
#[derive(Debug)]
pub struct BounceProperty {
    width: usize,
    height: usize,
    bounces: Rc<Cell<u64>>,
}

impl BounceProperty {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bounces: Rc::new(Cell::new(0)),
        }
    }

    /// Count reversals into `bounces`.
    pub fn with_counter(mut self, bounces: Rc<Cell<u64>>) -> Self {
        self.bounces = bounces;
        self
    }

    /// Reversals performed so far.
    pub fn bounces(&self) -> u64 {
        self.bounces.get()
    }

    /// Wrap in a [`Property`] named `Bounce`.
    pub fn into_property(self) -> Property {
        Property::named("Bounce", self)
    }
}

/// The ball a move event targets, looked up in `context`'s roster.
fn moved_ball(event: &Event, context: &Context) -> Option<Rc<dyn GameObject>> {
    let key = {
        let payload = event.payload();
        if payload.get(KIND).and_then(Value::as_str) != Some(MOVE) {
            return None;
        }
        payload.get(BALL)?.as_str()?.to_string()
    };
    context
        .game_objects()
        .into_iter()
        .find(|o| o.id().0.to_string() == key)
}

impl Interceptor for BounceProperty {
    fn on_event(&self, property: &Property, event: &Event, published_by: &Context) -> bool {
        if event.stamp_exists(property) {
            return true;
        }
        event.stamp(property);

        let Some(target) = moved_ball(event, published_by) else {
            return true;
        };
        let Some(ball) = target.as_any().downcast_ref::<Ball>() else {
            return true;
        };
        if !ball.leaving(self.width, self.height) {
            return true;
        }

        event.invalidate();
        let unstick = MoveBall::event(
            published_by,
            Rc::clone(&target),
            format!("Ball-bounce-move-unstick-{ball}"),
        );
        unstick.stamp(property);
        published_by.fire_event(unstick);
        published_by.fire_event(ReverseBall::event(
            published_by,
            Rc::clone(&target),
            format!("Ball-bounce-{ball}"),
            (self.width, self.height),
            Rc::clone(&self.bounces),
        ));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &Event) -> pw_script::ScriptResult<()> {
        Ok(())
    }

    fn arena() -> (Context, Property, Rc<Cell<u64>>) {
        let context = Context::new("Arena");
        let bounces = Rc::new(Cell::new(0));
        let property = BounceProperty::new(16, 16)
            .with_counter(Rc::clone(&bounces))
            .into_property();
        context.subscribe(&property);
        (context, property, bounces)
    }

    fn add_ball(context: &Context, ball: Ball) -> Rc<dyn GameObject> {
        let object: Rc<dyn GameObject> = Rc::new(ball);
        context.add_game_object(Rc::clone(&object));
        object
    }

    fn position(object: &Rc<dyn GameObject>) -> (f32, f32) {
        object.as_any().downcast_ref::<Ball>().unwrap().position()
    }

    #[test]
    fn free_moves_pass_through() {
        let (context, property, bounces) = arena();
        let object = add_ball(&context, Ball::new(8.0, 8.0, 3.0, 0.5, 0.5));
        let event = MoveBall::event(&context, Rc::clone(&object), "m".into());
        context.fire_event(event.clone());
        context.pump().unwrap();

        assert!(event.is_valid());
        assert!(event.stamp_exists(&property));
        assert_eq!(position(&object), (8.5, 8.5));
        assert_eq!(context.pending(), 0);
        assert_eq!(bounces.get(), 0);
    }

    #[test]
    fn edge_move_is_replaced_by_bounce_and_unstick() {
        let (context, property, bounces) = arena();
        let object = add_ball(&context, Ball::new(3.0, 8.0, 3.0, -0.5, 0.0));
        let event = MoveBall::event(&context, Rc::clone(&object), "m".into());
        context.fire_event(event.clone());

        context.pump().unwrap();
        assert!(!event.is_valid());
        assert_eq!(position(&object), (3.0, 8.0));
        let stack = context.view_event_stack();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack[0].name(), "Ball-bounce-p(3,8)");
        assert_eq!(stack[1].name(), "Ball-bounce-move-unstick-p(3,8)");
        assert!(stack[1].stamp_exists(&property));

        context.pump().unwrap();
        context.pump().unwrap();
        assert_eq!(bounces.get(), 1);
        assert_eq!(position(&object), (3.5, 8.0));
        assert_eq!(context.pending(), 0);
    }

    #[test]
    fn later_properties_do_not_see_a_vetoed_move() {
        let (context, _property, _) = arena();
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let watcher = Property::named("Watcher", move |_: &Property, _: &Event, _: &Context| {
            counter.set(counter.get() + 1);
            true
        });
        context.subscribe(&watcher);
        let object = add_ball(&context, Ball::new(13.0, 8.0, 3.0, 0.5, 0.0));
        context.fire_event(MoveBall::event(&context, object, "m".into()));

        context.pump().unwrap();
        assert_eq!(seen.get(), 0);
        context.pump().unwrap();
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn events_are_inspected_once() {
        let (context, property, _) = arena();
        let event = Event::new("Other", &context, noop);
        context.fire_event(event.clone());
        context.fire_event(event.clone());
        context.pump().unwrap();
        context.pump().unwrap();
        assert!(event.stamp_exists(&property));
        assert!(event.is_valid());
    }
}
