use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use pw_core::model::GameObject;
use pw_core::{Context, Event, EventEffect};
use pw_script::{ScriptError, ScriptResult, Value};

use super::ball::Ball;
use super::view::AsciiView;

/// Payload key naming what an event does.
pub(crate) const KIND: &str = "kind";
/// Payload key holding the full id of the ball an event acts on.
pub(crate) const BALL: &str = "ball";
/// [`KIND`] value carried by move events.
pub(crate) const MOVE: &str = "move";

/// Where rendered frames wait for the driver to collect them.
#[derive(Debug)]
pub struct Screen {
    pub(crate) view: AsciiView,
    pub(crate) frames: RefCell<VecDeque<String>>,
}

impl Screen {
    pub(crate) fn new(view: AsciiView) -> Self {
        Self {
            view,
            frames: RefCell::new(VecDeque::new()),
        }
    }
}

fn origin_of(event: &Event) -> ScriptResult<Context> {
    event
        .origin()
        .ok_or_else(|| ScriptError::Effect(format!("{event} outlived its context")))
}

fn as_ball(object: &dyn GameObject) -> Option<&Ball> {
    object.as_any().downcast_ref::<Ball>()
}

/// Re-fires itself, then queues a frame render and one move per ball.
///
/// Moves are pushed last so they are pumped before the render.
pub struct Heartbeat {
    screen: Rc<Screen>,
}

impl Heartbeat {
    pub(crate) fn event(origin: &Context, screen: Rc<Screen>) -> Event {
        Event::new("Heartbeat", origin, Self { screen })
    }
}

impl EventEffect for Heartbeat {
    fn eval_event(&self, event: &Event) -> ScriptResult<()> {
        let origin = origin_of(event)?;
        origin.fire_event(event.clone());
        origin.fire_event(Event::new(
            "Render",
            &origin,
            RenderFrame {
                screen: Rc::clone(&self.screen),
            },
        ));
        for object in origin.game_objects() {
            let Some(ball) = as_ball(object.as_ref()) else {
                continue;
            };
            let name = format!("Ball-move-{ball}");
            origin.fire_event(MoveBall::event(&origin, Rc::clone(&object), name));
        }
        Ok(())
    }
}

/// Draws the roster into the shared screen.
pub struct RenderFrame {
    screen: Rc<Screen>,
}

impl EventEffect for RenderFrame {
    fn eval_event(&self, event: &Event) -> ScriptResult<()> {
        let origin = origin_of(event)?;
        let frame = self.screen.view.render(&origin);
        self.screen.frames.borrow_mut().push_back(frame);
        Ok(())
    }
}

/// Advances one ball by its velocity.
pub struct MoveBall {
    target: Rc<dyn GameObject>,
}

impl MoveBall {
    /// A move event whose payload names the ball, so interceptors can find it.
    pub(crate) fn event(origin: &Context, target: Rc<dyn GameObject>, name: String) -> Event {
        let payload = HashMap::from([
            (KIND.to_string(), Value::from(MOVE)),
            (BALL.to_string(), Value::from(target.id().0.to_string())),
        ]);
        Event::builder(Self { target }, origin)
            .name(name)
            .payload(payload)
            .build()
    }
}

impl EventEffect for MoveBall {
    fn eval_event(&self, _event: &Event) -> ScriptResult<()> {
        if let Some(ball) = as_ball(self.target.as_ref()) {
            ball.go();
        }
        Ok(())
    }
}

/// Turns a ball back from the arena edge it is heading through.
pub struct ReverseBall {
    target: Rc<dyn GameObject>,
    width: usize,
    height: usize,
    bounces: Rc<Cell<u64>>,
}

impl ReverseBall {
    pub(crate) fn event(
        origin: &Context,
        target: Rc<dyn GameObject>,
        name: String,
        (width, height): (usize, usize),
        bounces: Rc<Cell<u64>>,
    ) -> Event {
        let effect = Self {
            target,
            width,
            height,
            bounces,
        };
        Event::new(name, origin, effect)
    }
}

impl EventEffect for ReverseBall {
    fn eval_event(&self, _event: &Event) -> ScriptResult<()> {
        if let Some(ball) = as_ball(self.target.as_ref()) {
            ball.bounce(self.width, self.height);
            self.bounces.set(self.bounces.get() + 1);
        }
        Ok(())
    }
}
