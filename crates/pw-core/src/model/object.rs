use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::context::{Context, WeakContext};
use crate::id::GameObjectId;

/// Which context a game object currently belongs to.
///
/// Held weakly, so a dropped context simply reads as no membership.
#[derive(Default)]
pub struct Membership {
    context: RefCell<WeakContext>,
}

impl Membership {
    /// The current context, if it still exists.
    pub fn context(&self) -> Option<Context> {
        self.context.borrow().upgrade()
    }

    fn set(&self, context: &Context) {
        *self.context.borrow_mut() = context.downgrade();
    }
}

impl fmt::Debug for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.context().map(|c| c.name().to_string());
        f.debug_struct("Membership").field("context", &name).finish()
    }
}

/// Anything that can sit in a context's roster.
pub trait GameObject: fmt::Debug {
    /// Stable identity within a roster.
    fn id(&self) -> GameObjectId;

    /// The object's context membership.
    fn membership(&self) -> &Membership;

    /// Support downcasting to concrete types.
    fn as_any(&self) -> &dyn Any;

    /// The context the object belongs to, if any.
    fn context(&self) -> Option<Context> {
        self.membership().context()
    }
}

/// Move `object` out of its current context's roster and into `to`'s.
pub fn relocate(object: &Rc<dyn GameObject>, to: &Context) {
    let from = object.context();
    if let Some(from) = &from {
        if from.ptr_eq(to) {
            return;
        }
        from.remove_game_object(object.id());
    }
    object.membership().set(to);
    to.add_game_object(Rc::clone(object));

    let origin = from.as_ref().map_or("nowhere", |c| c.name());
    to.logger().log_tagged(
        &format!("GameObject {}", object.id()),
        &format!("moved from {origin} to {}", to.name()),
    );
}

/// A plain game object with no data of its own.
#[derive(Debug, Default)]
pub struct Entity {
    id: GameObjectId,
    membership: Membership,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameObject for Entity {
    fn id(&self) -> GameObjectId {
        self.id
    }

    fn membership(&self) -> &Membership {
        &self.membership
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
