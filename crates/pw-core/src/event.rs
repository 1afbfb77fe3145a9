use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use pw_log::Logger;
use pw_script::{ScriptResult, Value};

use crate::context::{Context, WeakContext};
use crate::id::EventId;
use crate::model::Tile;
use crate::payload::Payload;
use crate::property::Property;

/// What an event does when it survives the interceptor chain.
///
/// The effect may fire further events, including children of `event`, and
/// may pump the context re-entrantly.
pub trait EventEffect {
    /// Run the effect.
    fn eval_event(&self, event: &Event) -> ScriptResult<()>;
}

impl<F> EventEffect for F
where
    F: Fn(&Event) -> ScriptResult<()>,
{
    fn eval_event(&self, event: &Event) -> ScriptResult<()> {
        self(event)
    }
}

struct EventInner {
    id: EventId,
    name: String,
    payload: RefCell<Payload>,
    valid: Cell<bool>,
    origin: WeakContext,
    target: RefCell<WeakContext>,
    parent: RefCell<Weak<EventInner>>,
    children: RefCell<Vec<Event>>,
    effect: Box<dyn EventEffect>,
    logger: Logger,
}

/// A unit of work on a context's stack.
///
/// `Event` is a cheap shared handle. Children are held strongly; the parent,
/// origin, and target are held weakly. Once invalidated an event stays
/// invalid, and invalidation cascades to every descendant.
#[derive(Clone)]
pub struct Event(Rc<EventInner>);

impl Event {
    /// An event named `name` with an empty payload, fired from `origin`.
    pub fn new(
        name: impl Into<String>,
        origin: &Context,
        effect: impl EventEffect + 'static,
    ) -> Self {
        Self::builder(effect, origin).name(name).build()
    }

    /// Start building an event. Unless a name is given, the event is named
    /// after the effect's type.
    pub fn builder<E: EventEffect + 'static>(effect: E, origin: &Context) -> EventBuilder {
        EventBuilder {
            name: short_type_name::<E>().to_string(),
            payload: Payload::new(),
            origin: origin.clone(),
            effect: Box::new(effect),
        }
    }

    pub fn id(&self) -> EventId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Run the effect. The context calls this during `pump`.
    pub fn eval_event(&self) -> ScriptResult<()> {
        self.0.effect.eval_event(self)
    }

    /// Read the payload.
    ///
    /// The guard must be dropped before anything mutates the payload;
    /// [`Event::with_payload`] scopes the borrow for you.
    pub fn payload(&self) -> Ref<'_, Payload> {
        self.0.payload.borrow()
    }

    /// Mutate the payload directly, bypassing the diagnostic log.
    ///
    /// # Panics
    ///
    /// Panics if a [`Event::payload`] guard is still alive.
    pub fn payload_mut(&self) -> RefMut<'_, Payload> {
        self.0.payload.borrow_mut()
    }

    /// Run `f` against the payload and release the borrow before returning.
    pub fn with_payload<R>(&self, f: impl FnOnce(&Payload) -> R) -> R {
        f(&self.0.payload.borrow())
    }

    /// Run `f` against the mutable payload, bypassing the diagnostic log.
    ///
    /// # Panics
    ///
    /// Panics if a [`Event::payload`] guard is still alive.
    pub fn with_payload_mut<R>(&self, f: impl FnOnce(&mut Payload) -> R) -> R {
        f(&mut self.0.payload.borrow_mut())
    }

    /// Insert or overwrite one payload entry.
    ///
    /// # Panics
    ///
    /// Panics if a [`Event::payload`] guard is still alive.
    pub fn patch_payload(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        self.log(&format!("added {key}->{value} to payload"));
        self.0.payload.borrow_mut().patch(key, value);
    }

    /// Insert or overwrite several payload entries.
    ///
    /// # Panics
    ///
    /// Panics if a [`Event::payload`] guard is still alive.
    pub fn patch_payload_all(&self, entries: HashMap<String, Value>) {
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort();
        self.log(&format!("added {keys:?} to payload"));
        self.0.payload.borrow_mut().patch_all(entries);
    }

    /// Mark the event as handled by `property`.
    ///
    /// # Panics
    ///
    /// Panics if a [`Event::payload`] guard is still alive.
    pub fn stamp(&self, property: &Property) {
        self.0
            .logger
            .log_tagged(property.name(), &format!("stamped {}", self.0.name));
        self.0.payload.borrow_mut().stamp(property.id());
    }

    /// Remove `property`'s mark.
    ///
    /// # Panics
    ///
    /// Panics if a [`Event::payload`] guard is still alive.
    pub fn unstamp(&self, property: &Property) {
        self.0
            .logger
            .log_tagged(property.name(), &format!("unstamped {}", self.0.name));
        self.0.payload.borrow_mut().unstamp(property.id());
    }

    /// Return `true` if `property` has stamped the event.
    pub fn stamp_exists(&self, property: &Property) -> bool {
        self.0.payload.borrow().stamp_exists(property.id())
    }

    pub fn is_valid(&self) -> bool {
        self.0.valid.get()
    }

    /// Invalidate the event and all of its descendants.
    ///
    /// Events that are already invalid are skipped, so each event logs its
    /// invalidation once even when subtrees overlap.
    pub fn invalidate(&self) {
        let mut pending = vec![self.clone()];
        while let Some(event) = pending.pop() {
            if !event.0.valid.replace(false) {
                continue;
            }
            event.log("invalidated");
            pending.extend(event.0.children.borrow().iter().cloned());
        }
    }

    /// Attach `child` to this event and fire it into this event's origin.
    ///
    /// The child's parent becomes this event, replacing any earlier one,
    /// and the child joins this event's children. A child shared by several
    /// parents is invalidated by whichever parent goes first. Returns
    /// `false`, leaving `child` untouched, only when the origin context is
    /// gone.
    pub fn fire_event_child(&self, child: &Event) -> bool {
        let Some(origin) = self.origin() else {
            self.log(&format!("cannot fire child event {}: origin is gone", child.name()));
            return false;
        };
        self.attach_child(child);
        origin.fire_event(child.clone());
        true
    }

    /// Like [`Event::fire_event_child`], but keeps the event graph a tree.
    ///
    /// Also returns `false` when `child` is this event or one of its
    /// ancestors, or when `child` already has a different parent. A child
    /// attached to an invalid parent is invalidated immediately.
    pub fn try_fire_event_child(&self, child: &Event) -> bool {
        if self.origin().is_some() {
            if child.ptr_eq(self) || self.ancestors().any(|a| a.ptr_eq(child)) {
                self.log(&format!("refused child event {}: it is an ancestor", child.name()));
                return false;
            }
            if child.parent().is_some_and(|existing| !existing.ptr_eq(self)) {
                self.log(&format!("refused child event {}: it has another parent", child.name()));
                return false;
            }
        }
        if !self.fire_event_child(child) {
            return false;
        }
        if !self.is_valid() {
            child.invalidate();
        }
        true
    }

    fn attach_child(&self, child: &Event) {
        self.log(&format!("fired child event {}", child.name()));
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        let mut children = self.0.children.borrow_mut();
        if !children.iter().any(|c| c.ptr_eq(child)) {
            children.push(child.clone());
        }
    }

    pub fn parent(&self) -> Option<Event> {
        self.0.parent.borrow().upgrade().map(Event)
    }

    /// The parent, grandparent, and so on up to the root.
    ///
    /// Stops at the first repeat, so parent loops built through
    /// [`Event::fire_event_child`] terminate.
    pub fn ancestors(&self) -> impl Iterator<Item = Event> {
        let mut seen = vec![self.clone()];
        std::iter::successors(self.parent(), Event::parent).take_while(move |event| {
            if seen.iter().any(|s| s.ptr_eq(event)) {
                return false;
            }
            seen.push(event.clone());
            true
        })
    }

    /// A copy of the child list.
    pub fn children(&self) -> Vec<Event> {
        self.0.children.borrow().clone()
    }

    /// The context the event was created for.
    pub fn origin(&self) -> Option<Context> {
        self.0.origin.upgrade()
    }

    /// The context that last dispatched the event.
    pub fn target(&self) -> Option<Context> {
        self.0.target.borrow().upgrade()
    }

    pub(crate) fn set_target(&self, context: &Context) {
        *self.0.target.borrow_mut() = context.downgrade();
    }

    /// The logger inherited from the origin context.
    pub fn logger(&self) -> &Logger {
        &self.0.logger
    }

    /// Return `true` if both handles refer to the same event.
    pub fn ptr_eq(&self, other: &Event) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn log(&self, message: &str) {
        self.0.logger.log_tagged(&self.0.name, message);
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event: {}", self.0.name)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("valid", &self.0.valid.get())
            .field("children", &self.0.children.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Builder returned by [`Event::builder`].
pub struct EventBuilder {
    name: String,
    payload: Payload,
    origin: Context,
    effect: Box<dyn EventEffect>,
}

impl EventBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Seed the payload with entries.
    pub fn payload(mut self, entries: HashMap<String, Value>) -> Self {
        self.payload.patch_all(entries);
        self
    }

    /// Set where the event happens.
    pub fn location(mut self, tile: Tile) -> Self {
        self.payload.set_location(Some(tile));
        self
    }

    pub fn build(self) -> Event {
        Event(Rc::new(EventInner {
            id: EventId::new(),
            name: self.name,
            payload: RefCell::new(self.payload),
            valid: Cell::new(true),
            origin: self.origin.downgrade(),
            target: RefCell::new(WeakContext::default()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            effect: self.effect,
            logger: self.origin.logger().clone(),
        }))
    }
}

/// Last path segment of a type name, without generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pw_log::CacheLog;

    use super::*;

    fn noop(_: &Event) -> ScriptResult<()> {
        Ok(())
    }

    struct Explode;

    impl EventEffect for Explode {
        fn eval_event(&self, _: &Event) -> ScriptResult<()> {
            Ok(())
        }
    }

    #[test]
    fn name_defaults_to_effect_type() {
        let context = Context::new("c");
        let event = Event::builder(Explode, &context).build();
        assert_eq!(event.name(), "Explode");
        assert_eq!(event.to_string(), "Event: Explode");
    }

    #[test]
    fn builder_seeds_payload_and_location() {
        let context = Context::new("c");
        let mut data = HashMap::new();
        data.insert("power".to_string(), Value::from(9));
        let event = Event::builder(Explode, &context)
            .name("Boom")
            .payload(data)
            .location(Tile::at(2, 3, crate::model::TileKind::Floor))
            .build();
        assert_eq!(event.name(), "Boom");
        assert_eq!(event.payload().get("power"), Some(&Value::from(9)));
        assert_eq!(event.payload().x(), Some(2));
        assert!(event.origin().unwrap().ptr_eq(&context));
        assert!(event.target().is_none());
    }

    #[test]
    fn invalidation_is_monotonic_and_logged_once() {
        let log = Arc::new(CacheLog::new(50).unwrap());
        let context = Context::builder("c").with_logger(log.clone()).build();
        let event = Event::new("E", &context, noop);

        assert!(event.is_valid());
        event.invalidate();
        event.invalidate();
        assert!(!event.is_valid());

        let invalidations = log
            .lines()
            .iter()
            .filter(|l| l.as_str() == "E: invalidated")
            .count();
        assert_eq!(invalidations, 1);
    }

    #[test]
    fn cascading_invalidation() {
        let context = Context::new("c");
        let root = Event::new("root", &context, noop);
        let c1 = Event::new("c1", &context, noop);
        let c2 = Event::new("c2", &context, noop);
        let c3 = Event::new("c3", &context, noop);

        assert!(root.fire_event_child(&c1));
        assert!(root.fire_event_child(&c2));
        assert!(c2.fire_event_child(&c3));

        root.invalidate();
        for event in [&root, &c1, &c2, &c3] {
            assert!(!event.is_valid(), "{event} should be invalid");
        }
    }

    #[test]
    fn invalidating_a_child_leaves_the_parent_valid() {
        let context = Context::new("c");
        let root = Event::new("root", &context, noop);
        let child = Event::new("child", &context, noop);
        root.fire_event_child(&child);
        child.invalidate();
        assert!(root.is_valid());
    }

    #[test]
    fn fire_event_child_links_and_pushes() {
        let context = Context::new("c");
        let root = Event::new("root", &context, noop);
        let child = Event::new("child", &context, noop);

        assert!(root.fire_event_child(&child));
        assert!(child.parent().unwrap().ptr_eq(&root));
        assert_eq!(root.children().len(), 1);
        assert!(context.view_event_stack()[0].ptr_eq(&child));
    }

    #[test]
    fn shared_child_is_invalidated_once() {
        let log = Arc::new(CacheLog::new(50).unwrap());
        let context = Context::builder("c").with_logger(log.clone()).build();
        let a = Event::new("a", &context, noop);
        let b = Event::new("b", &context, noop);
        let shared = Event::new("shared", &context, noop);

        assert!(a.fire_event_child(&shared));
        assert!(b.fire_event_child(&shared));
        assert!(shared.parent().unwrap().ptr_eq(&b));
        assert_eq!(a.children().len(), 1);
        assert_eq!(b.children().len(), 1);

        b.invalidate();
        assert!(!shared.is_valid());
        a.invalidate();

        let invalidations = log
            .lines()
            .iter()
            .filter(|l| l.as_str() == "shared: invalidated")
            .count();
        assert_eq!(invalidations, 1);
    }

    #[test]
    fn refiring_under_the_same_parent_does_not_duplicate() {
        let context = Context::new("c");
        let root = Event::new("root", &context, noop);
        let child = Event::new("child", &context, noop);
        assert!(root.fire_event_child(&child));
        assert!(root.fire_event_child(&child));
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn cycles_invalidate_and_walk_finitely() {
        let context = Context::new("c");
        let root = Event::new("root", &context, noop);
        let child = Event::new("child", &context, noop);
        assert!(root.fire_event_child(&child));
        assert!(child.fire_event_child(&root));

        assert_eq!(root.ancestors().count(), 1);
        child.invalidate();
        assert!(!root.is_valid());
        assert!(!child.is_valid());
    }

    #[test]
    fn late_child_of_invalid_parent_stays_valid() {
        let context = Context::new("c");
        let root = Event::new("root", &context, noop);
        root.invalidate();
        let late = Event::new("late", &context, noop);
        assert!(root.fire_event_child(&late));
        assert!(late.is_valid());
    }

    #[test]
    fn strict_variant_refuses_cycles() {
        let context = Context::new("c");
        let root = Event::new("root", &context, noop);
        let child = Event::new("child", &context, noop);
        assert!(root.try_fire_event_child(&child));

        assert!(!root.try_fire_event_child(&root));
        assert!(!child.try_fire_event_child(&root));
        assert!(root.parent().is_none());
        assert!(child.children().is_empty());
    }

    #[test]
    fn strict_variant_refuses_a_second_parent() {
        let context = Context::new("c");
        let first = Event::new("first", &context, noop);
        let second = Event::new("second", &context, noop);
        let child = Event::new("child", &context, noop);

        assert!(first.try_fire_event_child(&child));
        assert!(!second.try_fire_event_child(&child));
        assert!(child.parent().unwrap().ptr_eq(&first));
        assert!(second.children().is_empty());
    }

    #[test]
    fn strict_variant_invalidates_late_children() {
        let context = Context::new("c");
        let root = Event::new("root", &context, noop);
        root.invalidate();
        let late = Event::new("late", &context, noop);
        assert!(root.try_fire_event_child(&late));
        assert!(!late.is_valid());
    }

    #[test]
    fn dropped_origin_refuses_children() {
        let orphan = {
            let context = Context::new("gone");
            Event::new("orphan", &context, noop)
        };
        let survivor = Context::new("here");
        let child = Event::new("child", &survivor, noop);
        assert!(orphan.origin().is_none());
        assert!(!orphan.fire_event_child(&child));
        assert!(child.parent().is_none());
    }

    #[test]
    fn read_then_patch_through_with_payload() {
        let context = Context::new("c");
        let event = Event::new("E", &context, noop);
        event.patch_payload("hp", 3);

        if let Some(hp) = event.with_payload(|p| p.get("hp").cloned()) {
            event.patch_payload("last_hp", hp);
        }
        if event.with_payload(|p| p.contains("hp")) {
            event.with_payload_mut(|p| p.patch("seen", true));
        }
        assert_eq!(event.payload().get("last_hp"), Some(&Value::from(3)));
        assert_eq!(event.payload().get("seen"), Some(&Value::from(true)));
    }

    #[test]
    fn stamps_delegate_to_payload() {
        let context = Context::new("c");
        let event = Event::new("E", &context, noop);
        let a = Property::named("A", |_: &Property, _: &Event, _: &Context| true);
        let b = Property::named("B", |_: &Property, _: &Event, _: &Context| true);

        event.stamp(&a);
        assert!(event.stamp_exists(&a));
        assert!(!event.stamp_exists(&b));
        event.unstamp(&a);
        assert!(!event.stamp_exists(&a));
    }

    #[test]
    fn mutations_are_logged() {
        let log = Arc::new(CacheLog::new(50).unwrap());
        let context = Context::builder("c").with_logger(log.clone()).build();
        let event = Event::new("E", &context, noop);
        let p = Property::named("Watcher", |_: &Property, _: &Event, _: &Context| true);

        event.patch_payload("flag", true);
        event.stamp(&p);
        event.unstamp(&p);

        let mut lines = log.lines();
        lines.reverse();
        assert_eq!(
            lines,
            vec![
                "E: added flag->true to payload",
                "Watcher: stamped E",
                "Watcher: unstamped E",
            ]
        );
    }

    #[test]
    fn short_names() {
        assert_eq!(short_type_name::<Explode>(), "Explode");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
    }
}
