use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use pw_io::FileHandle;
use pw_log::Logger;
use pw_script::{
    RhaiContainer, ScriptConfig, ScriptContainer, ScriptError, ScriptResult, SharedContainer,
    Value, shared,
};

use crate::event::Event;
use crate::id::GameObjectId;
use crate::model::GameObject;
use crate::property::Property;

struct ContextInner {
    name: String,
    stack: RefCell<Vec<Event>>,
    subscribers: RefCell<Vec<Property>>,
    roster: RefCell<Vec<Rc<dyn GameObject>>>,
    scripts: SharedContainer,
    logger: Logger,
}

/// The environment events are fired into and pumped from.
///
/// A context owns a LIFO stack of events and an ordered list of subscribed
/// properties. Each [`pump`](Self::pump) pops one event, runs it past every
/// property in subscription order, and then runs its effect if it is still
/// valid. Effects and interceptors may fire and pump re-entrantly: no
/// internal borrow is held while user code runs.
#[derive(Clone)]
pub struct Context(Rc<ContextInner>);

/// A non-owning reference to a [`Context`].
#[derive(Clone, Default)]
pub struct WeakContext(Weak<ContextInner>);

impl WeakContext {
    /// The context, if it still exists.
    pub fn upgrade(&self) -> Option<Context> {
        self.0.upgrade().map(Context)
    }
}

impl Context {
    /// A context with a null logger and a default Rhai container.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Start building a context.
    pub fn builder(name: impl Into<String>) -> ContextBuilder {
        ContextBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn logger(&self) -> &Logger {
        &self.0.logger
    }

    /// The attached script container, for linking environments.
    pub fn scripts(&self) -> SharedContainer {
        Rc::clone(&self.0.scripts)
    }

    pub fn downgrade(&self) -> WeakContext {
        WeakContext(Rc::downgrade(&self.0))
    }

    /// Return `true` if both handles refer to the same context.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Push `event` onto the stack. It will be the next event pumped.
    pub fn fire_event(&self, event: Event) {
        tracing::trace!(context = %self.0.name, event = %event.name(), "fired");
        self.0.stack.borrow_mut().push(event);
    }

    /// Process the top event, if there is one.
    ///
    /// The interceptor chain runs over the subscribers as they were when the
    /// event was popped. A failing effect is returned as is; the event is
    /// not put back.
    pub fn pump(&self) -> ScriptResult<()> {
        let Some(event) = self.0.stack.borrow_mut().pop() else {
            return Ok(());
        };
        event.set_target(self);
        tracing::trace!(context = %self.0.name, event = %event.name(), "pumping");

        let chain = self.0.subscribers.borrow().clone();
        for property in &chain {
            if !property.on_event(&event, self) {
                break;
            }
        }

        if event.is_valid() {
            event.eval_event()?;
        } else {
            tracing::trace!(context = %self.0.name, event = %event.name(), "skipped invalid event");
        }
        Ok(())
    }

    /// The stack, top first.
    pub fn view_event_stack(&self) -> Vec<Event> {
        self.0.stack.borrow().iter().rev().cloned().collect()
    }

    /// Number of events waiting.
    pub fn pending(&self) -> usize {
        self.0.stack.borrow().len()
    }

    /// Subscribe `property`, moving it from any other context.
    /// Subscribing a property twice does nothing.
    pub fn subscribe(&self, property: &Property) {
        if self.is_subscribed(property) {
            return;
        }
        if let Some(previous) = property.context() {
            previous.remove_subscriber(property);
        }
        self.0.subscribers.borrow_mut().push(property.clone());
        property.set_context(self.downgrade());
    }

    /// Unsubscribe `property`. Unsubscribing a stranger does nothing.
    pub fn unsubscribe(&self, property: &Property) {
        if self.remove_subscriber(property) {
            property.set_context(WeakContext::default());
        }
    }

    /// Return `true` if `property` is subscribed here.
    pub fn is_subscribed(&self, property: &Property) -> bool {
        self.0
            .subscribers
            .borrow()
            .iter()
            .any(|p| p.ptr_eq(property))
    }

    /// A copy of the subscriber list in subscription order.
    pub fn subscribers(&self) -> Vec<Property> {
        self.0.subscribers.borrow().clone()
    }

    fn remove_subscriber(&self, property: &Property) -> bool {
        let mut subscribers = self.0.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|p| !p.ptr_eq(property));
        subscribers.len() != before
    }

    /// Add `object` to the roster. Adding an object twice does nothing.
    pub fn add_game_object(&self, object: Rc<dyn GameObject>) {
        let mut roster = self.0.roster.borrow_mut();
        if !roster.iter().any(|o| o.id() == object.id()) {
            roster.push(object);
        }
    }

    /// Remove the object with `id` from the roster and return it.
    pub fn remove_game_object(&self, id: GameObjectId) -> Option<Rc<dyn GameObject>> {
        let mut roster = self.0.roster.borrow_mut();
        let index = roster.iter().position(|o| o.id() == id)?;
        Some(roster.remove(index))
    }

    /// A copy of the roster.
    pub fn game_objects(&self) -> Vec<Rc<dyn GameObject>> {
        self.0.roster.borrow().clone()
    }

    /// Evaluate a script. `None` fails with [`ScriptError::InvalidScript`].
    pub fn eval<'a>(&self, script: impl Into<Option<&'a str>>) -> ScriptResult<Option<Value>> {
        self.scripts_mut()?.eval(script.into())
    }

    /// Evaluate the contents of a file.
    pub fn eval_file(&self, file: &FileHandle) -> ScriptResult<Option<Value>> {
        self.scripts_mut()?.eval_file(file)
    }

    /// Bind `value` under `name` in the script container.
    pub fn inject_object(&self, name: &str, value: impl Into<Value>) -> ScriptResult<()> {
        self.scripts_mut()?.inject_object(name, value.into())
    }

    /// Remove the binding `name` from the script container.
    pub fn remove_object(&self, name: &str) -> ScriptResult<()> {
        self.scripts_mut()?.remove_object(name)
    }

    /// Read the binding `name` from the script container.
    pub fn access(&self, name: &str) -> ScriptResult<Option<Value>> {
        self.0
            .scripts
            .try_borrow()
            .map_err(|_| ScriptError::Busy)?
            .access(name)
    }

    fn scripts_mut(&self) -> ScriptResult<RefMut<'_, dyn ScriptContainer + 'static>> {
        self.0.scripts.try_borrow_mut().map_err(|_| ScriptError::Busy)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .0
            .subscribers
            .borrow()
            .iter()
            .map(|p| p.to_string())
            .collect();
        write!(f, "[{} Context][{}]", self.0.name, names.join(", "))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.0.name)
            .field("pending", &self.0.stack.borrow().len())
            .field("subscribers", &self.0.subscribers.borrow().len())
            .field("game_objects", &self.0.roster.borrow().len())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for WeakContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(context) => write!(f, "WeakContext({})", context.name()),
            None => write!(f, "WeakContext(<dropped>)"),
        }
    }
}

/// Builder for [`Context`].
pub struct ContextBuilder {
    name: String,
    logger: Option<Logger>,
    scripts: Option<SharedContainer>,
    script_config: ScriptConfig,
}

impl ContextBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logger: None,
            scripts: None,
            script_config: ScriptConfig::default(),
        }
    }

    /// Send diagnostics to `logger` instead of discarding them.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Use an existing container instead of creating a Rhai one.
    pub fn with_scripts(mut self, scripts: SharedContainer) -> Self {
        self.scripts = Some(scripts);
        self
    }

    /// Limits for the default Rhai container. Ignored with `with_scripts`.
    pub fn with_script_config(mut self, config: ScriptConfig) -> Self {
        self.script_config = config;
        self
    }

    pub fn build(self) -> Context {
        let scripts = match self.scripts {
            Some(scripts) => scripts,
            None => shared(RhaiContainer::with_config(&self.script_config)),
        };
        tracing::debug!(context = %self.name, "created context");
        Context(Rc::new(ContextInner {
            name: self.name,
            stack: RefCell::new(Vec::new()),
            subscribers: RefCell::new(Vec::new()),
            roster: RefCell::new(Vec::new()),
            scripts,
            logger: self.logger.unwrap_or_else(pw_log::null_logger),
        }))
    }
}
