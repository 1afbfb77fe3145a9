use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use pw_script::Value;

use crate::context::{Context, WeakContext};
use crate::error::{EngineError, EngineResult};
use crate::event::{Event, short_type_name};
use crate::id::PropertyId;

/// The callback a property runs for each event its context pumps.
///
/// Return `true` to let the event continue to the next property, `false`
/// to stop the chain for this pump. Stopping the chain does not invalidate
/// the event; call [`Event::invalidate`] to veto its effect.
pub trait Interceptor {
    /// Inspect, annotate, or veto `event` as it is dispatched by `published_by`.
    fn on_event(&self, property: &Property, event: &Event, published_by: &Context) -> bool;
}

impl<F> Interceptor for F
where
    F: Fn(&Property, &Event, &Context) -> bool,
{
    fn on_event(&self, property: &Property, event: &Event, published_by: &Context) -> bool {
        self(property, event, published_by)
    }
}

struct PropertyInner {
    id: PropertyId,
    name: String,
    context: RefCell<WeakContext>,
    draw_id: Cell<Option<i64>>,
    interceptor: Box<dyn Interceptor>,
}

/// A subscriber that sees every event its context pumps.
///
/// A property belongs to at most one context. Subscribing it elsewhere
/// moves it.
#[derive(Clone)]
pub struct Property(Rc<PropertyInner>);

impl Property {
    /// A property named after the interceptor's type.
    pub fn new<I: Interceptor + 'static>(interceptor: I) -> Self {
        Self::named(short_type_name::<I>(), interceptor)
    }

    /// A property with an explicit name.
    pub fn named(name: impl Into<String>, interceptor: impl Interceptor + 'static) -> Self {
        Self(Rc::new(PropertyInner {
            id: PropertyId::new(),
            name: name.into(),
            context: RefCell::new(WeakContext::default()),
            draw_id: Cell::new(None),
            interceptor: Box::new(interceptor),
        }))
    }

    pub fn id(&self) -> PropertyId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Run the interceptor.
    pub fn on_event(&self, event: &Event, published_by: &Context) -> bool {
        self.0.interceptor.on_event(self, event, published_by)
    }

    /// The context this property is subscribed to.
    pub fn context(&self) -> Option<Context> {
        self.0.context.borrow().upgrade()
    }

    /// Unsubscribe from the current context, if any, and subscribe to `context`.
    pub fn change_context(&self, context: &Context) {
        context.subscribe(self);
    }

    /// Unsubscribe from the current context, if any.
    pub fn detach(&self) {
        if let Some(context) = self.context() {
            context.unsubscribe(self);
        }
    }

    /// Evaluate a script in the owning context's container.
    pub fn eval<'a>(&self, script: impl Into<Option<&'a str>>) -> EngineResult<Option<Value>> {
        let context = self
            .context()
            .ok_or_else(|| EngineError::Unattached(self.0.name.clone()))?;
        Ok(context.eval(script)?)
    }

    /// Ordering hint for renderers. The engine ignores it.
    pub fn draw_id(&self) -> Option<i64> {
        self.0.draw_id.get()
    }

    pub fn set_draw_id(&self, id: i64) {
        self.0.draw_id.set(Some(id));
    }

    pub fn clear_draw_id(&self) {
        self.0.draw_id.set(None);
    }

    /// Return `true` if both handles refer to the same property.
    pub fn ptr_eq(&self, other: &Property) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn set_context(&self, context: WeakContext) {
        *self.0.context.borrow_mut() = context;
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("draw_id", &self.0.draw_id.get())
            .finish_non_exhaustive()
    }
}
