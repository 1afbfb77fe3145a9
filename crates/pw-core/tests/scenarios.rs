use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use pw_core::{Context, Event, Interceptor, Property};
use pw_log::{CacheLog, LogTee};
use pw_script::{ScriptEnvironment, ScriptResult, Value};

/// Stamps each event once and counts how often it saw a fresh one.
struct StampOnce {
    fresh: Rc<Cell<u32>>,
}

impl Interceptor for StampOnce {
    fn on_event(&self, property: &Property, event: &Event, _: &Context) -> bool {
        if !event.stamp_exists(property) {
            event.stamp(property);
            self.fresh.set(self.fresh.get() + 1);
        }
        true
    }
}

fn noop(_: &Event) -> ScriptResult<()> {
    Ok(())
}

#[test]
fn annotating_property_feeds_the_effect() {
    let context = Context::new("c");
    let observed = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&observed);
    let event = Event::new("E", &context, move |e: &Event| {
        *sink.borrow_mut() = e.payload().get("flag").cloned();
        Ok(())
    });
    context.subscribe(&Property::named("Flagger", |_: &Property, e: &Event, _: &Context| {
        e.patch_payload("flag", true);
        true
    }));

    context.fire_event(event);
    context.pump().unwrap();
    assert_eq!(*observed.borrow(), Some(Value::from(true)));
}

#[test]
fn short_circuit_hides_the_event_from_later_properties() {
    let context = Context::new("c");
    let second_calls = Rc::new(Cell::new(0));
    let counted = Rc::clone(&second_calls);
    context.subscribe(&Property::named("First", |_: &Property, _: &Event, _: &Context| false));
    context.subscribe(&Property::named("Second", move |_: &Property, _: &Event, _: &Context| {
        counted.set(counted.get() + 1);
        true
    }));

    context.fire_event(Event::new("E", &context, noop));
    context.pump().unwrap();
    assert_eq!(second_calls.get(), 0);
}

#[test]
fn stamping_makes_a_property_idempotent_across_refires() {
    let context = Context::new("c");
    let fresh = Rc::new(Cell::new(0));
    context.subscribe(&Property::new(StampOnce {
        fresh: Rc::clone(&fresh),
    }));

    let event = Event::new("Repeat", &context, noop);
    for _ in 0..3 {
        context.fire_event(event.clone());
        context.pump().unwrap();
    }
    assert_eq!(fresh.get(), 1);
}

#[test]
fn heartbeat_keeps_the_stack_alive() {
    fn heartbeat(context: &Context, beats: Rc<Cell<u32>>) -> Event {
        Event::new("Heartbeat", context, move |e: &Event| {
            beats.set(beats.get() + 1);
            if let Some(origin) = e.origin() {
                origin.fire_event(heartbeat(&origin, Rc::clone(&beats)));
            }
            Ok(())
        })
    }

    let context = Context::new("Loop");
    let beats = Rc::new(Cell::new(0));
    context.fire_event(heartbeat(&context, Rc::clone(&beats)));
    for _ in 0..25 {
        context.pump().unwrap();
    }
    assert_eq!(beats.get(), 25);
    assert_eq!(context.pending(), 1);
}

#[test]
fn invalidating_a_parent_skips_queued_children() {
    let context = Context::new("c");
    let ran = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&ran);
    let child = Event::new("child", &context, move |_: &Event| {
        log.borrow_mut().push("child");
        Ok(())
    });
    let root = Event::new("root", &context, noop);
    assert!(root.fire_event_child(&child));

    // The child sits on the stack; vetoing the root must reach it.
    root.invalidate();
    context.pump().unwrap();
    assert!(ran.borrow().is_empty());
}

#[test]
fn diagnostics_reach_both_halves_of_a_tee() {
    let a = Arc::new(CacheLog::new(20).unwrap());
    let b = Arc::new(CacheLog::new(20).unwrap());
    let context = Context::builder("Teed")
        .with_logger(Arc::new(LogTee::new(a.clone(), b.clone())))
        .build();

    let event = Event::new("E", &context, noop);
    event.patch_payload("hp", 10);
    event.invalidate();

    assert_eq!(a.lines(), b.lines());
    assert_eq!(a.lines().len(), 2);
}

#[test]
fn environment_bindings_are_visible_to_properties() {
    let context = Context::new("Scripted");
    let mut environment = ScriptEnvironment::new()
        .with_bindings(vec![("gravity".to_string(), Value::from(10))])
        .with_on_link("let terminal = gravity * 5;");
    environment.link(&context.scripts()).unwrap();

    let property = Property::named("Physics", |_: &Property, _: &Event, _: &Context| true);
    property.change_context(&context);
    assert_eq!(property.eval("terminal").unwrap(), Some(Value::from(50)));

    environment.unlink(&context.scripts()).unwrap();
    assert_eq!(context.access("gravity").unwrap(), None);
}
