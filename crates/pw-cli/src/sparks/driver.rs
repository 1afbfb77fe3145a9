use std::cell::Cell;
use std::rc::Rc;

use pw_core::model::{GameObject, relocate};
use pw_core::{Context, Event};
use pw_log::Logger;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::ball::Ball;
use super::bounce::BounceProperty;
use super::config::{MIN_SIDE, SparksConfig};
use super::error::{SparksError, SparksResult};
use super::events::{Heartbeat, Screen};
use super::view::AsciiView;

/// Counters for a Sparks run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SparksStats {
    /// Frames handed out by [`Sparks::next_frame`].
    pub frames: u64,
    /// Events pumped.
    pub pumps: u64,
    /// Moves turned back at an edge.
    pub bounces: u64,
}

/// A running Sparks arena.
pub struct Sparks {
    config: SparksConfig,
    context: Context,
    screen: Rc<Screen>,
    bounces: Rc<Cell<u64>>,
    frames: u64,
    pumps: u64,
}

impl Sparks {
    /// Spawn `config.balls` random balls from `config.seed`.
    pub fn new(config: SparksConfig, logger: Logger) -> SparksResult<Self> {
        check_arena(&config)?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let balls: Vec<Ball> = (0..config.balls)
            .map(|_| Ball::random(config.width, config.height, &mut rng))
            .collect();
        Self::with_balls(config, logger, balls)
    }

    /// Start with the given balls instead of random ones.
    pub fn with_balls(
        config: SparksConfig,
        logger: Logger,
        balls: impl IntoIterator<Item = Ball>,
    ) -> SparksResult<Self> {
        check_arena(&config)?;
        let context = Context::builder("Sparks").with_logger(logger).build();
        for ball in balls {
            let ball: Rc<dyn GameObject> = Rc::new(ball);
            relocate(&ball, &context);
        }

        let bounces = Rc::new(Cell::new(0));
        let bounce = BounceProperty::new(config.width, config.height)
            .with_counter(Rc::clone(&bounces));
        context.subscribe(&bounce.into_property());

        let screen = Rc::new(Screen::new(AsciiView::new(config.width, config.height)));
        context.fire_event(Heartbeat::event(&context, Rc::clone(&screen)));
        tracing::debug!(
            width = config.width,
            height = config.height,
            balls = context.game_objects().len(),
            "sparks arena ready"
        );

        Ok(Self {
            config,
            context,
            screen,
            bounces,
            frames: 0,
            pumps: 0,
        })
    }

    pub fn config(&self) -> &SparksConfig {
        &self.config
    }

    /// The arena's context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Every ball in the arena.
    pub fn balls(&self) -> Vec<Rc<dyn GameObject>> {
        self.context
            .game_objects()
            .into_iter()
            .filter(|o| o.as_any().is::<Ball>())
            .collect()
    }

    /// Pump until the next frame is rendered and return it.
    pub fn next_frame(&mut self) -> SparksResult<String> {
        loop {
            let ready = self.screen.frames.borrow_mut().pop_front();
            if let Some(frame) = ready {
                self.frames += 1;
                return Ok(frame);
            }
            if self.context.pending() == 0 {
                return Err(SparksError::Stalled);
            }
            self.context.pump()?;
            self.pumps += 1;
        }
    }

    pub fn stats(&self) -> SparksStats {
        SparksStats {
            frames: self.frames,
            pumps: self.pumps,
            bounces: self.bounces.get(),
        }
    }

    /// Fire an extra event into the arena.
    pub fn fire_event(&self, event: Event) {
        self.context.fire_event(event);
    }
}

fn check_arena(config: &SparksConfig) -> SparksResult<()> {
    if config.width < MIN_SIDE || config.height < MIN_SIDE {
        return Err(SparksError::ArenaTooSmall {
            width: config.width,
            height: config.height,
        });
    }
    Ok(())
}
