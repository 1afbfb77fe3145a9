use std::any::Any;
use std::cell::Cell;
use std::fmt;

use pw_core::GameObjectId;
use pw_core::model::{GameObject, Membership};
use rand::Rng;
use rand::rngs::StdRng;

/// A ball with a position, a velocity, and a fixed radius.
///
/// State lives in cells so events holding a shared handle can move it.
#[derive(Debug)]
pub struct Ball {
    id: GameObjectId,
    membership: Membership,
    x: Cell<f32>,
    y: Cell<f32>,
    vx: Cell<f32>,
    vy: Cell<f32>,
    radius: f32,
}

impl Ball {
    /// A ball at a fixed position and velocity.
    pub fn new(x: f32, y: f32, radius: f32, vx: f32, vy: f32) -> Self {
        Self {
            id: GameObjectId::new(),
            membership: Membership::default(),
            x: Cell::new(x),
            y: Cell::new(y),
            vx: Cell::new(vx),
            vy: Cell::new(vy),
            radius,
        }
    }

    /// A ball placed fully inside a `width` x `height` arena.
    ///
    /// Radius is 3 to 6 cells. Each velocity component lies in `[-0.5, 0.5)`.
    pub fn random(width: usize, height: usize, rng: &mut StdRng) -> Self {
        let radius = rng.random_range(3..=6) as f32;
        let x = Self::random_axis(width, radius, rng);
        let y = Self::random_axis(height, radius, rng);
        let vx = rng.random::<f32>() - 0.5;
        let vy = rng.random::<f32>() - 0.5;
        Self::new(x, y, radius, vx, vy)
    }

    fn random_axis(side: usize, radius: f32, rng: &mut StdRng) -> f32 {
        let lo = radius + 1.0;
        let hi = (side as f32 - radius - 1.0).max(lo + 1.0);
        rng.random_range(lo..hi).floor()
    }

    /// Position in arena coordinates.
    pub fn position(&self) -> (f32, f32) {
        (self.x.get(), self.y.get())
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.vx.get(), self.vy.get())
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Advance one step along the velocity.
    pub fn go(&self) {
        self.x.set(self.x.get() + self.vx.get());
        self.y.set(self.y.get() + self.vy.get());
    }

    /// Reverse every velocity component that points out of the arena.
    pub fn bounce(&self, width: usize, height: usize) {
        let (out_x, out_y) = self.heading_out(width, height);
        if out_x {
            self.vx.set(-self.vx.get());
        }
        if out_y {
            self.vy.set(-self.vy.get());
        }
    }

    /// Return `true` if the ball touches an edge and is moving towards it.
    pub fn leaving(&self, width: usize, height: usize) -> bool {
        let (out_x, out_y) = self.heading_out(width, height);
        out_x || out_y
    }

    fn heading_out(&self, width: usize, height: usize) -> (bool, bool) {
        let axis = |pos: f32, vel: f32, side: usize| {
            (pos <= self.radius && vel < 0.0) || (side as f32 - pos <= self.radius && vel > 0.0)
        };
        (
            axis(self.x.get(), self.vx.get(), width),
            axis(self.y.get(), self.vy.get(), height),
        )
    }

    /// Brightness at a cell: 1 at the centre, falling to 0 at the rim.
    pub fn gradient(&self, x: f32, y: f32) -> f32 {
        let dist = self.distance(x, y);
        if dist > self.radius {
            0.0
        } else {
            1.0 - dist / self.radius
        }
    }

    /// Euclidean distance from the centre.
    pub fn distance(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.x.get();
        let dy = y - self.y.get();
        (dx * dx + dy * dy).sqrt()
    }
}

impl GameObject for Ball {
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

impl fmt::Display for Ball {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p({},{})", self.x.get() as i32, self.y.get() as i32)
    }
}
