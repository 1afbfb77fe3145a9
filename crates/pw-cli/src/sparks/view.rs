use pw_core::Context;

use super::ball::Ball;

const RULE: &str = "~~~~~~~~~~";

/// Renders every [`Ball`] in a context's roster as an ASCII brightness map.
#[derive(Debug, Clone, Copy)]
pub struct AsciiView {
    width: usize,
    height: usize,
}

impl AsciiView {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Summed ball gradients, indexed `[y][x]`.
    pub fn gradient_grid(&self, context: &Context) -> Vec<Vec<f32>> {
        let mut grid = vec![vec![0.0_f32; self.width]; self.height];
        for object in context.game_objects() {
            let Some(ball) = object.as_any().downcast_ref::<Ball>() else {
                continue;
            };
            for (y, row) in grid.iter_mut().enumerate() {
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell += ball.gradient(x as f32, y as f32);
                }
            }
        }
        grid
    }

    /// One frame: a rule line followed by one bordered line per row.
    pub fn render(&self, context: &Context) -> String {
        let mut lines = Vec::with_capacity(self.height + 1);
        lines.push(RULE.to_string());
        for row in self.gradient_grid(context) {
            let cells: String = row.into_iter().map(shade).collect();
            lines.push(format!("~ {cells} ~"));
        }
        lines.join("\n")
    }
}

/// Map a brightness to a glyph. Anything at 0.8 or above is solid.
pub fn shade(value: f32) -> char {
    match (value * 10.0) as i32 {
        2 | 3 => '.',
        4 | 5 => '+',
        6 | 7 => '=',
        n if n >= 8 => '#',
        _ => ' ',
    }
}
