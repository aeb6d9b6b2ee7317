// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Moving entities.
//!
//! Bounce a handful of boxes around a square arena and print the colliding
//! pairs each step, along with how many leaves actually had to be rebuilt.
//!
//! Run:
//! - `RUST_LOG=understory_dbvh=debug cargo run -p understory_dbvh_demos --example dbvh_moving_entities`

use kurbo::{Rect, Vec2};
use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_dbvh::{Tree, TreeConfig};

const ARENA: f64 = 100.0;
const SIZE: f64 = 8.0;
const STEPS: usize = 40;

struct Body {
    pos: Vec2,
    vel: Vec2,
}

impl Body {
    fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.pos.x + SIZE, self.pos.y + SIZE)
    }

    fn step(&mut self) {
        self.pos += self.vel;
        if self.pos.x < 0.0 || self.pos.x + SIZE > ARENA {
            self.vel.x = -self.vel.x;
            self.pos.x = self.pos.x.clamp(0.0, ARENA - SIZE);
        }
        if self.pos.y < 0.0 || self.pos.y + SIZE > ARENA {
            self.vel.y = -self.vel.y;
            self.pos.y = self.pos.y.clamp(0.0, ARENA - SIZE);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut bodies: Vec<Body> = (0..12_u32)
        .map(|i| {
            let f = f64::from(i);
            Body {
                pos: Vec2::new((f * 23.0) % (ARENA - SIZE), (f * 41.0) % (ARENA - SIZE)),
                vel: Vec2::new(1.5 - (f * 0.7) % 3.0, (f * 0.9) % 3.0 - 1.5),
            }
        })
        .collect();

    let config = TreeConfig::default().with_initial_capacity(2 * bodies.len());
    let mut tree: Tree<u32> = Tree::with_config(config).unwrap();
    for (i, b) in bodies.iter().enumerate() {
        tree.insert(i as u32, b.rect()).unwrap();
    }

    for step in 0..STEPS {
        let mut rebuilt = 0;
        for (i, b) in bodies.iter_mut().enumerate() {
            b.step();
            if tree.update(&(i as u32), b.rect(), b.vel).unwrap() {
                rebuilt += 1;
            }
        }
        let pairs = tree.collision_pairs();
        info!(step, rebuilt, area = tree.total_area(), depth = tree.depth(), "stepped");
        if !pairs.is_empty() {
            println!("step {step:>2}: {pairs:?}");
        }
    }
    tree.check_invariants().unwrap();
}
