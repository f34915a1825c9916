//! Seeded force-directed layout
//!
//! Fruchterman-Reingold in the unit square starting from seeded random
//! positions, then rescaled into `[-1, 1]²` around the origin. The seed is
//! fixed, so the same graph always lands on the same coordinates.

use crate::error::ChainError;
use crate::graph::ChainGraph;
use petgraph::graph::NodeIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed used when none is configured
pub const DEFAULT_LAYOUT_SEED: u64 = 42;

/// Iterations used when none are configured
pub const DEFAULT_LAYOUT_ITERATIONS: usize = 50;

/// Upper bound accepted from configuration
pub const MAX_LAYOUT_ITERATIONS: usize = 10_000;

/// Minimum distance used in force computations, avoids division by zero
const MIN_DISTANCE: f64 = 0.01;

/// Spring layout parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpringLayout {
    /// Seed for the initial positions
    pub seed: u64,
    /// Number of cooling iterations
    pub iterations: usize,
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self {
            seed: DEFAULT_LAYOUT_SEED,
            iterations: DEFAULT_LAYOUT_ITERATIONS,
        }
    }
}

/// Node coordinates, indexed by node
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    positions: Vec<[f64; 2]>,
}

impl Layout {
    /// Position of a node
    #[must_use]
    pub fn position(&self, idx: NodeIndex) -> Option<[f64; 2]> {
        self.positions.get(idx.index()).copied()
    }

    /// All positions in node order
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[[f64; 2]] {
        &self.positions
    }

    /// Number of positioned nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when nothing was positioned
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl SpringLayout {
    /// Create a layout with an explicit seed
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Position every node of `graph`
    ///
    /// # Errors
    /// [`ChainError::EmptyGraph`] for a graph with no nodes,
    /// [`ChainError::DegenerateLayout`] if a coordinate ends up non-finite.
    pub fn compute(&self, graph: &ChainGraph) -> Result<Layout, ChainError> {
        let n = graph.node_count();
        if n == 0 {
            return Err(ChainError::EmptyGraph);
        }
        if n == 1 {
            return Ok(Layout {
                positions: vec![[0.0, 0.0]],
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pos: Vec<[f64; 2]> = (0..n)
            .map(|_| [rng.random::<f64>(), rng.random::<f64>()])
            .collect();

        // Self-loops pull a node towards itself; they carry no force.
        let springs: Vec<(usize, usize)> = graph
            .edge_endpoints()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.index(), b.index()))
            .collect();

        let k = (1.0 / n as f64).sqrt();
        let k_sq = k * k;
        let mut temperature = 0.1 * extent(&pos).max(MIN_DISTANCE);
        let cooling = temperature / (self.iterations as f64 + 1.0);

        for _ in 0..self.iterations {
            let mut disp = vec![[0.0f64; 2]; n];

            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = pos[i][0] - pos[j][0];
                    let dy = pos[i][1] - pos[j][1];
                    let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                    let force = k_sq / dist;
                    let fx = dx / dist * force;
                    let fy = dy / dist * force;
                    disp[i][0] += fx;
                    disp[i][1] += fy;
                    disp[j][0] -= fx;
                    disp[j][1] -= fy;
                }
            }

            for &(a, b) in &springs {
                let dx = pos[a][0] - pos[b][0];
                let dy = pos[a][1] - pos[b][1];
                let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = dist * dist / k;
                let fx = dx / dist * force;
                let fy = dy / dist * force;
                disp[a][0] -= fx;
                disp[a][1] -= fy;
                disp[b][0] += fx;
                disp[b][1] += fy;
            }

            for (p, d) in pos.iter_mut().zip(&disp) {
                let len = (d[0] * d[0] + d[1] * d[1]).sqrt().max(MIN_DISTANCE);
                let scale = temperature.min(len) / len;
                p[0] += d[0] * scale;
                p[1] += d[1] * scale;
            }

            temperature -= cooling;
        }

        rescale(&mut pos);

        for (idx, p) in pos.iter().enumerate() {
            if !p[0].is_finite() || !p[1].is_finite() {
                let name = graph
                    .node(NodeIndex::new(idx))
                    .map(|node| node.name().to_string())
                    .unwrap_or_default();
                return Err(ChainError::DegenerateLayout(name));
            }
        }

        Ok(Layout { positions: pos })
    }
}

/// Largest side of the bounding box
fn extent(pos: &[[f64; 2]]) -> f64 {
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for p in pos {
        for axis in 0..2 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    (max[0] - min[0]).max(max[1] - min[1])
}

/// Centre on the origin and scale the largest coordinate to 1
fn rescale(pos: &mut [[f64; 2]]) {
    let n = pos.len() as f64;
    let mean = pos
        .iter()
        .fold([0.0, 0.0], |acc, p| [acc[0] + p[0] / n, acc[1] + p[1] / n]);

    let mut lim: f64 = 0.0;
    for p in pos.iter_mut() {
        p[0] -= mean[0];
        p[1] -= mean[1];
        lim = lim.max(p[0].abs()).max(p[1].abs());
    }

    if lim > 0.0 {
        for p in pos.iter_mut() {
            p[0] /= lim;
            p[1] /= lim;
        }
    }
}
