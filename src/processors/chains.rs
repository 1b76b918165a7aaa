//! Chaining of character candidates into text lines.
//!
//! Similar, nearby components are paired. Pairs sharing a component and pointing
//! the same way are merged repeatedly until no merge applies. Only chains with
//! enough distinct members are reported.

use crate::core::config::{ChainConfig, LogCategories};
use crate::processors::component_filter::ComponentSet;
use crate::processors::geometry::{Point, angle_between, ratio_within};
use image::RgbImage;
use tracing::debug;

/// A run of components, identified by their indices in a [`ComponentSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// First endpoint.
    pub p: usize,
    /// Second endpoint.
    pub q: usize,
    /// Member indices. May contain duplicates until [`ChainBuilder::build`] finishes.
    pub members: Vec<usize>,
    /// Squared distance between the endpoint centers.
    pub dist: f32,
    /// Unit vector `center[p] - center[q]`.
    pub direction: Point,
}

impl Chain {
    fn between(p: usize, q: usize, centers: &[Point]) -> Option<Self> {
        let delta = centers[p] - centers[q];
        Some(Self {
            p,
            q,
            members: vec![p, q],
            dist: delta.length_squared(),
            direction: delta.normalized()?,
        })
    }

    /// Recomputes distance and direction after an endpoint changed.
    fn refresh(&mut self, centers: &[Point]) {
        let delta = centers[self.p] - centers[self.q];
        self.dist = delta.length_squared();
        if let Some(direction) = delta.normalized() {
            self.direction = direction;
        }
    }
}

/// Endpoint update produced by a successful merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    NewP(usize),
    NewQ(usize),
}

/// Counters from a [`ChainBuilder::build`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainReport {
    /// Component pairs that passed every pairing test.
    pub eligible_pairs: usize,
    /// Merge passes executed, including the final pass without merges.
    pub passes: usize,
    /// Total merges.
    pub merges: usize,
    /// Chains dropped for having too few distinct members.
    pub short_chains: usize,
}

/// Mean RGB color of every component.
pub fn component_colors(components: &ComponentSet, image: &RgbImage) -> Vec<[f32; 3]> {
    components
        .iter()
        .map(|c| {
            let mut sum = [0.0f32; 3];
            let mut count = 0usize;
            for p in &c.pixels {
                if let Some(pixel) = image.get_pixel_checked(p.x, p.y) {
                    for (s, v) in sum.iter_mut().zip(pixel.0) {
                        *s += v as f32;
                    }
                    count += 1;
                }
            }
            if count > 0 {
                sum.map(|s| s / count as f32)
            } else {
                sum
            }
        })
        .collect()
}

fn color_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Builds chains from a filtered component set.
#[derive(Debug, Clone)]
pub struct ChainBuilder<'a> {
    config: &'a ChainConfig,
    log: LogCategories,
}

impl<'a> ChainBuilder<'a> {
    pub fn new(config: &'a ChainConfig) -> Self {
        Self {
            config,
            log: LogCategories::none(),
        }
    }

    pub fn with_log(mut self, log: LogCategories) -> Self {
        self.log = log;
        self
    }

    /// Pairs, merges and filters chains.
    ///
    /// # Arguments
    ///
    /// * `components` - Filtered components.
    /// * `colors` - Mean color per component, index-aligned with `components`.
    ///
    /// # Returns
    ///
    /// Chains with at least `min_members` distinct members, largest first, and run counters.
    pub fn build(&self, components: &ComponentSet, colors: &[[f32; 3]]) -> (Vec<Chain>, ChainReport) {
        let mut report = ChainReport::default();
        let chains = self.pair(components, colors);
        report.eligible_pairs = chains.len();

        let centers = components.centers();
        let (merged, passes, merges) = self.merge(chains, &centers);
        report.passes = passes;
        report.merges = merges;

        let mut kept = Vec::with_capacity(merged.len());
        for mut chain in merged {
            chain.members.sort_unstable();
            chain.members.dedup();
            if chain.members.len() >= self.config.min_members {
                kept.push(chain);
            } else {
                report.short_chains += 1;
            }
        }

        debug!(
            pairs = report.eligible_pairs,
            passes = report.passes,
            merges = report.merges,
            chains = kept.len(),
            "chaining finished"
        );
        (kept, report)
    }

    /// Every pair `i < j` passing the similarity and distance tests, sorted by
    /// ascending squared distance.
    pub fn pair(&self, components: &ComponentSet, colors: &[[f32; 3]]) -> Vec<Chain> {
        let centers = components.centers();
        let mut chains = Vec::new();

        for i in 0..components.len() {
            let a = &components[i];
            for j in i + 1..components.len() {
                let b = &components[j];

                let color_dist = match (colors.get(i), colors.get(j)) {
                    (Some(&ca), Some(&cb)) => color_distance(ca, cb),
                    _ => 0.0,
                };
                if let Some(limit) = self.config.max_color_distance
                    && color_dist > limit
                {
                    continue;
                }

                if !ratio_within(a.median / b.median, self.config.max_median_ratio)
                    || !ratio_within(
                        a.height() as f32 / b.height() as f32,
                        self.config.max_dimension_ratio,
                    )
                    || !ratio_within(
                        a.width() as f32 / b.width() as f32,
                        self.config.max_dimension_ratio,
                    )
                {
                    continue;
                }

                let dist = (centers[i] - centers[j]).length_squared();
                let size = a.width().min(a.height()).max(b.width().min(b.height())) as f32;
                let size_sq = size * size;
                if dist / size_sq >= self.config.max_distance_ratio {
                    continue;
                }

                // Coincident centers give no direction.
                let Some(chain) = Chain::between(i, j, &centers) else {
                    continue;
                };
                if self.log.chains {
                    debug!(i, j, dist, size_sq, color_dist, "components paired");
                }
                chains.push(chain);
            }
        }

        chains.sort_by(|a, b| a.dist.total_cmp(&b.dist));
        chains
    }

    /// Merges chains until a pass makes no merge.
    ///
    /// Returns the surviving chains (largest first), the number of passes and
    /// the number of merges.
    pub fn merge(&self, chains: Vec<Chain>, centers: &[Point]) -> (Vec<Chain>, usize, usize) {
        if chains.is_empty() {
            return (chains, 0, 0);
        }

        let mut arena = chains;
        let mut active: Vec<usize> = (0..arena.len()).collect();
        let mut passes = 0;
        let mut total_merges = 0;

        loop {
            passes += 1;
            let mut merges = 0;

            let mut i = 0;
            while i < active.len() {
                let mut j = 0;
                while j < active.len() {
                    if i == j {
                        j += 1;
                        continue;
                    }
                    let (ci, cj) = (active[i], active[j]);
                    let Some(join) = self.try_join(&arena[ci], &arena[cj]) else {
                        j += 1;
                        continue;
                    };

                    let absorbed = std::mem::take(&mut arena[cj].members);
                    let target = &mut arena[ci];
                    match join {
                        Join::NewP(p) => target.p = p,
                        Join::NewQ(q) => target.q = q,
                    }
                    target.members.extend(absorbed);
                    target.refresh(centers);
                    if self.log.chains {
                        debug!(into = ci, from = cj, p = target.p, q = target.q, "chains merged");
                    }

                    active.remove(j);
                    if j < i {
                        i -= 1;
                    }
                    merges += 1;
                }
                i += 1;
            }

            active.sort_by(|a, b| arena[*b].members.len().cmp(&arena[*a].members.len()));
            total_merges += merges;
            if merges == 0 {
                break;
            }
        }

        let mut slots: Vec<Option<Chain>> = arena.into_iter().map(Some).collect();
        let survivors = active.iter().filter_map(|&id| slots[id].take()).collect();
        (survivors, passes, total_merges)
    }

    /// Checks whether `b` extends `a` through a shared endpoint in a compatible
    /// direction. Only the first shared-endpoint case is considered.
    fn try_join(&self, a: &Chain, b: &Chain) -> Option<Join> {
        let (other, join) = if a.p == b.p {
            (-b.direction, Join::NewP(b.q))
        } else if a.p == b.q {
            (b.direction, Join::NewP(b.p))
        } else if a.q == b.p {
            (b.direction, Join::NewQ(b.q))
        } else if a.q == b.q {
            (-b.direction, Join::NewQ(b.p))
        } else {
            return None;
        };

        (angle_between(a.direction, other) < self.config.merge_angle).then_some(join)
    }
}
