//! Force-directed layout of entries around their valence/arousal anchors.
//!
//! Each tick applies, in order: pairwise short-range repulsion, a spring toward the anchor,
//! zoom-dependent gravity toward the entry's cluster centroid, damping, a speed clamp, and
//! semi-implicit Euler integration. Repulsion is a plain O(n²) pass; entry counts stay in the
//! low hundreds.

mod forces;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::centroid::Centroids;
use crate::entry::{Entry, EntryId};
use crate::taxonomy::{Primary, Secondary};
use crate::util::stable_pair;
use crate::viewport::ZoomBand;

pub use forces::repulsion_between;
use forces::accumulate_repulsion;

/// Longest step a single tick integrates, in seconds.
pub const MAX_TICK_SECONDS: f32 = 1.0 / 30.0;
const REFERENCE_TICK_RATE: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// World-space radius beyond which two entries do not interact.
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    /// Added to the squared distance before the square root.
    pub softening: f32,
    pub max_pair_force: f32,
    pub spring: f32,
    /// Pull toward the primary-tier centroid in the family band.
    pub family_gravity: f32,
    /// Pull toward the secondary-tier centroid in the detail band.
    pub detail_gravity: f32,
    /// Velocity retained per reference (60 Hz) tick.
    pub damping: f32,
    pub max_speed: f32,
    /// Half-width of the first-seen offset around the anchor.
    pub jitter: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            repulsion_radius: 0.6,
            repulsion_strength: 6.0,
            softening: 1e-4,
            max_pair_force: 5.0,
            spring: 8.0,
            family_gravity: 2.5,
            detail_gravity: 5.0,
            damping: 0.88,
            max_speed: 4.0,
            jitter: 0.05,
        }
    }
}

#[derive(Clone, Debug)]
struct Cluster {
    primary: Primary,
    secondary: Secondary,
}

#[derive(Clone, Debug)]
struct Node {
    id: EntryId,
    position: Vec2,
    velocity: Vec2,
    anchor: Vec2,
    cluster: Cluster,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    forces: Vec<Vec2>,
}

/// Result of reconciling the engine with a new active entry set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub pruned: usize,
    pub reanchored: usize,
}

impl SyncReport {
    pub fn changed(&self) -> bool {
        self.created > 0 || self.pruned > 0 || self.reanchored > 0
    }
}

/// Owns the simulation state of every classified entry in the active set.
pub struct LayoutEngine {
    config: LayoutConfig,
    nodes: Vec<Node>,
    index_by_id: HashMap<EntryId, usize>,
    centroids: Centroids,
    band: ZoomBand,
    scratch: Scratch,
    kinetic_energy: f32,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
            centroids: Centroids::default(),
            band: ZoomBand::Overview,
            scratch: Scratch::default(),
            kinetic_energy: 0.0,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntryId> {
        self.nodes.iter().map(|node| &node.id)
    }

    pub fn centroids(&self) -> &Centroids {
        &self.centroids
    }

    pub fn band(&self) -> ZoomBand {
        self.band
    }

    /// Selects which cluster tier (if any) pulls on entries.
    pub fn set_view_scale(&mut self, scale: f32) {
        self.band = ZoomBand::for_scale(scale);
    }

    /// Sum of squared speeds after the last tick.
    pub fn kinetic_energy(&self) -> f32 {
        self.kinetic_energy
    }

    pub fn is_settled(&self) -> bool {
        self.kinetic_energy < 1e-6
    }

    /// Simulated position, if the entry has state.
    pub fn position(&self, id: &EntryId) -> Option<Vec2> {
        self.index_by_id
            .get(id)
            .map(|&index| self.nodes[index].position)
    }

    pub fn velocity(&self, id: &EntryId) -> Option<Vec2> {
        self.index_by_id
            .get(id)
            .map(|&index| self.nodes[index].velocity)
    }

    /// Rendered position of `entry`: the simulated one, or its anchor before the first sync.
    pub fn position_of(&self, entry: &Entry) -> Option<Vec2> {
        self.position(&entry.id).or_else(|| entry.anchor())
    }

    /// Reconciles simulation state with the active set.
    ///
    /// New classified entries start at their anchor plus a small id-derived offset. Existing
    /// entries keep their position and velocity; only the anchor follows the classification.
    /// State for entries that left the set, or lost their classification, is dropped.
    pub fn sync<'a>(&mut self, entries: impl IntoIterator<Item = &'a Entry>) -> SyncReport {
        let entries = entries.into_iter().collect::<Vec<_>>();
        let mut report = SyncReport::default();

        let mut prior_nodes = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect::<HashMap<_, _>>();

        let mut next_nodes = Vec::with_capacity(entries.len());
        for entry in &entries {
            let Some(classification) = entry.classification() else {
                continue;
            };
            let anchor = classification.anchor();
            let cluster = Cluster {
                primary: classification.primary(),
                secondary: classification.emotion(),
            };

            if let Some(mut node) = prior_nodes.remove(&entry.id) {
                if node.anchor != anchor {
                    report.reanchored += 1;
                }
                node.anchor = anchor;
                node.cluster = cluster;
                next_nodes.push(node);
            } else if !next_nodes.iter().any(|node: &Node| node.id == entry.id) {
                let (jx, jy) = stable_pair(entry.id.as_str());
                report.created += 1;
                next_nodes.push(Node {
                    id: entry.id.clone(),
                    position: anchor + vec2(jx, jy) * self.config.jitter,
                    velocity: Vec2::ZERO,
                    anchor,
                    cluster,
                });
            }
        }
        report.pruned = prior_nodes.len();

        self.index_by_id = next_nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();
        self.nodes = next_nodes;
        self.centroids = Centroids::compute(entries.iter().copied());

        if report.changed() {
            debug!(
                created = report.created,
                pruned = report.pruned,
                reanchored = report.reanchored,
                active = self.nodes.len(),
                "layout state reconciled"
            );
        }
        report
    }

    fn cluster_target(&self, cluster: &Cluster) -> Option<(Vec2, f32)> {
        match self.band {
            ZoomBand::Overview => None,
            ZoomBand::Family => self
                .centroids
                .primary(cluster.primary)
                .map(|centroid| (centroid.world(), self.config.family_gravity)),
            ZoomBand::Detail => self
                .centroids
                .secondary(cluster.secondary)
                .map(|centroid| (centroid.world(), self.config.detail_gravity)),
        }
    }

    /// Advances the simulation by `dt` seconds (capped at [`MAX_TICK_SECONDS`]).
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 || self.nodes.is_empty() {
            return;
        }
        let dt = dt.min(MAX_TICK_SECONDS);
        let node_count = self.nodes.len();

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.position));
        scratch.forces.clear();
        scratch.forces.resize(node_count, Vec2::ZERO);
        accumulate_repulsion(&scratch.positions, &self.config, &mut scratch.forces);

        let mut forces = std::mem::take(&mut self.scratch.forces);
        for (node, force) in self.nodes.iter().zip(forces.iter_mut()) {
            *force += (node.anchor - node.position) * self.config.spring;
            if let Some((target, strength)) = self.cluster_target(&node.cluster) {
                *force += (target - node.position) * strength;
            }
        }

        let damping_factor = self.config.damping.powf(dt * REFERENCE_TICK_RATE);
        let max_speed = self.config.max_speed;
        let max_speed_sq = max_speed * max_speed;
        let mut kinetic_energy = 0.0;
        for (node, force) in self.nodes.iter_mut().zip(forces.iter()) {
            let mut velocity = (node.velocity + *force * dt) * damping_factor;
            let speed_sq = velocity.length_sq();
            if speed_sq > max_speed_sq {
                velocity *= max_speed / speed_sq.sqrt();
            }

            node.velocity = velocity;
            node.position += velocity * dt;
            kinetic_energy += velocity.length_sq();
        }
        self.scratch.forces = forces;
        self.kinetic_energy = kinetic_energy;
    }

    /// Runs fixed `dt` ticks until `duration` seconds of simulated time have elapsed.
    pub fn run_burst(&mut self, duration: f32, dt: f32) -> usize {
        if !duration.is_finite() || !dt.is_finite() || duration <= 0.0 || dt <= 0.0 {
            return 0;
        }

        let step = dt.min(MAX_TICK_SECONDS);
        let ticks = (duration / step).ceil() as usize;
        for _ in 0..ticks {
            self.tick(step);
        }
        debug!(ticks, energy = self.kinetic_energy, "relaxation burst finished");
        ticks
    }
}
