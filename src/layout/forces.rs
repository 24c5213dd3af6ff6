use eframe::egui::{Vec2, vec2};

use super::LayoutConfig;

/// Unit vector used when two nodes sit on top of each other.
fn fallback_direction(first: usize, second: usize) -> Vec2 {
    let angle = ((first as f32) * 0.618_034 + (second as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Push applied to the node at `point_a` by the node at `point_b`.
///
/// Zero outside `config.repulsion_radius`. For distinct points the push on `b` by `a` is
/// exactly the negation. Coincident points have no direction of their own and both orders get
/// the same `+x` push; `accumulate_repulsion` applies one index-derived direction with
/// opposite signs instead.
pub fn repulsion_between(point_a: Vec2, point_b: Vec2, config: &LayoutConfig) -> Vec2 {
    repulsion_with_fallback(point_a, point_b, config, vec2(1.0, 0.0))
}

fn repulsion_with_fallback(
    point_a: Vec2,
    point_b: Vec2,
    config: &LayoutConfig,
    fallback: Vec2,
) -> Vec2 {
    let delta = point_a - point_b;
    let distance_sq = delta.length_sq();
    let radius = config.repulsion_radius;
    if distance_sq >= radius * radius {
        return Vec2::ZERO;
    }

    let distance = (distance_sq + config.softening).sqrt();
    let direction = if distance_sq > 1e-12 {
        delta / distance_sq.sqrt()
    } else {
        fallback
    };

    let falloff = (1.0 - (distance / radius)).max(0.0);
    let magnitude = (config.repulsion_strength * falloff * falloff).min(config.max_pair_force);
    direction * magnitude
}

/// Adds the symmetric pairwise repulsion for every pair of `positions` into `forces`.
pub(super) fn accumulate_repulsion(positions: &[Vec2], config: &LayoutConfig, forces: &mut [Vec2]) {
    let node_count = positions.len();
    for first in 0..node_count {
        for second in (first + 1)..node_count {
            let push = repulsion_with_fallback(
                positions[first],
                positions[second],
                config,
                fallback_direction(first, second),
            );
            forces[first] += push;
            forces[second] -= push;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repulsion_is_antisymmetric() {
        let config = LayoutConfig::default();
        let a = vec2(4.8, -3.04);
        let b = vec2(4.92, -3.0);
        let on_a = repulsion_between(a, b, &config);
        let on_b = repulsion_between(b, a, &config);
        assert!(on_a.length() > 0.0);
        assert!((on_a + on_b).length() < 1e-6, "{on_a:?} vs {on_b:?}");
        assert!(on_a.x < 0.0, "a sits left of b and must be pushed left");
    }

    #[test]
    fn repulsion_vanishes_outside_radius() {
        let config = LayoutConfig::default();
        let far = vec2(config.repulsion_radius * 1.01, 0.0);
        assert_eq!(repulsion_between(Vec2::ZERO, far, &config), Vec2::ZERO);
    }

    #[test]
    fn repulsion_decreases_with_distance() {
        let config = LayoutConfig::default();
        let near = repulsion_between(Vec2::ZERO, vec2(0.1, 0.0), &config).length();
        let mid = repulsion_between(Vec2::ZERO, vec2(0.3, 0.0), &config).length();
        let edge = repulsion_between(Vec2::ZERO, vec2(0.55, 0.0), &config).length();
        assert!(near > mid && mid > edge, "{near} {mid} {edge}");
    }

    #[test]
    fn coincident_points_stay_bounded() {
        let config = LayoutConfig::default();
        let push = repulsion_between(vec2(1.0, 1.0), vec2(1.0, 1.0), &config);
        assert!(push.is_finite());
        assert!(push.length() <= config.max_pair_force + 1e-6);
    }

    #[test]
    fn coincident_points_use_a_fixed_direction() {
        let config = LayoutConfig::default();
        let point = vec2(-0.5, 2.0);
        let push = repulsion_between(point, point, &config);
        assert!(push.x > 0.0 && push.y == 0.0, "{push:?}");
        assert_eq!(push, repulsion_between(point, point, &config));
    }

    #[test]
    fn accumulated_forces_separate_coincident_points() {
        let config = LayoutConfig::default();
        let positions = [vec2(1.0, 1.0), vec2(1.0, 1.0)];
        let mut forces = [Vec2::ZERO; 2];
        accumulate_repulsion(&positions, &config, &mut forces);
        assert!(forces[0].length() > 0.0);
        assert_eq!(forces[0], -forces[1]);
    }

    #[test]
    fn accumulated_forces_balance() {
        let config = LayoutConfig::default();
        let positions = [vec2(0.0, 0.0), vec2(0.1, 0.05), vec2(-0.2, 0.1), vec2(0.0, 0.0)];
        let mut forces = [Vec2::ZERO; 4];
        accumulate_repulsion(&positions, &config, &mut forces);
        let net = forces.iter().fold(Vec2::ZERO, |sum, force| sum + *force);
        assert!(net.length() < 1e-5, "net force {net:?}");
    }
}
