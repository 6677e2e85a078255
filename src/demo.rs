//! Built-in demonstration trajectories.
//!
//! An explicit registry maps each robot's degrees of freedom to a list of
//! named trajectory generators; the Demo mode picks one uniformly at random
//! and streams its waypoints. Every generator works over the geometry's
//! vertical profile, so the same figure adapts to the Delta, Quattro and
//! 6-RUS working volumes.

use std::f64::consts::PI;

use crate::kinematic_traits::{MoveKind, Pose};

/// One demo step: the pose to reach and how to reach it.
pub type Waypoint = (Pose, MoveKind);

/// Vertical extent and platform attitude of one geometry's demo space.
#[derive(Debug, Clone, Copy)]
pub struct DemoProfile {
    /// Lowest reachable z coordinate.
    pub min_height: f64,
    /// Height above `min_height` the figures are drawn at.
    pub level: f64,
    /// Height above `min_height` of the final retract pose.
    pub end_level: f64,
    /// Platform rotation held throughout (the Quattro draws turned 45 deg).
    pub orientation: f64,
}

impl DemoProfile {
    fn draw_height(&self) -> f64 {
        self.min_height + self.level
    }

    fn end_height(&self) -> f64 {
        self.min_height + self.end_level
    }
}

/// A named trajectory generator.
pub struct DemoProgram {
    pub name: &'static str,
    pub generate: fn(&DemoProfile) -> Vec<Waypoint>,
}

fn at(x: f64, y: f64, z: f64, rotation: f64) -> Pose {
    vec![x, y, z, rotation, 0.0, 0.0]
}

/// Square with two laps, entered point-to-point and drawn linearly.
pub fn square(profile: &DemoProfile) -> Vec<Waypoint> {
    let a = 30.0;
    let h = profile.draw_height();
    let rot = profile.orientation;

    let mut path = vec![(at(a, a, h, rot), MoveKind::Ptp)];
    for _ in 0..2 {
        path.push((at(a, a, h, rot), MoveKind::Linear));
        path.push((at(-a, a, h, rot), MoveKind::Linear));
        path.push((at(-a, -a, h, rot), MoveKind::Linear));
        path.push((at(a, -a, h, rot), MoveKind::Linear));
    }
    path.push((at(a, a, h, rot), MoveKind::Linear));
    path.push((at(0.0, 0.0, profile.end_height(), rot), MoveKind::Ptp));
    path
}

/// Equilateral triangle, two laps.
pub fn triangle(profile: &DemoProfile) -> Vec<Waypoint> {
    let a = 30.0;
    let half_height = a * 3f64.sqrt() / 4.0;
    let h = profile.draw_height();
    let rot = profile.orientation;

    let mut path = Vec::new();
    for _ in 0..2 {
        path.push((at(-half_height, a, h, rot), MoveKind::Ptp));
        path.push((at(-half_height, -a, h, rot), MoveKind::Linear));
        path.push((at(half_height, 0.0, h, rot), MoveKind::Linear));
    }
    path.push((at(-half_height, a, h, rot), MoveKind::Linear));
    path.push((at(0.0, 0.0, profile.end_height(), rot), MoveKind::Ptp));
    path
}

/// Circle traced twice out of short point-to-point chords.
pub fn circle(profile: &DemoProfile) -> Vec<Waypoint> {
    let radius = 40.0;
    let resolution = 50;
    let laps = 2;
    let h = profile.draw_height();
    let rot = profile.orientation;

    let mut path = vec![
        (at(0.0, 0.0, h, rot), MoveKind::Ptp),
        (at(radius, 0.0, h, rot), MoveKind::Linear),
    ];
    for step in 0..resolution * laps {
        let angle = step as f64 * 2.0 * PI / resolution as f64;
        path.push((at(angle.cos() * radius, angle.sin() * radius, h, rot), MoveKind::Ptp));
    }
    path.push((at(0.0, 0.0, h, rot), MoveKind::Linear));
    path.push((at(0.0, 0.0, profile.end_height(), rot), MoveKind::Ptp));
    path
}

/// Figure eight out of two tangent circles.
pub fn eight(profile: &DemoProfile) -> Vec<Waypoint> {
    let radius = 15.0;
    let resolution = 30;
    let h = profile.draw_height();
    let rot = profile.orientation;

    let mut path = vec![(at(0.0, 0.0, h, rot), MoveKind::Ptp)];
    for step in 0..=resolution {
        let angle = step as f64 * 2.0 * PI / resolution as f64;
        path.push((
            at(-angle.sin() * radius, angle.cos() * radius - radius, h, rot),
            MoveKind::Ptp,
        ));
    }
    for step in 0..=resolution {
        let angle = step as f64 * 2.0 * PI / resolution as f64;
        path.push((
            at(-angle.sin() * radius, -angle.cos() * radius + radius, h, rot),
            MoveKind::Ptp,
        ));
    }
    path.push((at(0.0, 0.0, profile.end_height(), rot), MoveKind::Ptp));
    path
}

/// Tetrahedron: triangular base with apex visits.
pub fn pyramid(profile: &DemoProfile) -> Vec<Waypoint> {
    let a = 30.0;
    let half_height = a * 3f64.sqrt() / 4.0;
    let apex = a * 6f64.sqrt() / 3.0;
    let h = profile.draw_height();
    let rot = profile.orientation;

    vec![
        (at(0.0, 0.0, h + apex, rot), MoveKind::Ptp),
        (at(-half_height, -a, h, rot), MoveKind::Linear),
        (at(half_height, 0.0, h, rot), MoveKind::Linear),
        (at(0.0, 0.0, h + apex, rot), MoveKind::Ptp),
        (at(half_height, 0.0, h, rot), MoveKind::Linear),
        (at(-half_height, a, h, rot), MoveKind::Linear),
        (at(0.0, 0.0, h + apex, rot), MoveKind::Ptp),
        (at(-half_height, a, h, rot), MoveKind::Linear),
        (at(-half_height, -a, h, rot), MoveKind::Linear),
        (at(0.0, 0.0, h + apex, rot), MoveKind::Ptp),
        (at(0.0, 0.0, profile.end_height(), rot), MoveKind::Ptp),
    ]
}

/// 3x2 palette pick-and-place with linear approach and retreat strokes.
pub fn pick_place(profile: &DemoProfile) -> Vec<Waypoint> {
    let (dist_x, dist_y) = (15.0, 15.0);
    let mid_dist = 20.0;
    let lin_height = 20.0;
    let h = profile.draw_height();
    let upper = profile.min_height + 70.0;
    let rot = profile.orientation;

    let mut path = Vec::new();
    for column in [-1.0, 0.0, 1.0] {
        for row in [0.0, 1.0] {
            let x = column * dist_x;
            let pick_y = row * dist_y - mid_dist;
            let place_y = row * dist_y + mid_dist;

            path.push((at(x, pick_y, h + lin_height, rot), MoveKind::Linear));
            path.push((at(x, pick_y, h, rot), MoveKind::Ptp));
            path.push((at(x, pick_y, h + lin_height, rot), MoveKind::Linear));
            path.push((at(x, 0.0, upper, rot), MoveKind::Ptp));

            path.push((at(x, place_y, h + lin_height, rot), MoveKind::Linear));
            path.push((at(x, place_y, h, rot), MoveKind::Ptp));
            path.push((at(x, place_y, h + lin_height, rot), MoveKind::Linear));
            path.push((at(x, 0.0, upper, rot), MoveKind::Ptp));
        }
    }
    path.push((at(0.0, 0.0, profile.end_height(), rot), MoveKind::Ptp));
    path
}

/// Registry of demo programs per robot geometry, keyed by its degrees of
/// freedom.
pub struct DemoRegistry {
    delta: (DemoProfile, Vec<DemoProgram>),
    quattro: (DemoProfile, Vec<DemoProgram>),
    six_rus: (DemoProfile, Vec<DemoProgram>),
}

impl DemoRegistry {
    /// The built-in program library.
    pub fn standard() -> Self {
        let full = || {
            vec![
                DemoProgram { name: "square", generate: square },
                DemoProgram { name: "triangle", generate: triangle },
                DemoProgram { name: "circle", generate: circle },
                DemoProgram { name: "eight", generate: eight },
                DemoProgram { name: "pyramid", generate: pyramid },
                DemoProgram { name: "pick-place", generate: pick_place },
            ]
        };
        // The Quattro never got the triangular figures
        let quattro_programs = vec![
            DemoProgram { name: "square", generate: square },
            DemoProgram { name: "circle", generate: circle },
            DemoProgram { name: "eight", generate: eight },
            DemoProgram { name: "pick-place", generate: pick_place },
        ];
        DemoRegistry {
            delta: (
                DemoProfile { min_height: -214.8, level: 50.0, end_level: 30.0, orientation: 0.0 },
                full(),
            ),
            quattro: (
                DemoProfile { min_height: -240.2, level: 60.0, end_level: 30.0, orientation: 0.78 },
                quattro_programs,
            ),
            six_rus: (
                DemoProfile { min_height: -256.2, level: 50.0, end_level: 30.0, orientation: 0.0 },
                full(),
            ),
        }
    }

    fn entry(&self, dof: usize) -> Option<&(DemoProfile, Vec<DemoProgram>)> {
        match dof {
            3 => Some(&self.delta),
            4 => Some(&self.quattro),
            6 => Some(&self.six_rus),
            _ => None,
        }
    }

    /// The program names available for a geometry.
    pub fn names(&self, dof: usize) -> Vec<&'static str> {
        self.entry(dof)
            .map(|(_, programs)| programs.iter().map(|p| p.name).collect())
            .unwrap_or_default()
    }

    /// Picks one program uniformly at random and generates its waypoints.
    pub fn choose(&self, dof: usize) -> Option<(&'static str, Vec<Waypoint>)> {
        let (profile, programs) = self.entry(dof)?;
        if programs.is_empty() {
            return None;
        }
        let program = &programs[rand::random::<usize>() % programs.len()];
        Some((program.name, (program.generate)(profile)))
    }

    /// Generates a program by name, for callers that do not want the random
    /// pick.
    pub fn generate(&self, dof: usize, name: &str) -> Option<Vec<Waypoint>> {
        let (profile, programs) = self.entry(dof)?;
        programs
            .iter()
            .find(|p| p.name == name)
            .map(|p| (p.generate)(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_all_geometries() {
        let registry = DemoRegistry::standard();
        assert_eq!(registry.names(3).len(), 6);
        assert_eq!(registry.names(4).len(), 4);
        assert_eq!(registry.names(6).len(), 6);
        for dof in [3, 4, 6] {
            let (_, waypoints) = registry.choose(dof).unwrap();
            assert!(!waypoints.is_empty());
        }
        assert!(registry.choose(5).is_none());
    }

    #[test]
    fn programs_end_at_the_retract_pose() {
        let registry = DemoRegistry::standard();
        for dof in [3, 4, 6] {
            for name in registry.names(dof) {
                let waypoints = registry.generate(dof, name).unwrap();
                let (last, kind) = waypoints.last().unwrap();
                assert_eq!(*kind, MoveKind::Ptp, "{} must retract point-to-point", name);
                assert_eq!(last[0], 0.0);
                assert_eq!(last[1], 0.0);
                assert!(last[2] < 0.0, "{} retract pose must stay below the base", name);
            }
        }
    }

    #[test]
    fn square_draws_its_edges_linearly() {
        let registry = DemoRegistry::standard();
        let waypoints = registry.generate(4, "square").unwrap();
        let linear = waypoints.iter().filter(|(_, k)| *k == MoveKind::Linear).count();
        assert_eq!(linear, 9);
        // The Quattro draws turned by its resting platform angle
        assert!(waypoints.iter().all(|(p, _)| p[3] == 0.78));
    }
}
