// ==============================================================================
// ground.rs — GROUNDED / AIRBORNE CLASSIFIER
// ------------------------------------------------------------------------------
// One short ray from the chassis origin along its own down axis, reaching just
// past the bottom of the chassis (half height + PROBE_MARGIN). Hit = grounded.
//
// `GroundProbe` is the environment seam; closures implement it for tests and
// `RapierGroundProbe` casts through a rapier QueryPipeline, excluding the
// probing chassis itself.
// ==============================================================================

use rapier3d::prelude::*;

/// Distance past the chassis bottom the probe still counts as ground.
pub const PROBE_MARGIN: Real = 0.1;

pub trait GroundProbe {
    fn probe(&self, origin: Point<Real>, down: Vector<Real>, max_distance: Real) -> bool;
}

impl<F> GroundProbe for F
where
    F: Fn(Point<Real>, Vector<Real>, Real) -> bool,
{
    fn probe(&self, origin: Point<Real>, down: Vector<Real>, max_distance: Real) -> bool {
        self(origin, down, max_distance)
    }
}

pub struct RapierGroundProbe<'a> {
    pub query: &'a QueryPipeline,
    pub bodies: &'a RigidBodySet,
    pub colliders: &'a ColliderSet,
    pub exclude: RigidBodyHandle,
}

impl GroundProbe for RapierGroundProbe<'_> {
    fn probe(&self, origin: Point<Real>, down: Vector<Real>, max_distance: Real) -> bool {
        let ray = Ray::new(origin, down);
        let filter = QueryFilter::default().exclude_rigid_body(self.exclude);

        self.query
            .cast_ray(self.bodies, self.colliders, &ray, max_distance, true, filter)
            .is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSensor {
    probe_distance: Real,
}

impl GroundSensor {
    pub fn new(half_height: Real) -> Self {
        Self {
            probe_distance: half_height + PROBE_MARGIN,
        }
    }

    pub fn probe_distance(&self) -> Real {
        self.probe_distance
    }

    pub fn sense<P>(&self, ground: &P, origin: Point<Real>, down: Vector<Real>) -> bool
    where
        P: GroundProbe + ?Sized,
    {
        ground.probe(origin, down, self.probe_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reaches_just_past_the_chassis() {
        let sensor = GroundSensor::new(0.35);
        assert!((sensor.probe_distance() - 0.45).abs() < 1e-6);

        // flat floor at y = 0
        let floor = |o: Point<Real>, d: Vector<Real>, max: Real| d.y < 0.0 && o.y <= max;
        let down = vector![0.0, -1.0, 0.0];
        assert!(sensor.sense(&floor, point![0.0, 0.35, 0.0], down));
        assert!(sensor.sense(&floor, point![0.0, 0.44, 0.0], down));
        assert!(!sensor.sense(&floor, point![0.0, 0.5, 0.0], down));
        assert!(!sensor.sense(&floor, point![0.0, 0.35, 0.0], -down));
    }

    #[test]
    fn rapier_probe_hits_ground_and_skips_self() {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        let ground = bodies.insert(RigidBodyBuilder::fixed().translation(vector![0.0, -0.5, 0.0]));
        colliders.insert_with_parent(ColliderBuilder::cuboid(50.0, 0.5, 50.0), ground, &mut bodies);

        let car = bodies.insert(RigidBodyBuilder::dynamic().translation(vector![0.0, 0.4, 0.0]));
        colliders.insert_with_parent(ColliderBuilder::cuboid(1.0, 0.35, 2.0), car, &mut bodies);

        let mut query = QueryPipeline::new();
        query.update(&colliders);

        let probe = RapierGroundProbe {
            query: &query,
            bodies: &bodies,
            colliders: &colliders,
            exclude: car,
        };
        let sensor = GroundSensor::new(0.35);
        let down = vector![0.0, -1.0, 0.0];

        assert!(sensor.sense(&probe, point![0.0, 0.4, 0.0], down));
        assert!(!sensor.sense(&probe, point![0.0, 3.0, 0.0], down));
    }
}
