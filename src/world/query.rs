//! Axis-aligned regions for spatial queries

use glam::Vec2;

use crate::particles::MoleculeView;

/// Rectangle `[min, max]`, edges inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub min: Vec2,
    pub max: Vec2,
}

impl Region {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Grow by `padding` on all sides
    pub fn padded(&self, padding: f32) -> Self {
        Self::new(self.min - Vec2::splat(padding), self.max + Vec2::splat(padding))
    }

    /// Whether the bounding box of a circle touches this region
    pub fn touches_circle(&self, center: Vec2, radius: f32) -> bool {
        let r = Vec2::splat(radius);
        (center - r).cmple(self.max).all() && (center + r).cmpge(self.min).all()
    }

    /// Keep the molecules whose bounding box touches this region
    pub fn filter<'a>(
        &'a self,
        molecules: &'a [MoleculeView],
    ) -> impl Iterator<Item = &'a MoleculeView> + 'a {
        molecules
            .iter()
            .filter(move |m| self.touches_circle(m.position, m.radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded() {
        let region = Region::new(Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0)).padded(5.0);
        assert_eq!(region.min, Vec2::new(5.0, 15.0));
        assert_eq!(region.max, Vec2::new(35.0, 45.0));
    }

    #[test]
    fn test_touches_circle_edges_inclusive() {
        let region = Region::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert!(region.touches_circle(Vec2::new(5.0, 5.0), 1.0));
        assert!(region.touches_circle(Vec2::new(11.0, 5.0), 1.0));
        assert!(region.touches_circle(Vec2::new(-2.0, -2.0), 2.0));
        assert!(!region.touches_circle(Vec2::new(11.5, 5.0), 1.0));
        assert!(!region.touches_circle(Vec2::new(5.0, -1.5), 1.0));
    }
}
