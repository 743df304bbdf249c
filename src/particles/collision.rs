//! Wave → molecule collision protocol
//!
//! Evaluated for every wave/molecule pair whose overlap started during a
//! backend step. Only molecules on the wave's edge band get pushed, and a wave
//! pushes each molecule at most once over its lifetime. The sensor itself never
//! produces a physical response.

use glam::Vec2;

use super::{Molecule, MoleculeId, Wave, WaveId};
use crate::error::Result;
use crate::physics::Space;

/// Half-width of the band around the wave's radius in which impulses apply
pub const EDGE_BAND: f32 = 5.0;

/// Upper bound on the impulse magnitude a wave can deliver
pub const MAX_IMPULSE: f32 = 1000.0;

/// An impulse delivered by a wave during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedImpulse {
    pub wave: WaveId,
    pub molecule: MoleculeId,
    pub impulse: Vec2,
}

/// Impulse a wave edge delivers to a molecule at `molecule_center`, or `None`
/// when the molecule is off the edge band.
pub fn edge_impulse(
    wave_center: Vec2,
    wave_radius: f32,
    impulse_strength: f32,
    molecule_center: Vec2,
) -> Option<Vec2> {
    let diff = molecule_center - wave_center;
    let distance = diff.length();

    if distance < wave_radius - EDGE_BAND || distance > wave_radius + EDGE_BAND {
        return None;
    }

    let impulse = diff.normalize_or_zero() * impulse_strength;
    Some(impulse.clamp_length_max(MAX_IMPULSE))
}

/// Apply the protocol to one reported contact.
pub fn resolve_contact(
    wave: &mut Wave,
    molecule: &Molecule,
    space: &mut Space,
) -> Result<Option<AppliedImpulse>> {
    if wave.has_influenced(molecule.id()) {
        return Ok(None);
    }

    let wave_center = wave.position(space)?;
    let molecule_center = molecule.position(space)?;
    let Some(impulse) = edge_impulse(
        wave_center,
        wave.radius(),
        wave.impulse_strength(),
        molecule_center,
    ) else {
        return Ok(None);
    };

    molecule.apply_impulse(space, impulse)?;
    wave.mark_influenced(molecule.id());

    log::trace!(
        "{} pushed {} by {} (radius {:.1})",
        wave.id(),
        molecule.id(),
        impulse,
        wave.radius()
    );

    Ok(Some(AppliedImpulse {
        wave: wave.id(),
        molecule: molecule.id(),
        impulse,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::WaveSpawn;

    #[test]
    fn test_edge_band_is_inclusive() {
        let center = Vec2::ZERO;
        assert!(edge_impulse(center, 100.0, 10.0, Vec2::new(95.0, 0.0)).is_some());
        assert!(edge_impulse(center, 100.0, 10.0, Vec2::new(105.0, 0.0)).is_some());
        assert!(edge_impulse(center, 100.0, 10.0, Vec2::new(94.0, 0.0)).is_none());
        assert!(edge_impulse(center, 100.0, 10.0, Vec2::new(106.0, 0.0)).is_none());
    }

    #[test]
    fn test_impulse_points_away_from_center() {
        let impulse = edge_impulse(Vec2::new(10.0, 10.0), 50.0, 20.0, Vec2::new(10.0, 60.0)).unwrap();
        assert!((impulse - Vec2::new(0.0, 20.0)).length() < 1e-4);
    }

    #[test]
    fn test_impulse_is_clamped() {
        let impulse = edge_impulse(Vec2::ZERO, 100.0, 10_000.0, Vec2::new(60.0, 80.0)).unwrap();
        assert!((impulse.length() - MAX_IMPULSE).abs() < 1e-2);
        // Direction survives the clamp
        assert!((impulse.normalize() - Vec2::new(0.6, 0.8)).length() < 1e-4);
    }

    #[test]
    fn test_coincident_centers_give_zero_impulse() {
        let impulse = edge_impulse(Vec2::ZERO, 0.0, 100.0, Vec2::ZERO).unwrap();
        assert_eq!(impulse, Vec2::ZERO);
    }

    #[test]
    fn test_resolve_contact_applies_once() {
        let mut space = Space::new(0).unwrap();
        let molecule = Molecule::create(&mut space, 1.0, 1.0, None, Vec2::new(100.0, 0.0)).unwrap();
        let mut wave = Wave::create(
            &mut space,
            WaveSpawn {
                position: Vec2::ZERO,
                radius: 100.0,
                impulse_strength: 30.0,
                velocity: Vec2::X,
            },
        )
        .unwrap();

        let first = resolve_contact(&mut wave, &molecule, &mut space).unwrap().unwrap();
        assert_eq!(first.molecule, molecule.id());
        assert_eq!(first.wave, wave.id());
        assert!((first.impulse - Vec2::new(30.0, 0.0)).length() < 1e-4);

        let second = resolve_contact(&mut wave, &molecule, &mut space).unwrap();
        assert!(second.is_none());
        assert!(wave.has_influenced(molecule.id()));
    }

    #[test]
    fn test_resolve_contact_ignores_interior_molecule() {
        let mut space = Space::new(0).unwrap();
        let molecule = Molecule::create(&mut space, 1.0, 1.0, None, Vec2::new(10.0, 0.0)).unwrap();
        let mut wave = Wave::create(
            &mut space,
            WaveSpawn {
                position: Vec2::ZERO,
                radius: 100.0,
                impulse_strength: 30.0,
                velocity: Vec2::X,
            },
        )
        .unwrap();

        assert!(resolve_contact(&mut wave, &molecule, &mut space).unwrap().is_none());
        // Not recorded, so the edge can still push it later
        assert!(!wave.has_influenced(molecule.id()));
    }
}
