//! Collision layers
//!
//! Every collider belongs to exactly one layer. Waves only see molecules, so a
//! wave sensor never reports walls or other waves.

use rapier2d::prelude::{Group, InteractionGroups};

pub const MOLECULES: Group = Group::GROUP_1;
pub const WAVES: Group = Group::GROUP_2;
pub const WALLS: Group = Group::GROUP_3;

/// Molecules collide with everything that admits them
pub fn molecules() -> InteractionGroups {
    InteractionGroups::new(MOLECULES, Group::ALL)
}

/// Wave sensors are restricted to the molecule layer
pub fn waves() -> InteractionGroups {
    InteractionGroups::new(WAVES, MOLECULES)
}

pub fn walls() -> InteractionGroups {
    InteractionGroups::new(WALLS, MOLECULES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wave_sees_only_molecules() {
        assert!(waves().test(molecules()));
        assert!(!waves().test(walls()));
        assert!(!waves().test(waves()));
    }

    #[test]
    fn test_molecules_hit_walls_and_each_other() {
        assert!(molecules().test(walls()));
        assert!(molecules().test(molecules()));
    }
}
