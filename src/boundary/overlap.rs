use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::obstacle::Obstacle;
use crate::discretization::cell_box::CellBox;

/// Which obstacle keeps face cells that lie inside both obstacles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPriority {
    /// The obstacle declared first keeps shared cells.
    #[default]
    DeclarationOrder,
    /// The obstacle declared later keeps shared cells.
    ReverseDeclarationOrder,
}

impl OverlapPriority {
    fn first_wins(self) -> bool {
        matches!(self, OverlapPriority::DeclarationOrder)
    }
}

impl Obstacle {
    /// Removes face cells that are not exposed because another obstacle sits
    /// against (or inside) them.
    ///
    /// On every level both obstacles are built on:
    /// * a face cell whose outward neighbour lies inside the other obstacle is
    ///   removed from its face list;
    /// * a face cell lying inside the other obstacle is kept only by the
    ///   obstacle that wins under `priority`, and only while it is still
    ///   exposed or lies on the plane the two obstacles share; cells buried
    ///   in the union are dropped by both.
    ///
    /// `first` is the obstacle declared earlier. Interior lists are untouched
    /// and a second call with the same pair changes nothing. Returns whether the
    /// two obstacles are in contact on any level.
    pub fn remove_cells_facing_another_obstacle(
        first: &mut Obstacle,
        second: &mut Obstacle,
        priority: OverlapPriority,
    ) -> bool {
        let from = first.base_level().max(second.base_level());
        let to = first.coarsest_level().min(second.coarsest_level());
        let first_wins = priority.first_wins();

        let mut contact = false;
        let mut removed = (0, 0);
        for level in from..=to {
            let (Ok(a), Ok(b)) = (first.level_mut(level), second.level_mut(level)) else {
                continue;
            };
            let (box_a, box_b) = (*a.cell_box(), *b.cell_box());
            if !box_a.in_contact(&box_b) {
                continue;
            }
            contact = true;
            let ra = a.strip_contested(&box_b, first_wins);
            let rb = b.strip_contested(&box_a, !first_wins);
            if ra + rb > 0 {
                debug!(
                    "level {level}: removed {ra} cells from '{}' and {rb} from '{}'",
                    first.name(),
                    second.name()
                );
            }
            removed.0 += ra;
            removed.1 += rb;
        }

        if contact {
            info!(
                "obstacles '{}' and '{}' are in contact, removed {} / {} facing cells",
                first.name(),
                second.name(),
                removed.0,
                removed.1
            );
        }
        contact
    }

    /// Whether the two obstacles share at least one cell on a common level.
    pub fn shares_cells_with(&self, other: &Obstacle) -> bool {
        self.any_common_level(other, |a, b| a.intersects(b))
    }

    /// Whether the two obstacles touch or overlap on a common level.
    pub fn in_contact_with(&self, other: &Obstacle) -> bool {
        self.any_common_level(other, |a, b| a.in_contact(b))
    }

    fn any_common_level(
        &self,
        other: &Obstacle,
        test: impl Fn(&CellBox, &CellBox) -> bool,
    ) -> bool {
        let from = self.base_level().max(other.base_level());
        let to = self.coarsest_level().min(other.coarsest_level());
        (from..=to).any(|level| match (self.level(level), other.level(level)) {
            (Ok(a), Ok(b)) => test(a.cell_box(), b.cell_box()),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::face::Face;
    use crate::discretization::grid::Grid;
    use glam::DVec3;

    fn grid() -> Grid {
        Grid::new(DVec3::ZERO, DVec3::ONE, [16, 16, 16], 2).expect("valid grid")
    }

    #[test]
    fn adjacent_obstacles_lose_facing_cells_on_both_sides() {
        let g = grid();
        let mut a = Obstacle::from_grid(&g, "a", [3, 4, 4], [6, 9, 9], 0).unwrap();
        let mut b = Obstacle::from_grid(&g, "b", [7, 4, 4], [10, 9, 9], 0).unwrap();
        assert!(Obstacle::remove_cells_facing_another_obstacle(
            &mut a,
            &mut b,
            OverlapPriority::DeclarationOrder
        ));
        assert_eq!(a.face_len(0, Face::Right).unwrap(), 0);
        assert_eq!(b.face_len(0, Face::Left).unwrap(), 0);
        assert_eq!(a.face_len(0, Face::Left).unwrap(), 16);
        assert_eq!(a.interior_indices(0).unwrap().len(), 4 * 6 * 6);
    }

    #[test]
    fn distant_obstacles_are_untouched() {
        let g = grid();
        let mut a = Obstacle::from_grid(&g, "a", [3, 3, 3], [5, 5, 5], 0).unwrap();
        let mut b = Obstacle::from_grid(&g, "b", [10, 10, 10], [12, 12, 12], 0).unwrap();
        let before = a.level(0).unwrap().clone();
        assert!(!Obstacle::remove_cells_facing_another_obstacle(
            &mut a,
            &mut b,
            OverlapPriority::DeclarationOrder
        ));
        assert_eq!(a.level(0).unwrap(), &before);
        assert!(!a.shares_cells_with(&b));
    }

    #[test]
    fn buried_face_cells_are_dropped_by_the_winner() {
        let g = grid();
        let mut a = Obstacle::from_grid(&g, "a", [3, 4, 4], [8, 9, 9], 0).unwrap();
        let mut b = Obstacle::from_grid(&g, "b", [6, 4, 4], [12, 9, 9], 0).unwrap();
        Obstacle::remove_cells_facing_another_obstacle(
            &mut a,
            &mut b,
            OverlapPriority::DeclarationOrder,
        );
        // a's right face at x = 8 sits three cells deep inside b
        assert_eq!(a.face_len(0, Face::Right).unwrap(), 0);
        assert_eq!(b.face_len(0, Face::Left).unwrap(), 0);
        // the top of the overlap is still exposed and a keeps it
        assert_eq!(a.face_len(0, Face::Top).unwrap(), 24);
        assert_eq!(b.face_len(0, Face::Top).unwrap(), 16);
    }

    #[test]
    fn reverse_priority_flips_the_winner() {
        let g = grid();
        let mut a = Obstacle::from_grid(&g, "a", [3, 4, 4], [6, 9, 9], 0).unwrap();
        let mut b = Obstacle::from_grid(&g, "b", [6, 4, 4], [9, 9, 9], 0).unwrap();
        Obstacle::remove_cells_facing_another_obstacle(
            &mut a,
            &mut b,
            OverlapPriority::ReverseDeclarationOrder,
        );
        assert_eq!(a.face_len(0, Face::Right).unwrap(), 0);
        assert_eq!(b.face_len(0, Face::Left).unwrap(), 16);
        assert!(a.shares_cells_with(&b));
    }
}
