/// Pure index arithmetic behind every reorder
///
/// Nothing here touches the database. The maintainer turns these values into
/// bound parameters for its statement batches, and the unit tests below replay
/// the same batches against in-memory index vectors.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// One-step shift direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards index 0
    Left,

    /// Towards the end of the container
    Right,
}

impl Direction {
    pub fn delta(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    pub fn from_delta(delta: i32) -> Option<Self> {
        match delta {
            -1 => Some(Direction::Left),
            1 => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Target index for a one-step shift, rejecting moves off either end
pub fn step_target(current: i32, direction: Direction, max: i32) -> CoreResult<i32> {
    let target = current + direction.delta();
    if target < 0 {
        return Err(CoreError::InvalidOperation(
            "Cannot shift the first item further left".to_string(),
        ));
    }
    if target > max {
        return Err(CoreError::InvalidOperation(
            "Cannot shift the last item further right".to_string(),
        ));
    }
    Ok(target)
}

/// Target index for the drag-and-drop shift action
///
/// Wraps around: shifting past the end lands at the start and vice versa.
/// `max` is the container's highest index, so the modulus is the row count.
/// Any `direction` is accepted; the sum is taken in `i64` so it cannot overflow.
pub fn wrapping_target(current: i32, direction: i32, max: i32) -> i32 {
    let rows = i64::from(max) + 1;
    let target = (i64::from(current) + i64::from(direction)).rem_euclid(rows);
    // rem_euclid keeps the result in 0..=max, which fits in i32.
    target as i32
}

/// Rejects an absolute target outside `0..=max`
pub fn check_target(target: i32, max: i32) -> CoreResult<()> {
    if target < 0 || target > max {
        return Err(CoreError::InvalidOperation(format!(
            "Index {} is outside 0..={}",
            target, max
        )));
    }
    Ok(())
}

/// Siblings displaced when one row moves from `from` to `to` in the same container
///
/// Rows with index in `lower..=upper` move by `delta`; the moved row itself is
/// parked before this range is touched, so it is never matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiblingShift {
    pub lower: i32,
    pub upper: i32,
    pub delta: i32,
}

impl SiblingShift {
    /// `None` when the row stays where it is
    pub fn for_move(from: i32, to: i32) -> Option<Self> {
        if to > from {
            Some(SiblingShift {
                lower: from + 1,
                upper: to,
                delta: -1,
            })
        } else if to < from {
            Some(SiblingShift {
                lower: to,
                upper: from - 1,
                delta: 1,
            })
        } else {
            None
        }
    }

    pub fn contains(&self, index: i32) -> bool {
        index >= self.lower && index <= self.upper
    }
}

/// True when `indices` is exactly `0..n` in some order
pub fn is_dense(indices: &[i32]) -> bool {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(position, index)| *index == position as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const OFFSET: i32 = 100_000;

    /// In-memory rows: (id, container, index). Every helper asserts uniqueness
    /// per container after each statement, mirroring a statement-level check.
    type Rows = Vec<(u32, u32, i32)>;

    fn assert_unique(rows: &Rows) {
        let mut seen = HashSet::new();
        for (_, container, index) in rows {
            assert!(seen.insert((*container, *index)), "duplicate ({container}, {index})");
        }
    }

    fn container(n: i32) -> Rows {
        (0..n).map(|i| (i as u32, 0, i)).collect()
    }

    fn ids_in_order(rows: &Rows, c: u32) -> Vec<u32> {
        let mut in_c: Vec<_> = rows.iter().filter(|r| r.1 == c).collect();
        in_c.sort_by_key(|r| r.2);
        in_c.iter().map(|r| r.0).collect()
    }

    fn indices(rows: &Rows, c: u32) -> Vec<i32> {
        rows.iter().filter(|r| r.1 == c).map(|r| r.2).collect()
    }

    fn index_of(rows: &Rows, id: u32) -> i32 {
        rows.iter().find(|r| r.0 == id).unwrap().2
    }

    fn set(rows: &mut Rows, id: u32, index: i32) {
        rows.iter_mut().find(|r| r.0 == id).unwrap().2 = index;
        assert_unique(rows);
    }

    fn unpark(rows: &mut Rows, containers: &[u32]) {
        for row in rows.iter_mut() {
            if containers.contains(&row.1) && row.2 >= OFFSET {
                row.2 -= OFFSET;
            }
        }
        assert_unique(rows);
    }

    fn replay_shift(rows: &mut Rows, id: u32, direction: Direction) -> CoreResult<()> {
        let current = index_of(rows, id);
        let max = *indices(rows, 0).iter().max().unwrap();
        let target = step_target(current, direction, max)?;
        set(rows, id, target + OFFSET);
        let neighbour = rows.iter().find(|r| r.1 == 0 && r.2 == target).unwrap().0;
        set(rows, neighbour, current);
        set(rows, id, target);
        Ok(())
    }

    fn replay_move(rows: &mut Rows, id: u32, to: i32) {
        let from = index_of(rows, id);
        let Some(shift) = SiblingShift::for_move(from, to) else {
            return;
        };
        set(rows, id, to + OFFSET);
        for row in rows.iter_mut() {
            if row.1 == 0 && shift.contains(row.2) {
                row.2 += shift.delta + OFFSET;
            }
        }
        assert_unique(rows);
        unpark(rows, &[0]);
    }

    fn replay_cross(rows: &mut Rows, id: u32, to_container: u32, to: i32) {
        let (from_container, from) = {
            let row = rows.iter().find(|r| r.0 == id).unwrap();
            (row.1, row.2)
        };
        for row in rows.iter_mut() {
            if row.1 == from_container && row.2 > from {
                row.2 += OFFSET - 1;
            }
        }
        assert_unique(rows);
        for row in rows.iter_mut() {
            if row.1 == to_container && row.2 >= to {
                row.2 += OFFSET + 1;
            }
        }
        assert_unique(rows);
        {
            let row = rows.iter_mut().find(|r| r.0 == id).unwrap();
            row.1 = to_container;
            row.2 = to + OFFSET;
        }
        assert_unique(rows);
        unpark(rows, &[from_container, to_container]);
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Left.delta(), -1);
        assert_eq!(Direction::Right.delta(), 1);
        assert_eq!(Direction::from_delta(1), Some(Direction::Right));
        assert_eq!(Direction::from_delta(-1), Some(Direction::Left));
        assert_eq!(Direction::from_delta(2), None);
    }

    #[test]
    fn test_step_target_bounds() {
        assert!(matches!(
            step_target(0, Direction::Left, 3),
            Err(CoreError::InvalidOperation(_))
        ));
        assert!(matches!(
            step_target(3, Direction::Right, 3),
            Err(CoreError::InvalidOperation(_))
        ));
        assert_eq!(step_target(2, Direction::Right, 4).unwrap(), 3);
        assert_eq!(step_target(2, Direction::Left, 4).unwrap(), 1);
    }

    #[test]
    fn test_wrapping_target() {
        assert_eq!(wrapping_target(4, 1, 4), 0);
        assert_eq!(wrapping_target(0, -1, 4), 4);
        assert_eq!(wrapping_target(1, 2, 4), 3);
        assert_eq!(wrapping_target(0, 0, 0), 0);
        assert_eq!(wrapping_target(2, 7, 4), 4);
        assert_eq!(wrapping_target(2, -8, 4), 4);
    }

    #[test]
    fn test_wrapping_target_extreme_directions() {
        assert_eq!(wrapping_target(4, i32::MAX, 4), 1);
        assert_eq!(wrapping_target(0, i32::MIN, 4), 2);
        assert_eq!(wrapping_target(i32::MAX - 1, i32::MAX, i32::MAX - 1), i32::MAX - 1);
        for direction in [i32::MIN, -1, 1, i32::MAX] {
            let target = wrapping_target(3, direction, 9);
            assert!((0..=9).contains(&target));
        }
    }

    #[test]
    fn test_check_target() {
        assert!(check_target(0, 0).is_ok());
        assert!(check_target(4, 4).is_ok());
        assert!(check_target(5, 4).is_err());
        assert!(check_target(-1, 4).is_err());
    }

    #[test]
    fn test_sibling_shift_ranges() {
        assert_eq!(
            SiblingShift::for_move(1, 3),
            Some(SiblingShift { lower: 2, upper: 3, delta: -1 })
        );
        assert_eq!(
            SiblingShift::for_move(3, 0),
            Some(SiblingShift { lower: 0, upper: 2, delta: 1 })
        );
        assert_eq!(SiblingShift::for_move(2, 2), None);
    }

    #[test]
    fn test_is_dense() {
        assert!(is_dense(&[]));
        assert!(is_dense(&[2, 0, 1]));
        assert!(!is_dense(&[0, 2]));
        assert!(!is_dense(&[0, 0, 1]));
        assert!(!is_dense(&[1, 2, 3]));
    }

    #[test]
    fn test_shift_right_swaps_with_neighbour() {
        let mut rows = container(5);
        replay_shift(&mut rows, 2, Direction::Right).unwrap();
        assert_eq!(index_of(&rows, 3), 2);
        assert_eq!(index_of(&rows, 2), 3);
        assert!(is_dense(&indices(&rows, 0)));
    }

    #[test]
    fn test_shift_at_edges_leaves_indices_unchanged() {
        let mut rows = container(3);
        assert!(replay_shift(&mut rows, 0, Direction::Left).is_err());
        assert!(replay_shift(&mut rows, 2, Direction::Right).is_err());
        assert_eq!(ids_in_order(&rows, 0), vec![0, 1, 2]);
    }

    #[test]
    fn test_move_forward_and_back() {
        let mut rows = container(5);
        replay_move(&mut rows, 1, 3);
        assert_eq!(ids_in_order(&rows, 0), vec![0, 2, 3, 1, 4]);

        replay_move(&mut rows, 4, 0);
        assert_eq!(ids_in_order(&rows, 0), vec![4, 0, 2, 3, 1]);
        assert!(is_dense(&indices(&rows, 0)));
    }

    #[test]
    fn test_move_to_current_index_changes_nothing() {
        let mut rows = container(4);
        let before = rows.clone();
        replay_move(&mut rows, 2, 2);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_every_move_keeps_container_dense() {
        for n in 1..7 {
            for id in 0..n {
                for to in 0..n {
                    let mut rows = container(n);
                    replay_move(&mut rows, id as u32, to);
                    assert!(is_dense(&indices(&rows, 0)));
                    assert_eq!(index_of(&rows, id as u32), to);
                }
            }
        }
    }

    #[test]
    fn test_cross_container_move_conserves_rows() {
        // container 0: ids 0..4, container 1: ids 10..13
        let mut rows = container(4);
        rows.extend((0..3).map(|i| (10 + i as u32, 1, i)));

        replay_cross(&mut rows, 1, 1, 1);

        assert_eq!(ids_in_order(&rows, 0), vec![0, 2, 3]);
        assert_eq!(ids_in_order(&rows, 1), vec![10, 1, 11, 12]);
        assert!(is_dense(&indices(&rows, 0)));
        assert!(is_dense(&indices(&rows, 1)));
    }

    #[test]
    fn test_cross_container_append_to_empty() {
        let mut rows = container(2);
        replay_cross(&mut rows, 0, 7, 0);
        assert_eq!(ids_in_order(&rows, 0), vec![1]);
        assert_eq!(ids_in_order(&rows, 7), vec![0]);
        assert_eq!(index_of(&rows, 1), 0);
    }
}
