//! Run-length compression of grid paths into turning points.

use crate::models::Position;

/// Collapses a cell-by-cell path into its turning points.
///
/// Keeps the first and last positions and every position where the
/// direction of travel changes; consecutive duplicates are dropped.
/// Applying it to an already collapsed path returns the same path.
///
/// # Examples
///
/// ```
/// use u_picking::assembly::collapse_directions;
/// use u_picking::models::Position;
///
/// let path: Vec<Position> = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]
///     .into_iter()
///     .map(Position::from)
///     .collect();
/// let collapsed = collapse_directions(&path);
/// assert_eq!(collapsed, vec![Position::new(0, 0), Position::new(2, 0), Position::new(2, 2)]);
/// assert_eq!(collapse_directions(&collapsed), collapsed);
/// ```
pub fn collapse_directions(positions: &[Position]) -> Vec<Position> {
    collapse_directions_keeping(positions, |_| false)
}

/// Like [`collapse_directions`], but never removes a waypoint for which
/// `keep` returns `true`.
pub fn collapse_directions_keeping<F>(positions: &[Position], keep: F) -> Vec<Position>
where
    F: Fn(Position) -> bool,
{
    let mut out: Vec<Position> = Vec::with_capacity(positions.len());

    for &p in positions {
        if out.last() == Some(&p) {
            continue;
        }
        if let [.., a, b] = out[..] {
            let heading = a.direction_to(b);
            if heading.is_some() && heading == b.direction_to(p) && !keep(b) {
                if let Some(last) = out.last_mut() {
                    *last = p;
                }
                continue;
            }
        }
        out.push(p);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(points: &[(i32, i32)]) -> Vec<Position> {
        points.iter().copied().map(Position::from).collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert!(collapse_directions(&[]).is_empty());
        let p = path(&[(3, 3)]);
        assert_eq!(collapse_directions(&p), p);
    }

    #[test]
    fn test_straight_line() {
        let p = path(&[(0, 0), (0, 1), (0, 2), (0, 3)]);
        assert_eq!(collapse_directions(&p), path(&[(0, 0), (0, 3)]));
    }

    #[test]
    fn test_keeps_turns() {
        let p = path(&[(0, 0), (1, 0), (1, 1), (2, 1), (3, 1)]);
        assert_eq!(
            collapse_directions(&p),
            path(&[(0, 0), (1, 0), (1, 1), (3, 1)])
        );
    }

    #[test]
    fn test_drops_duplicates() {
        let p = path(&[(0, 0), (0, 0), (1, 0), (1, 0), (2, 0)]);
        assert_eq!(collapse_directions(&p), path(&[(0, 0), (2, 0)]));
    }

    #[test]
    fn test_reversal_is_a_turn() {
        let p = path(&[(0, 0), (2, 0), (1, 0)]);
        assert_eq!(collapse_directions(&p), p);
    }

    #[test]
    fn test_keep_predicate() {
        let p = path(&[(0, 0), (1, 0), (2, 0), (3, 0)]);
        let kept = collapse_directions_keeping(&p, |q| q == Position::new(2, 0));
        assert_eq!(kept, path(&[(0, 0), (2, 0), (3, 0)]));
    }

    #[test]
    fn test_idempotent() {
        let p = path(&[(0, 0), (0, 1), (1, 1), (2, 1), (2, 0), (2, 0), (3, 0)]);
        let once = collapse_directions(&p);
        assert_eq!(collapse_directions(&once), once);
    }
}
