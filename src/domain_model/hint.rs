use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// How many cells a hint lookup reaches from the origin.
pub const HINT_REACH: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub id: i64,
    pub pos_x: i32,
    pub pos_y: i32,
    pub hint_en: String,
    pub hint_fr: String,
    pub hint_es: String,
    pub hint_de: String,
    pub hint_pt: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewHint {
    pub pos_x: i32,
    pub pos_y: i32,
    pub hint_en: String,
    pub hint_fr: String,
    pub hint_es: String,
    pub hint_de: String,
    pub hint_pt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Inclusive rectangle of cells to search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintWindow {
    pub x: RangeInclusive<i32>,
    pub y: RangeInclusive<i32>,
}

impl HintWindow {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x.contains(&x) && self.y.contains(&y)
    }
}

impl Direction {
    /// Cells strictly beyond the origin, up to `reach` away, on the same row or column.
    /// `up` means decreasing y. Clamped at the edges of the `i32` grid.
    pub fn window(self, x: i32, y: i32, reach: i32) -> HintWindow {
        match self {
            Direction::Right => HintWindow {
                x: ahead(x, reach),
                y: y..=y,
            },
            Direction::Left => HintWindow {
                x: behind(x, reach),
                y: y..=y,
            },
            Direction::Up => HintWindow {
                x: x..=x,
                y: behind(y, reach),
            },
            Direction::Down => HintWindow {
                x: x..=x,
                y: ahead(y, reach),
            },
        }
    }
}

#[allow(clippy::reversed_empty_ranges)]
const NOWHERE: RangeInclusive<i32> = 1..=0;

fn ahead(origin: i32, reach: i32) -> RangeInclusive<i32> {
    match origin.checked_add(1) {
        Some(start) => start..=origin.saturating_add(reach),
        None => NOWHERE,
    }
}

fn behind(origin: i32, reach: i32) -> RangeInclusive<i32> {
    match origin.checked_sub(1) {
        Some(end) => origin.saturating_sub(reach)..=end,
        None => NOWHERE,
    }
}

/// Manhattan distance, wide enough for any two `i32` cells.
pub fn distance(a: (i32, i32), b: (i32, i32)) -> u64 {
    u64::from(a.0.abs_diff(b.0)) + u64::from(a.1.abs_diff(b.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_excludes_origin_and_stays_on_axis() {
        let w = Direction::Right.window(3, 7, HINT_REACH);
        assert!(!w.contains(3, 7));
        assert!(w.contains(4, 7));
        assert!(w.contains(13, 7));
        assert!(!w.contains(14, 7));
        assert!(!w.contains(5, 8));

        let w = Direction::Up.window(0, 0, HINT_REACH);
        assert!(w.contains(0, -10));
        assert!(!w.contains(0, 1));
    }

    #[test]
    fn window_clamps_at_the_grid_edges() {
        let w = Direction::Right.window(i32::MAX, 0, HINT_REACH);
        assert!(!w.contains(i32::MAX, 0));
        assert!(w.x.is_empty());

        let w = Direction::Right.window(i32::MAX - 3, 0, HINT_REACH);
        assert_eq!(w.x, i32::MAX - 2..=i32::MAX);

        let w = Direction::Up.window(0, i32::MIN, HINT_REACH);
        assert!(w.y.is_empty());

        let w = Direction::Left.window(i32::MIN + 1, 5, HINT_REACH);
        assert_eq!(w.x, i32::MIN..=i32::MIN);

        assert_eq!(distance((i32::MIN, i32::MIN), (i32::MAX, i32::MAX)), 2 * u64::from(u32::MAX));
    }
}
