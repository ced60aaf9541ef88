//! Cursor movement for keyboard navigation.

use crossterm::event::KeyCode;

/// Columns for a grid of `tiles`: the smallest square that fits them.
pub fn grid_columns(tiles: usize) -> usize {
    let mut columns = 1;
    while columns * columns < tiles {
        columns += 1;
    }
    columns
}

/// Moves the cursor over a `tiles`-long board laid out in `columns` columns.
///
/// Stops at the edges; keys other than the arrows leave it in place.
pub fn move_cursor(cursor: usize, tiles: usize, columns: usize, key: KeyCode) -> usize {
    if tiles == 0 || columns == 0 {
        return 0;
    }
    let column = cursor % columns;
    let target = match key {
        KeyCode::Left if column > 0 => cursor - 1,
        KeyCode::Right if column + 1 < columns => cursor + 1,
        KeyCode::Up if cursor >= columns => cursor - columns,
        KeyCode::Down => cursor + columns,
        _ => cursor,
    };
    if target < tiles { target } else { cursor }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_columns() {
        assert_eq!(grid_columns(2), 2);
        assert_eq!(grid_columns(4), 2);
        assert_eq!(grid_columns(12), 4);
        assert_eq!(grid_columns(16), 4);
    }

    #[test]
    fn test_cursor_stops_at_edges() {
        assert_eq!(move_cursor(0, 16, 4, KeyCode::Left), 0);
        assert_eq!(move_cursor(3, 16, 4, KeyCode::Right), 3);
        assert_eq!(move_cursor(1, 16, 4, KeyCode::Up), 1);
        assert_eq!(move_cursor(14, 16, 4, KeyCode::Down), 14);
    }

    #[test]
    fn test_cursor_moves_within_grid() {
        assert_eq!(move_cursor(5, 16, 4, KeyCode::Left), 4);
        assert_eq!(move_cursor(5, 16, 4, KeyCode::Right), 6);
        assert_eq!(move_cursor(5, 16, 4, KeyCode::Up), 1);
        assert_eq!(move_cursor(5, 16, 4, KeyCode::Down), 9);
    }

    #[test]
    fn test_ragged_last_row() {
        // Six tiles in three columns; nothing below index 4.
        assert_eq!(move_cursor(4, 6, 3, KeyCode::Down), 4);
        assert_eq!(move_cursor(2, 6, 3, KeyCode::Down), 5);
    }
}
