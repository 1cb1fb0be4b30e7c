//! Three-in-a-row detection on a single 3x3 grid.

use crate::types::{Cell, Grid, Mark};

/// The eight winning lines, as row-major indices.
const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the mark owning a full row, column or diagonal, if any.
///
/// Works the same for a small board and for the meta-board.
pub fn check_line_winner(grid: &Grid) -> Option<Mark> {
    let cells = grid.cells();
    LINES.iter().find_map(|&[a, b, c]| match cells[a] {
        Cell::Marked(mark) if cells[b] == cells[a] && cells[c] == cells[a] => Some(mark),
        _ => None,
    })
}

/// Lists every mark that owns at least one line. More than one entry means
/// the grid could not have been reached by legal play.
pub fn line_owners(grid: &Grid) -> Vec<Mark> {
    let cells = grid.cells();
    let mut owners = Vec::new();
    for [a, b, c] in LINES {
        if let Cell::Marked(mark) = cells[a]
            && cells[b] == cells[a]
            && cells[c] == cells[a]
            && !owners.contains(&mark)
        {
            owners.push(mark);
        }
    }
    owners
}

/// Builds a grid from a 3-line picture such as `"XX.\n.O.\n..."`.
#[cfg(test)]
pub(crate) fn grid_from(picture: &str) -> Grid {
    use crate::coord::Coord;

    let mut grid = Grid::new();
    let symbols = picture.chars().filter(|c| !c.is_whitespace());
    for (coord, symbol) in Coord::ALL.into_iter().zip(symbols) {
        match symbol {
            'X' => grid.set(coord, Cell::Marked(Mark::X)),
            'O' => grid.set(coord, Cell::Marked(Mark::O)),
            _ => {}
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_winner_empty_grid() {
        assert_eq!(check_line_winner(&Grid::new()), None);
    }

    #[test]
    fn test_winner_top_row() {
        assert_eq!(check_line_winner(&grid_from("XXX ... ...")), Some(Mark::X));
    }

    #[test]
    fn test_winner_column() {
        assert_eq!(check_line_winner(&grid_from(".O. .O. .O.")), Some(Mark::O));
    }

    #[test]
    fn test_winner_anti_diagonal() {
        assert_eq!(check_line_winner(&grid_from("..O .O. O..")), Some(Mark::O));
    }

    #[test]
    fn test_no_winner_incomplete() {
        assert_eq!(check_line_winner(&grid_from("XX. OO. ...")), None);
    }

    #[test]
    fn test_mixed_line_is_not_a_win() {
        assert_eq!(check_line_winner(&grid_from("XOX OXO OXO")), None);
    }

    #[test]
    fn test_line_owners_reports_both_marks() {
        assert_eq!(line_owners(&grid_from("XXX OOO ...")), vec![Mark::X, Mark::O]);
        assert_eq!(line_owners(&grid_from("XXX X.. X..")), vec![Mark::X]);
    }
}
