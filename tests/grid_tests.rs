//! Grid tests - placement, removal and column cascades

use std::collections::HashSet;

use tile_match::core::rng::{CycleTypes, SimpleRng};
use tile_match::core::{Error, Grid};
use tile_match::types::{CellId, CellType};

use CellType::{BlueDiamond as B, GreenHeart as G, RedStar as R, YellowCircle as Y};

/// Every slot holds a cell whose coordinates agree with its slot, and ids are unique.
fn assert_full_and_consistent(grid: &Grid) {
    let mut ids = HashSet::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let cell = grid
                .cell_at(x, y)
                .unwrap()
                .unwrap_or_else(|| panic!("slot ({}, {}) is empty", x, y));
            assert_eq!((cell.x, cell.y), (x, y));
            assert!(ids.insert(cell.id), "duplicate id {}", cell.id);
        }
    }
    assert_eq!(grid.len(), grid.width() as usize * grid.height() as usize);
}

#[test]
fn test_new_grid_is_full() {
    let grid = Grid::seeded(8, 10, 42).unwrap();
    assert_eq!(grid.width(), 8);
    assert_eq!(grid.height(), 10);
    assert_full_and_consistent(&grid);
}

#[test]
fn test_same_seed_same_board() {
    let a = Grid::seeded(6, 6, 7).unwrap();
    let b = Grid::seeded(6, 6, 7).unwrap();
    assert_eq!(a.snapshot(), b.snapshot());

    let c = Grid::seeded(6, 6, 8).unwrap();
    assert_ne!(a.snapshot().rows(), c.snapshot().rows());
}

#[test]
fn test_zero_dimensions_rejected() {
    assert_eq!(
        Grid::seeded(0, 5, 1).unwrap_err(),
        Error::InvalidDimensions {
            width: 0,
            height: 5
        }
    );
    assert!(Grid::seeded(5, 0, 1).is_err());
    assert!(Grid::from_layout::<[CellType; 0]>(&[], CycleTypes::constant(R)).is_err());
}

#[test]
fn test_cell_at_out_of_bounds() {
    let grid = Grid::seeded(3, 4, 1).unwrap();
    assert!(grid.cell_at(2, 3).unwrap().is_some());
    assert_eq!(
        grid.cell_at(3, 0).unwrap_err(),
        Error::OutOfBounds {
            x: 3,
            y: 0,
            width: 3,
            height: 4
        }
    );
    assert!(grid.cell_at(0, 4).is_err());
}

#[test]
fn test_single_column_cascade_keeps_order() {
    // Column top to bottom: R, B, G, Y. Removing B lets R fall one row.
    let mut grid = Grid::from_layout(&[[R], [B], [G], [Y]], CycleTypes::constant(Y)).unwrap();
    let r = grid.cell_at(0, 0).unwrap().unwrap().id;
    let b = grid.cell_at(0, 1).unwrap().unwrap().id;
    let g = grid.cell_at(0, 2).unwrap().unwrap().id;

    let report = grid.remove_and_cascade(&[b]).unwrap();

    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.removed[0].id, b);
    assert_eq!(report.moved.len(), 1);
    assert_eq!(report.moved[0].id, r);
    assert_eq!((report.moved[0].from_y, report.moved[0].to_y), (0, 1));
    assert_eq!(report.spawned.len(), 1);
    assert_eq!(report.spawned[0].y, 0);

    let kinds: Vec<CellType> = grid
        .column(0)
        .unwrap()
        .map(|slot| slot.unwrap().kind)
        .collect();
    assert_eq!(kinds, vec![Y, R, G, Y]);
    assert_eq!(grid.cell_at(0, 2).unwrap().unwrap().id, g);
    assert_full_and_consistent(&grid);
}

#[test]
fn test_three_in_one_column() {
    let mut grid = Grid::from_layout(
        &[[G, R], [R, R], [R, B], [R, Y], [B, G]],
        CycleTypes::new(vec![Y, B, G]),
    )
    .unwrap();
    let ids: Vec<CellId> = (1..4)
        .map(|y| grid.cell_at(0, y).unwrap().unwrap().id)
        .collect();
    let top = grid.cell_at(0, 0).unwrap().unwrap().id;
    let right_before = grid.snapshot().rows().iter().map(|row| row[1]).collect::<Vec<_>>();

    let report = grid.remove_and_cascade(&ids).unwrap();

    assert_eq!(report.columns(), vec![0]);
    // G drops from the top row to just above the bottom B.
    let top_cell = grid.find(top).unwrap();
    assert_eq!((top_cell.x, top_cell.y), (0, 3));
    // Refill is top-down from the generator script.
    let column: Vec<CellType> = grid.column(0).unwrap().map(|s| s.unwrap().kind).collect();
    assert_eq!(column, vec![Y, B, G, G, B]);

    let right_after = grid.snapshot().rows().iter().map(|row| row[1]).collect::<Vec<_>>();
    assert_eq!(right_before, right_after);
    assert_full_and_consistent(&grid);
}

#[test]
fn test_unknown_id_changes_nothing() {
    let mut grid = Grid::seeded(4, 4, 3).unwrap();
    let before = grid.snapshot();
    let real = grid.cell_at(1, 1).unwrap().unwrap().id;

    let err = grid
        .remove_and_cascade(&[real, CellId(9_999)])
        .unwrap_err();
    assert_eq!(err, Error::UnknownCell(CellId(9_999)));
    assert_eq!(grid.snapshot(), before);
}

#[test]
fn test_removed_ids_never_return() {
    let mut grid = Grid::seeded(5, 5, 11).unwrap();
    let mut rng = SimpleRng::new(99);
    let mut gone = HashSet::new();

    for _ in 0..200 {
        let ids: Vec<CellId> = (0..3)
            .map(|_| {
                let x = rng.next_range(5) as u16;
                let y = rng.next_range(5) as u16;
                grid.cell_at(x, y).unwrap().unwrap().id
            })
            .collect();
        let report = grid.remove_and_cascade(&ids).unwrap();
        for cell in &report.removed {
            gone.insert(cell.id);
        }
        for cell in &report.spawned {
            assert!(!gone.contains(&cell.id), "id {} was reused", cell.id);
        }
        assert!(grid.iter().all(|cell| !gone.contains(&cell.id)));
        assert_full_and_consistent(&grid);
    }
}

#[test]
fn test_cascade_is_per_column() {
    let mut grid = Grid::seeded(6, 7, 5).unwrap();
    let mut rng = SimpleRng::new(1234);

    for _ in 0..100 {
        let before = grid.snapshot();
        let ids: Vec<CellId> = (0..3)
            .map(|_| {
                let x = rng.next_range(6) as u16;
                let y = rng.next_range(7) as u16;
                grid.cell_at(x, y).unwrap().unwrap().id
            })
            .collect();
        let report = grid.remove_and_cascade(&ids).unwrap();
        let touched = report.columns();

        for x in 0..6u16 {
            let removed_here = report.removed.iter().filter(|c| c.x == x).count();
            let spawned_here: Vec<u16> = report
                .spawned
                .iter()
                .filter(|c| c.x == x)
                .map(|c| c.y)
                .collect();
            assert_eq!(spawned_here.len(), removed_here);
            assert_eq!(spawned_here, (0..removed_here as u16).collect::<Vec<_>>());

            if !touched.contains(&x) {
                for y in 0..7 {
                    assert_eq!(before.cell_at(x, y), grid.cell_at(x, y).unwrap());
                }
            }
        }

        // Survivors never move up and keep their relative order.
        for mv in &report.moved {
            assert!(mv.to_y > mv.from_y);
        }
    }
}

#[test]
fn test_resize_replaces_every_cell() {
    let mut grid = Grid::seeded(8, 10, 1).unwrap();
    let old: HashSet<CellId> = grid.iter().map(|c| c.id).collect();

    grid.rebuild(10, 8).unwrap();
    assert_eq!((grid.width(), grid.height()), (10, 8));
    assert_full_and_consistent(&grid);
    assert!(grid.iter().all(|c| !old.contains(&c.id)));

    grid.resize(2, 2, CycleTypes::constant(B)).unwrap();
    assert!(grid.iter().all(|c| c.kind == B));
}

#[test]
fn test_resize_invalid_keeps_grid() {
    let mut grid = Grid::seeded(3, 3, 1).unwrap();
    let before = grid.snapshot();
    assert!(grid.rebuild(0, 3).is_err());
    assert!(grid.resize(3, 0, CycleTypes::constant(R)).is_err());
    assert_eq!(grid.snapshot(), before);
}

#[test]
fn test_closure_generator() {
    let mut next = 0usize;
    let grid = Grid::new(2, 2, move || {
        next += 1;
        CellType::from_index(next % 2).unwrap()
    })
    .unwrap();
    let kinds: Vec<CellType> = grid.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![B, R, B, R]);
}
