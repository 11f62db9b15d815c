//! Tile grid and path construction
//!
//! The level editor paints tiles onto a grid of `CELL_SIZE` cells. Every
//! edit rebuilds the full list of routes from the spawn tile to the end
//! tile by depth-first enumeration over Path tiles.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::entity::Body;
use crate::consts::CELL_SIZE;
use crate::cell_center;

/// Tile classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Decoration; variant 0 ("brick") is the only buildable ground
    Aesthetic,
    Spawn,
    End,
    Path,
}

/// Tile sheet variant that accepts towers
pub const BUILDABLE_VARIANT: u8 = 0;

/// A painted grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub cell: IVec2,
    /// Index into the tile sheet (also the palette slot)
    pub variant: u8,
}

impl Tile {
    pub fn new(kind: TileKind, cell: IVec2, variant: u8) -> Self {
        Self {
            kind,
            cell,
            variant,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        cell_center(self.cell)
    }

    /// Collision rectangle covering the whole cell
    pub fn body(&self) -> Body {
        Body::rectangle(self.center(), CELL_SIZE, CELL_SIZE)
    }

    pub fn is_buildable(&self) -> bool {
        self.kind == TileKind::Aesthetic && self.variant == BUILDABLE_VARIANT
    }
}

/// Columns and rows of the tile sheet
pub const PALETTE_COLUMNS: usize = 4;
pub const PALETTE_ROWS: usize = 4;

/// One slot of the editor palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileOption {
    /// `None` for sheet cells that cannot be painted
    pub kind: Option<TileKind>,
    pub variant: u8,
}

/// Editor tile selection, cycled with the scroll wheel
#[derive(Debug, Clone)]
pub struct TilePalette {
    options: Vec<TileOption>,
    selected: usize,
}

impl Default for TilePalette {
    fn default() -> Self {
        Self::new()
    }
}

impl TilePalette {
    /// Row 0 is decoration, row 1 holds spawn, end and path
    pub fn new() -> Self {
        let options = (0..PALETTE_ROWS * PALETTE_COLUMNS)
            .map(|index| {
                let (row, col) = (index / PALETTE_COLUMNS, index % PALETTE_COLUMNS);
                let kind = match (row, col) {
                    (0, _) => Some(TileKind::Aesthetic),
                    (1, 0) => Some(TileKind::Spawn),
                    (1, 1) => Some(TileKind::End),
                    (1, 2) => Some(TileKind::Path),
                    _ => None,
                };
                TileOption {
                    kind,
                    variant: index as u8,
                }
            })
            .collect();
        Self {
            options,
            selected: 0,
        }
    }

    pub fn selected(&self) -> TileOption {
        self.options[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Look up a slot by sheet index
    pub fn option(&self, index: usize) -> Option<TileOption> {
        self.options.get(index).copied()
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.options.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.options.len() - 1);
    }
}

/// Painted tiles, one list per kind in insertion order
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    aesthetic: Vec<Tile>,
    spawn: Vec<Tile>,
    end: Vec<Tile>,
    path: Vec<Tile>,
}

impl TileGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tiles(&self, kind: TileKind) -> &[Tile] {
        match kind {
            TileKind::Aesthetic => &self.aesthetic,
            TileKind::Spawn => &self.spawn,
            TileKind::End => &self.end,
            TileKind::Path => &self.path,
        }
    }

    fn tiles_mut(&mut self, kind: TileKind) -> &mut Vec<Tile> {
        match kind {
            TileKind::Aesthetic => &mut self.aesthetic,
            TileKind::Spawn => &mut self.spawn,
            TileKind::End => &mut self.end,
            TileKind::Path => &mut self.path,
        }
    }

    /// Every tile, decoration first
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.aesthetic
            .iter()
            .chain(&self.spawn)
            .chain(&self.end)
            .chain(&self.path)
    }

    pub fn spawn(&self) -> Option<&Tile> {
        self.spawn.first()
    }

    pub fn end(&self) -> Option<&Tile> {
        self.end.first()
    }

    /// Paint a tile. Spawn and End are singletons; a tile of the same
    /// kind already in the cell is replaced.
    pub fn place(&mut self, tile: Tile) {
        let list = self.tiles_mut(tile.kind);
        if matches!(tile.kind, TileKind::Spawn | TileKind::End) {
            list.clear();
        }
        if let Some(index) = list.iter().position(|t| t.cell == tile.cell) {
            list.swap_remove(index);
        }
        list.push(tile);
    }

    /// Erase the tile of `kind` in `cell`. Returns whether one was found.
    pub fn remove(&mut self, kind: TileKind, cell: IVec2) -> bool {
        let list = self.tiles_mut(kind);
        match list.iter().position(|t| t.cell == cell) {
            Some(index) => {
                list.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.aesthetic.clear();
        self.spawn.clear();
        self.end.clear();
        self.path.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Flatten into rows of layout codes, indexed `[y][x]`.
    ///
    /// A cell holding several kinds keeps the highest of
    /// End > Spawn > Path > Aesthetic. Cells with negative coordinates
    /// are left out.
    pub fn to_layout(&self) -> Vec<Vec<i32>> {
        let cells = self.iter().map(|t| t.cell).filter(|c| c.x >= 0 && c.y >= 0);
        let Some(extent) = cells.reduce(|a, b| a.max(b)) else {
            return Vec::new();
        };

        let mut layout = vec![vec![LAYOUT_EMPTY; extent.x as usize + 1]; extent.y as usize + 1];
        let ranked = self
            .aesthetic
            .iter()
            .chain(&self.path)
            .chain(&self.spawn)
            .chain(&self.end);
        for tile in ranked.filter(|t| t.cell.x >= 0 && t.cell.y >= 0) {
            layout[tile.cell.y as usize][tile.cell.x as usize] = layout_code(tile.kind);
        }
        layout
    }

    /// Rebuild a grid from layout codes. Unknown codes are skipped.
    pub fn from_layout(layout: &[Vec<i32>]) -> Self {
        let mut grid = Self::new();
        for (y, row) in layout.iter().enumerate() {
            for (x, &code) in row.iter().enumerate() {
                let Some((kind, variant)) = kind_for_code(code) else {
                    continue;
                };
                grid.place(Tile::new(kind, IVec2::new(x as i32, y as i32), variant));
            }
        }
        grid
    }
}

/// Layout code of an unpainted cell
pub const LAYOUT_EMPTY: i32 = -1;

fn layout_code(kind: TileKind) -> i32 {
    match kind {
        TileKind::Aesthetic => 0,
        TileKind::Spawn => 1,
        TileKind::End => 2,
        TileKind::Path => 3,
    }
}

/// Tile kind and palette variant for a layout code
fn kind_for_code(code: i32) -> Option<(TileKind, u8)> {
    match code {
        0 => Some((TileKind::Aesthetic, BUILDABLE_VARIANT)),
        1 => Some((TileKind::Spawn, 4)),
        2 => Some((TileKind::End, 5)),
        3 => Some((TileKind::Path, 6)),
        _ => None,
    }
}

/// One step of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathNode {
    pub current: IVec2,
    /// Cell of the following node, `None` on the last node
    pub next: Option<IVec2>,
}

/// An ordered route from the spawn cell to the end cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    nodes: Vec<PathNode>,
}

impl Path {
    fn from_cells(cells: &[IVec2]) -> Self {
        let nodes = cells
            .iter()
            .enumerate()
            .map(|(i, &current)| PathNode {
                current,
                next: cells.get(i + 1).copied(),
            })
            .collect();
        Self { nodes }
    }

    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.nodes.iter().map(|n| n.current)
    }

    /// Node whose cell center is nearest to `pos`, with its distance.
    /// The first node at the minimal distance wins.
    pub fn closest_node(&self, pos: Vec2) -> Option<(&PathNode, f32)> {
        let mut best: Option<(&PathNode, f32)> = None;
        for node in &self.nodes {
            let distance = (cell_center(node.current) - pos).length();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((node, distance));
            }
        }
        best
    }
}

#[inline]
fn is_orthogonal_neighbor(a: IVec2, b: IVec2) -> bool {
    let d = (a - b).abs();
    d.x + d.y == 1
}

/// Depth-first route enumeration over a single shared cell stack
struct PathSearch<'a> {
    path_tiles: &'a [Tile],
    end: IVec2,
    stack: Vec<IVec2>,
    found: Vec<Path>,
}

impl PathSearch<'_> {
    fn visit(&mut self) {
        let Some(&current) = self.stack.last() else {
            return;
        };

        // An adjacent end tile always terminates the branch, no detours
        if is_orthogonal_neighbor(current, self.end) {
            self.stack.push(self.end);
            self.found.push(Path::from_cells(&self.stack));
            self.stack.pop();
            return;
        }

        let path_tiles = self.path_tiles;
        for tile in path_tiles {
            if !is_orthogonal_neighbor(current, tile.cell) || self.stack.contains(&tile.cell) {
                continue;
            }

            self.stack.push(tile.cell);
            if tile.cell == self.end {
                self.found.push(Path::from_cells(&self.stack));
            } else {
                self.visit();
            }
            self.stack.pop();
        }
    }
}

/// Enumerate every simple route from the spawn tile to the end tile.
///
/// Returns no paths when either endpoint is missing. Path tiles are tried
/// in grid storage order, which fixes the order of the result.
pub fn construct_paths(grid: &TileGrid) -> Vec<Path> {
    let (Some(spawn), Some(end)) = (grid.spawn(), grid.end()) else {
        return Vec::new();
    };

    let mut search = PathSearch {
        path_tiles: grid.tiles(TileKind::Path),
        end: end.cell,
        stack: vec![spawn.cell],
        found: Vec::new(),
    };
    search.visit();
    search.found
}
