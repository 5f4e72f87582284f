use crate::state::{LevelId, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }
}

/// Canonical terrain classes for level squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainKind {
    Floor,
    Wall,
    Door,
    Bed,
    Stairs,
    Water,
    Void,
}

impl TerrainKind {
    pub fn is_passable(self) -> bool {
        matches!(
            self,
            TerrainKind::Floor | TerrainKind::Door | TerrainKind::Bed | TerrainKind::Stairs
        )
    }

    pub fn blocks_sight(self) -> bool {
        matches!(self, TerrainKind::Wall | TerrainKind::Door | TerrainKind::Void)
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        Some(match glyph {
            '.' => TerrainKind::Floor,
            '#' => TerrainKind::Wall,
            '+' => TerrainKind::Door,
            'b' => TerrainKind::Bed,
            '>' | '<' => TerrainKind::Stairs,
            '~' => TerrainKind::Water,
            ' ' => TerrainKind::Void,
            _ => return None,
        })
    }
}

/// What happens when a creature applies the square it stands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SquareApplyType {
    Sleep,
    Stairs { to: LevelId, destination: Position },
}

/// Read-only view of a single square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SquareView {
    pub terrain: TerrainKind,
    pub apply_type: Option<SquareApplyType>,
    /// Doors and similar squares that can be locked.
    pub lockable: bool,
    pub destructible: bool,
}

impl SquareView {
    pub fn new(terrain: TerrainKind) -> Self {
        let door = matches!(terrain, TerrainKind::Door);
        Self {
            terrain,
            apply_type: matches!(terrain, TerrainKind::Bed).then_some(SquareApplyType::Sleep),
            lockable: door,
            destructible: door,
        }
    }

    pub fn is_passable(&self) -> bool {
        self.terrain.is_passable()
    }

    pub fn is_bed(&self) -> bool {
        matches!(self.apply_type, Some(SquareApplyType::Sleep))
    }
}

/// Error produced while parsing a level layout.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapParseError {
    #[error("level layout is empty")]
    Empty,
    #[error("row {row} has width {width}, expected {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },
    #[error("unknown glyph '{glyph}' at {position}")]
    UnknownGlyph { glyph: char, position: Position },
}

/// Terrain layout of one level.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelMap {
    dimensions: MapDimensions,
    squares: Vec<SquareView>,
}

impl LevelMap {
    /// An open floor of the given size.
    pub fn open(dimensions: MapDimensions) -> Self {
        let count = dimensions.width as usize * dimensions.height as usize;
        Self {
            dimensions,
            squares: vec![SquareView::new(TerrainKind::Floor); count],
        }
    }

    /// Parses a glyph layout (`.` floor, `#` wall, `+` door, `b` bed, `>` stairs).
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapParseError> {
        let expected = rows.first().ok_or(MapParseError::Empty)?.as_ref().chars().count();
        if expected == 0 {
            return Err(MapParseError::Empty);
        }

        let mut squares = Vec::with_capacity(expected * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let width = row.chars().count();
            if width != expected {
                return Err(MapParseError::RaggedRow {
                    row: y,
                    width,
                    expected,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let terrain =
                    TerrainKind::from_glyph(glyph).ok_or(MapParseError::UnknownGlyph {
                        glyph,
                        position: Position::new(x as i32, y as i32),
                    })?;
                squares.push(SquareView::new(terrain));
            }
        }

        Ok(Self {
            dimensions: MapDimensions::new(expected as u32, rows.len() as u32),
            squares,
        })
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    pub fn contains(&self, position: Position) -> bool {
        self.dimensions.contains(position)
    }

    pub fn square(&self, position: Position) -> Option<SquareView> {
        self.dimensions
            .index(position)
            .map(|index| self.squares[index])
    }

    pub fn set_square(&mut self, position: Position, square: SquareView) -> bool {
        match self.dimensions.index(position) {
            Some(index) => {
                self.squares[index] = square;
                true
            }
            None => false,
        }
    }

    /// Links a stairs square to its destination.
    pub fn link_stairs(&mut self, position: Position, to: LevelId, destination: Position) -> bool {
        let Some(mut square) = self.square(position) else {
            return false;
        };
        square.terrain = TerrainKind::Stairs;
        square.apply_type = Some(SquareApplyType::Stairs { to, destination });
        self.set_square(position, square)
    }

    /// Straight-line visibility between two squares (Bresenham walk).
    pub fn line_of_sight(&self, from: Position, to: Position) -> bool {
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = (to.x - from.x).signum();
        let sy = (to.y - from.y).signum();
        let mut err = dx + dy;
        let mut current = from;

        while current != to {
            if current != from
                && self
                    .square(current)
                    .is_none_or(|square| square.terrain.blocks_sight())
            {
                return false;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                current.x += sx;
            }
            if doubled <= dx {
                err += dx;
                current.y += sy;
            }
        }
        true
    }
}
