use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Unique identifier for any creature tracked in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved identifier for the keeper (the player-controlled villain).
    pub const PLAYER: Self = Self(0);

    /// Returns true if this entity represents the player.
    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a single item instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Identifier of a dungeon level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelId(pub u32);

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level#{}", self.0)
    }
}

/// Identifier of a faction (a village collective or the villain's collective).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactionId(pub u32);

/// Identifier of a named rectangular area on a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationId(pub u32);

/// Tribe membership decides hostility between creatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TribeId(pub u16);

impl TribeId {
    /// Vermin. Never counted as an enemy; pest-hunting behaviours go after them.
    pub const PEST: Self = Self(0);

    pub const fn is_pest(self) -> bool {
        self.0 == Self::PEST.0
    }
}

/// Discrete grid position (or direction vector) in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The eight unit directions, clockwise from north.
    pub const DIRECTIONS8: [Position; 8] = [
        Position::new(0, -1),
        Position::new(1, -1),
        Position::new(1, 0),
        Position::new(1, 1),
        Position::new(0, 1),
        Position::new(-1, 1),
        Position::new(-1, 0),
        Position::new(-1, -1),
    ];

    /// Chebyshev length (king moves).
    pub fn length8(self) -> i32 {
        self.x.abs().max(self.y.abs())
    }

    /// Manhattan length.
    pub fn length4(self) -> i32 {
        self.x.abs() + self.y.abs()
    }

    /// Euclidean length.
    pub fn length_d(self) -> f64 {
        f64::from(self.x).hypot(f64::from(self.y))
    }

    pub fn dist8(self, other: Position) -> i32 {
        (other - self).length8()
    }

    pub fn dist_d(self, other: Position) -> f64 {
        (other - self).length_d()
    }

    /// Unit step along this vector (each component reduced to its sign).
    pub fn shorten(self) -> Position {
        Position::new(self.x.signum(), self.y.signum())
    }

    /// True for vectors along a row, a column or a diagonal.
    pub fn is_principal(self) -> bool {
        self.x == 0 || self.y == 0 || self.x.abs() == self.y.abs()
    }

    pub fn is_unit(self) -> bool {
        self != Position::ORIGIN && self.length8() == 1
    }

    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        Self::DIRECTIONS8.into_iter().map(move |dir| self + dir)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl Add for Position {
    type Output = Position;
    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Position {
    type Output = Position;
    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Position {
    type Output = Position;
    fn neg(self) -> Position {
        Position::new(-self.x, -self.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Half-open rectangle `[min, max)` on a single level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub min: Position,
    pub max: Position,
}

impl Rect {
    pub const fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    /// Square of the given radius around `center`, excluding the far edges.
    pub fn around(center: Position, radius: i32) -> Self {
        let offset = Position::new(radius, radius);
        Self::new(center - offset, center + offset)
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.min.x
            && position.y >= self.min.y
            && position.x < self.max.x
            && position.y < self.max.y
    }

    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    pub fn middle(&self) -> Position {
        Position::new((self.min.x + self.max.x) / 2, (self.min.y + self.max.y) / 2)
    }

    /// Row-major iteration over every position in the rectangle.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (self.min.y..self.max.y)
            .flat_map(move |y| (self.min.x..self.max.x).map(move |x| Position::new(x, y)))
    }
}

/// Discrete game time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }

    pub fn saturating_sub(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_sub(rhs))
    }
}

impl Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl Sub<u64> for Tick {
    type Output = Tick;
    fn sub(self, rhs: u64) -> Tick {
        self.saturating_sub(rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
