//! Rank table: radius and score value per piece rank, plus presentation skin.

use std::ops::RangeInclusive;

use serde::Deserialize;

/// Highest rank. Two top-rank pieces coexist but never merge.
pub const MAX_RANK: u8 = 11;

/// Ranks a freshly spawned aimed piece is drawn from.
pub const SPAWN_RANKS: RangeInclusive<u8> = 1..=3;

/// Source sprite sheets are 512 px per piece.
const SPRITE_SOURCE_PX: f32 = 512.0;

const RADII: [f32; MAX_RANK as usize] = [
    20.0, 30.0, 45.0, 55.0, 70.0, 85.0, 100.0, 120.0, 140.0, 160.0, 190.0,
];

const SCORES: [u64; MAX_RANK as usize] = [2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048];

/// Visual variant. Only sprite selection depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skin {
    #[default]
    Fruit,
    Planet,
}

impl Skin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Skin::Fruit => "fruit",
            Skin::Planet => "planet",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Skin::Fruit => Skin::Planet,
            Skin::Planet => Skin::Fruit,
        }
    }
}

/// Physical and scoring properties of one rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankDef {
    pub radius: f32,
    pub score: u64,
}

/// Immutable per-session lookup from rank (1..=MAX_RANK) to radius and score.
#[derive(Debug, Clone)]
pub struct RankTable {
    defs: [RankDef; MAX_RANK as usize],
    skin: Skin,
}

impl RankTable {
    pub fn new(skin: Skin) -> Self {
        let mut defs = [RankDef { radius: 0.0, score: 0 }; MAX_RANK as usize];
        for (i, def) in defs.iter_mut().enumerate() {
            *def = RankDef { radius: RADII[i], score: SCORES[i] };
        }
        Self { defs, skin }
    }

    /// Definition for `rank`, or `None` outside 1..=MAX_RANK.
    pub fn get(&self, rank: u8) -> Option<&RankDef> {
        if rank == 0 {
            return None;
        }
        self.defs.get(rank as usize - 1)
    }

    /// Radius for `rank`, clamped into the valid range.
    pub fn radius(&self, rank: u8) -> f32 {
        self.clamped(rank).radius
    }

    /// Score value for `rank`, clamped into the valid range.
    pub fn score(&self, rank: u8) -> u64 {
        self.clamped(rank).score
    }

    /// Rank produced by merging two `rank` pieces. `None` for the top rank.
    pub fn merge_result(&self, rank: u8) -> Option<u8> {
        if rank == 0 || rank >= MAX_RANK {
            None
        } else {
            Some(rank + 1)
        }
    }

    pub fn skin(&self) -> Skin {
        self.skin
    }

    pub fn set_skin(&mut self, skin: Skin) {
        self.skin = skin;
    }

    /// Asset key for the piece sprite, e.g. `"fruit/3"`.
    pub fn sprite_key(&self, rank: u8) -> String {
        format!("{}/{}", self.skin.as_str(), rank.clamp(1, MAX_RANK))
    }

    /// Uniform sprite scale so the 512 px source covers the piece diameter.
    pub fn sprite_scale(&self, rank: u8) -> f32 {
        self.radius(rank) * 2.0 / SPRITE_SOURCE_PX
    }

    fn clamped(&self, rank: u8) -> &RankDef {
        &self.defs[rank.clamp(1, MAX_RANK) as usize - 1]
    }
}

impl Default for RankTable {
    fn default() -> Self {
        Self::new(Skin::default())
    }
}
