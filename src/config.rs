/// Which rule set a [`crate::game_logic::GameEngine`] plays by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Standard chess only.
    Classic,
    /// Standard chess plus charges, abilities and fortress zones.
    #[default]
    Superpowers,
}

/// Tunables fixed at engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub variant: Variant,
    /// Upper bound on charges per color.
    pub max_charges: u8,
    /// Half-moves, by either side, a fortress zone stands for after it is raised.
    pub fortress_ttl: u8,
    /// Occurrences of one position that end the game in a draw.
    pub repetition_limit: u32,
}

impl GameConfig {
    pub const fn classic() -> Self {
        Self {
            variant: Variant::Classic,
            ..Self::superpowers()
        }
    }

    pub const fn superpowers() -> Self {
        Self {
            variant: Variant::Superpowers,
            max_charges: 3,
            fortress_ttl: 2,
            repetition_limit: 3,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::superpowers()
    }
}
