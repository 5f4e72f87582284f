/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub ai: AiConfig,
    pub village: VillageConfig,
    pub world: WorldConfig,
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Tunables of the per-creature behaviours.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiConfig {
    /// Ticks after which a last-seen enemy record is dropped.
    pub last_seen_timeout: u64,
    /// Chebyshev distance within which a panicking fighter reacts.
    pub panic_radius: i32,
    pub random_move_memory: usize,
    pub bed_search_radius: i32,
    pub door_search_radius: i32,
    /// Distance within which buff items are used before a fight.
    pub buff_radius: i32,
    /// Distance below which firing and throwing are considered.
    pub ranged_radius: i32,
    /// Distance at which chasing stops being attractive.
    pub chase_falloff: f64,
    /// One-in-N chance per turn that a bird leaves.
    pub fly_away_chance: u32,
}

impl AiConfig {
    pub const DEFAULT_LAST_SEEN_TIMEOUT: u64 = 20;
    pub const DEFAULT_PANIC_RADIUS: i32 = 7;
    pub const DEFAULT_RANDOM_MOVE_MEMORY: usize = 3;
    pub const DEFAULT_SEARCH_RADIUS: i32 = 10;
    pub const DEFAULT_BUFF_RADIUS: i32 = 5;
    pub const DEFAULT_RANGED_RADIUS: i32 = 10;
    pub const DEFAULT_CHASE_FALLOFF: f64 = 10.0;
    pub const DEFAULT_FLY_AWAY_CHANCE: u32 = 15;
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            last_seen_timeout: Self::DEFAULT_LAST_SEEN_TIMEOUT,
            panic_radius: Self::DEFAULT_PANIC_RADIUS,
            random_move_memory: Self::DEFAULT_RANDOM_MOVE_MEMORY,
            bed_search_radius: Self::DEFAULT_SEARCH_RADIUS,
            door_search_radius: Self::DEFAULT_SEARCH_RADIUS,
            buff_radius: Self::DEFAULT_BUFF_RADIUS,
            ranged_radius: Self::DEFAULT_RANGED_RADIUS,
            chase_falloff: Self::DEFAULT_CHASE_FALLOFF,
            fly_away_chance: Self::DEFAULT_FLY_AWAY_CHANCE,
        }
    }
}

/// Tunables of village controls and their attack triggers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VillageConfig {
    /// Quiet period after the villain last killed a villager.
    pub attack_delay: u64,
    /// Quiet period after the village last launched an attack.
    pub my_attacks_delay: u64,
    /// Delay between first contact and the inner trigger taking over.
    pub contact_grace: u64,
    pub final_delay_min: u64,
    pub final_delay_max: u64,
    /// Number of thresholds is drawn from `1..=power_trigger_count_max`.
    pub power_trigger_count_max: usize,
    pub power_factor_min: f64,
    pub power_factor_max: f64,
    /// Time after which the villain's estimated power grows by one point per two ticks.
    pub war_time_offset: u64,
    pub exp_level_base: f64,
    pub exp_level_offset: u64,
    pub exp_level_period: u64,
    pub dragon_wait_turns: u64,
    /// Villain fighter count above which a dragon raids.
    pub dragon_population_limit: usize,
    pub dragon_min_victims: u32,
    pub dragon_max_victims: u32,
}

impl Default for VillageConfig {
    fn default() -> Self {
        Self {
            attack_delay: 200,
            my_attacks_delay: 900,
            contact_grace: 50,
            final_delay_min: 80,
            final_delay_max: 200,
            power_trigger_count_max: 3,
            power_factor_min: 0.4,
            power_factor_max: 1.2,
            war_time_offset: 2000,
            exp_level_base: 10.0,
            exp_level_offset: 1000,
            exp_level_period: 500,
            dragon_wait_turns: 2000,
            dragon_population_limit: 25,
            dragon_min_victims: 5,
            dragon_max_victims: 10,
        }
    }
}

/// Tunables of the in-memory reference world.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    pub sight_radius: i32,
    /// Health lost per point of damage.
    pub damage_scale: f64,
    pub throw_range: i32,
    pub day_length: u64,
    pub night_length: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            sight_radius: 10,
            damage_scale: 0.02,
            throw_range: 10,
            day_length: 700,
            night_length: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuning_tables() {
        let config = GameConfig::default();
        assert_eq!(config.ai.last_seen_timeout, 20);
        assert_eq!(config.ai.panic_radius, 7);
        assert_eq!(config.village.attack_delay, 200);
        assert_eq!(config.village.my_attacks_delay, 900);
        assert_eq!(config.village.final_delay_min, 80);
        assert_eq!(config.village.final_delay_max, 200);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_takes_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"village":{"attack_delay":10}}"#).expect("valid config");
        assert_eq!(config.village.attack_delay, 10);
        assert_eq!(config.village.contact_grace, 50);
        assert_eq!(config.ai, AiConfig::default());
    }
}
