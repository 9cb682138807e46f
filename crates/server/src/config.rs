//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub collision: CollisionConfig,
}

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tick_rate must be positive")]
    ZeroTickRate,

    #[error("world size {size} cannot hold an entity of radius {radius}")]
    WorldTooSmall { size: f32, radius: f32 },

    #[error("{0} must be positive")]
    NonPositive(&'static str),
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing a default file if none exists.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml_str(&contents)?
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            default_config
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Check values the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.world.initial_radius <= 0.0 {
            return Err(ConfigError::NonPositive("world.initial_radius"));
        }
        if self.world.size <= self.world.initial_radius * 2.0 {
            return Err(ConfigError::WorldTooSmall {
                size: self.world.size,
                radius: self.world.initial_radius,
            });
        }
        let ratios = [
            ("bot.threat_ratio", self.bot.threat_ratio),
            ("collision.predation_distance_ratio", self.collision.predation_distance_ratio),
            ("collision.predation_radius_ratio", self.collision.predation_radius_ratio),
        ];
        for (name, value) in ratios {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive(name));
            }
        }
        Ok(())
    }

    /// Duration of one tick.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.server.tick_rate.max(1) as f64)
    }
}

/// Server networking and scheduling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Connections per IP limit.
    #[serde(default = "default_ip_limit")]
    pub ip_limit: usize,
    /// Simulation ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            max_connections: default_max_connections(),
            ip_limit: default_ip_limit(),
            tick_rate: default_tick_rate(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_max_connections() -> usize {
    100
}
fn default_ip_limit() -> usize {
    100
}
fn default_tick_rate() -> u32 {
    60
}

/// World dimensions and population.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    /// Side of the square world.
    #[serde(default = "default_world_size")]
    pub size: f32,
    /// Number of food fragments, constant for the process lifetime.
    #[serde(default = "default_food_count")]
    pub food_count: usize,
    /// Number of bots, constant for the process lifetime.
    #[serde(default = "default_bot_count")]
    pub bot_count: usize,
    /// Radius of an entity with score 0.
    #[serde(default = "default_initial_radius")]
    pub initial_radius: f32,
    /// Fixed PRNG seed. Unset means seeded from OS entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: default_world_size(),
            food_count: default_food_count(),
            bot_count: default_bot_count(),
            initial_radius: default_initial_radius(),
            seed: None,
        }
    }
}

fn default_world_size() -> f32 {
    3000.0
}
fn default_food_count() -> usize {
    200
}
fn default_bot_count() -> usize {
    12
}
fn default_initial_radius() -> f32 {
    20.0
}

/// Player movement configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_base_speed")]
    pub base_speed: f32,
    #[serde(default = "default_player_boost_speed")]
    pub boost_speed: f32,
    /// Boost only works above this score.
    #[serde(default = "default_player_boost_threshold")]
    pub boost_threshold: f32,
    /// Score lost per boosted tick.
    #[serde(default = "default_player_boost_decay")]
    pub boost_decay: f32,
    #[serde(default = "default_max_nick_length")]
    pub max_nick_length: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_speed: default_player_base_speed(),
            boost_speed: default_player_boost_speed(),
            boost_threshold: default_player_boost_threshold(),
            boost_decay: default_player_boost_decay(),
            max_nick_length: default_max_nick_length(),
        }
    }
}

fn default_player_base_speed() -> f32 {
    3.0
}
fn default_player_boost_speed() -> f32 {
    5.0
}
fn default_player_boost_threshold() -> f32 {
    5.0
}
fn default_player_boost_decay() -> f32 {
    0.04
}
fn default_max_nick_length() -> usize {
    30
}

/// Bot AI configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    /// Bigger entities closer than this are threats.
    #[serde(default = "default_bot_threat_distance")]
    pub threat_distance: f32,
    /// A threat's radius must exceed the bot's by this factor.
    #[serde(default = "default_bot_threat_ratio")]
    pub threat_ratio: f32,
    #[serde(default = "default_bot_forage_distance")]
    pub forage_distance: f32,
    #[serde(default = "default_bot_flee_speed")]
    pub flee_speed: f32,
    #[serde(default = "default_bot_forage_speed")]
    pub forage_speed: f32,
    #[serde(default = "default_bot_wander_speed")]
    pub wander_speed: f32,
    /// Per-tick probability of picking a new wander heading.
    #[serde(default = "default_bot_wander_turn_chance")]
    pub wander_turn_chance: f64,
    /// Score a bot is reset to after being eaten.
    #[serde(default = "default_bot_reset_score")]
    pub reset_score: f32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            threat_distance: default_bot_threat_distance(),
            threat_ratio: default_bot_threat_ratio(),
            forage_distance: default_bot_forage_distance(),
            flee_speed: default_bot_flee_speed(),
            forage_speed: default_bot_forage_speed(),
            wander_speed: default_bot_wander_speed(),
            wander_turn_chance: default_bot_wander_turn_chance(),
            reset_score: default_bot_reset_score(),
        }
    }
}

fn default_bot_threat_distance() -> f32 {
    250.0
}
fn default_bot_threat_ratio() -> f32 {
    1.15
}
fn default_bot_forage_distance() -> f32 {
    300.0
}
fn default_bot_flee_speed() -> f32 {
    2.8
}
fn default_bot_forage_speed() -> f32 {
    2.2
}
fn default_bot_wander_speed() -> f32 {
    1.5
}
fn default_bot_wander_turn_chance() -> f64 {
    0.02
}
fn default_bot_reset_score() -> f32 {
    5.0
}

/// Eating rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollisionConfig {
    /// Score gained per food fragment.
    #[serde(default = "default_food_score")]
    pub food_score: f32,
    /// Victim centre must be within `attacker.radius * ratio`.
    #[serde(default = "default_predation_distance_ratio")]
    pub predation_distance_ratio: f32,
    /// Attacker radius must exceed `victim.radius * ratio`.
    #[serde(default = "default_predation_radius_ratio")]
    pub predation_radius_ratio: f32,
    /// Flat score added on top of the victim's score.
    #[serde(default = "default_kill_bonus")]
    pub kill_bonus: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            food_score: default_food_score(),
            predation_distance_ratio: default_predation_distance_ratio(),
            predation_radius_ratio: default_predation_radius_ratio(),
            kill_bonus: default_kill_bonus(),
        }
    }
}

fn default_food_score() -> f32 {
    1.0
}
fn default_predation_distance_ratio() -> f32 {
    0.9
}
fn default_predation_radius_ratio() -> f32 {
    1.15
}
fn default_kill_bonus() -> f32 {
    10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let config = Config::default();
        assert_eq!(config.world.size, 3000.0);
        assert_eq!(config.world.initial_radius, 20.0);
        assert_eq!(config.world.food_count, 200);
        assert_eq!(config.world.bot_count, 12);
        assert_eq!(config.server.tick_rate, 60);
        assert_eq!(config.bot.threat_distance, 250.0);
        assert_eq!(config.collision.predation_distance_ratio, 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("[world]\nsize = 500.0\nseed = 7\n").unwrap();
        assert_eq!(config.world.size, 500.0);
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.world.food_count, 200);
        assert_eq!(config.player.boost_speed, 5.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.tick_rate = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickRate));

        let mut config = Config::default();
        config.world.size = 30.0;
        assert!(matches!(config.validate(), Err(ConfigError::WorldTooSmall { .. })));

        let mut config = Config::default();
        config.collision.predation_radius_ratio = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive("collision.predation_radius_ratio"))
        );
    }

    #[test]
    fn test_tick_period() {
        let config = Config::default();
        let period = config.tick_period();
        assert!((period.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
    }
}
