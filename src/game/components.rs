//! Game Components
//!
//! Plain data attached to entities. Behavior lives in `systems`.

use macroquad::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::runtime::Signal;

// =============================================================================
// Physics / Movement
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec2);

/// Units per second
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity(pub Vec2);

/// Circle collider; every collision in the game is circle vs circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub radius: f32,
}

impl Collider {
    pub fn overlaps(&self, a: Vec2, other: &Collider, b: Vec2) -> bool {
        let reach = self.radius + other.radius;
        a.distance_squared(b) <= reach * reach
    }
}

// =============================================================================
// Combat
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
    /// Frames left during which hits are ignored
    pub invincible_frames: u8,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self {
            current: max,
            max,
            invincible_frames: 0,
        }
    }

    /// Apply damage. Returns true if this hit was lethal.
    pub fn damage(&mut self, amount: i32) -> bool {
        if self.invincible_frames > 0 || self.is_dead() {
            return false;
        }
        self.current = (self.current - amount).max(0);
        self.current == 0
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn tick_invincibility(&mut self) {
        self.invincible_frames = self.invincible_frames.saturating_sub(1);
    }
}

/// Which side fired a projectile (no friendly fire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub team: Team,
    pub damage: i32,
    /// Seconds until the shot fizzles
    pub ttl: f32,
}

// =============================================================================
// Weapons
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Starting gun: single slow shot
    Cannon,
    /// Coin reward: fast three-way spread
    MassMachineGun,
}

impl WeaponKind {
    /// Seconds between volleys
    pub fn fire_interval(self) -> f32 {
        match self {
            WeaponKind::Cannon => 0.5,
            WeaponKind::MassMachineGun => 0.15,
        }
    }

    pub fn damage(self) -> i32 {
        match self {
            WeaponKind::Cannon => 2,
            WeaponKind::MassMachineGun => 1,
        }
    }

    pub fn shot_speed(self) -> f32 {
        match self {
            WeaponKind::Cannon => 8.0,
            WeaponKind::MassMachineGun => 10.0,
        }
    }

    /// Horizontal velocity of each shot in a volley
    pub fn spread(self) -> &'static [f32] {
        match self {
            WeaponKind::Cannon => &[0.0],
            WeaponKind::MassMachineGun => &[-1.5, 0.0, 1.5],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeaponKind::Cannon => "Cannon",
            WeaponKind::MassMachineGun => "Mass Machine Gun",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub kind: WeaponKind,
    /// Seconds until the next volley
    pub cooldown: f32,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self { kind, cooldown: 0.0 }
    }
}

// =============================================================================
// Entity Kinds
// =============================================================================

/// The player aircraft. `death` fires once, when health first hits zero.
#[derive(Debug, Clone, Default)]
pub struct Player {
    pub death: Signal,
}

impl Player {
    pub fn is_alive(&self) -> bool {
        !self.death.is_fired()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyBehavior {
    /// Flying down from the spawn line
    #[default]
    Approach,
    /// Holding the hover line, sliding sideways and shooting
    Strafe,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub behavior: EnemyBehavior,
    /// Seconds until the next shot
    pub fire_timer: f32,
    /// +1 or -1
    pub strafe_dir: f32,
}

impl Enemy {
    pub fn new(fire_timer: f32, strafe_dir: f32) -> Self {
        Self {
            behavior: EnemyBehavior::Approach,
            fire_timer,
            strafe_dir,
        }
    }
}

/// Collectible coin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coin {
    /// Seconds left in the drop-in effect
    pub appear_remaining: f32,
    pub collected: bool,
}

impl Coin {
    pub fn new(appear_secs: f32) -> Self {
        Self {
            appear_remaining: appear_secs,
            collected: false,
        }
    }

    pub fn is_appearing(&self) -> bool {
        self.appear_remaining > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_invincibility() {
        let mut hp = Health::new(10);
        assert!(!hp.damage(4));
        hp.invincible_frames = 2;
        assert!(!hp.damage(100));
        assert_eq!(hp.current, 6);

        hp.tick_invincibility();
        hp.tick_invincibility();
        assert!(hp.damage(100));
        assert!(hp.is_dead());
        // Already dead: a second lethal hit is not reported again
        assert!(!hp.damage(1));
    }

    #[test]
    fn test_collider_overlap() {
        let a = Collider { radius: 0.5 };
        let b = Collider { radius: 0.25 };
        assert!(a.overlaps(Vec2::ZERO, &b, Vec2::new(0.75, 0.0)));
        assert!(!a.overlaps(Vec2::ZERO, &b, Vec2::new(0.8, 0.0)));
    }

    #[test]
    fn test_player_alive_until_death_fires() {
        let player = Player::default();
        assert!(player.is_alive());
        player.death.fire();
        assert!(!player.is_alive());
    }
}
