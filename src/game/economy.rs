//! Coin Economy
//!
//! Counts collected coins and decides when the player has earned a weapon
//! upgrade (every `reward_every` coins). The counter lives for the whole run
//! and is zeroed at the start of each session.
//!
//! A reward fires once per threshold: the counter remembers the highest
//! threshold already paid out, so calling `update` again with the same (or a
//! lower) multiple does not pay twice. Only `update(0)` clears that memory.

use super::hud::TextDisplay;

pub fn format_coins(coins: u32) -> String {
    format!("{} coins", coins)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Economy {
    coins: u32,
    reward_every: u32,
    last_rewarded: u32,
}

impl Economy {
    pub fn new(reward_every: u32) -> Self {
        Self {
            coins: 0,
            reward_every: reward_every.max(1),
            last_rewarded: 0,
        }
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    /// One more coin. Returns true if a reward should be granted.
    pub fn on_collected(&mut self, display: &mut dyn TextDisplay) -> bool {
        self.update(self.coins + 1, display)
    }

    /// Set the counter and refresh the display. Returns true if `amount`
    /// crosses a reward threshold not paid out before.
    pub fn update(&mut self, amount: u32, display: &mut dyn TextDisplay) -> bool {
        if amount == 0 {
            self.last_rewarded = 0;
        }

        let reward = amount > 0 && amount % self.reward_every == 0 && amount > self.last_rewarded;
        if reward {
            self.last_rewarded = amount;
        }

        self.coins = amount;
        display.set_text(format_coins(amount));
        reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::hud::HudLabel;

    #[test]
    fn test_rewards_at_multiples_of_five() {
        let mut hud = HudLabel::default();
        let mut economy = Economy::new(5);
        economy.update(0, &mut hud);

        let mut rewarded = Vec::new();
        for _ in 1..=10 {
            if economy.on_collected(&mut hud) {
                rewarded.push(economy.coins());
            }
        }
        assert_eq!(rewarded, vec![5, 10]);
        assert_eq!(hud.text(), "10 coins");
    }

    #[test]
    fn test_reset_shows_zero_without_reward() {
        let mut hud = HudLabel::default();
        let mut economy = Economy::new(5);
        assert!(!economy.update(0, &mut hud));
        assert_eq!(hud.text(), "0 coins");
    }

    #[test]
    fn test_five_collections_one_reward() {
        let mut hud = HudLabel::default();
        let mut economy = Economy::new(5);
        economy.update(0, &mut hud);

        let grants = (0..5).filter(|_| economy.on_collected(&mut hud)).count();
        assert_eq!(grants, 1);
        assert_eq!(hud.text(), "5 coins");
    }

    #[test]
    fn test_repeated_update_does_not_refire() {
        let mut hud = HudLabel::default();
        let mut economy = Economy::new(5);
        assert!(economy.update(5, &mut hud));
        assert!(!economy.update(5, &mut hud));
        assert!(!economy.update(4, &mut hud));
        assert!(!economy.update(5, &mut hud));
        assert!(economy.update(10, &mut hud));
    }

    #[test]
    fn test_new_session_rewards_again() {
        let mut hud = HudLabel::default();
        let mut economy = Economy::new(5);
        assert!(economy.update(5, &mut hud));

        economy.update(0, &mut hud);
        assert!(economy.update(5, &mut hud));
    }
}
