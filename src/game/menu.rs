//! Start Menu
//!
//! The first menu of a run explains the game; later ones just ask to go
//! again. Showing the menu suspends the caller until a start request arrives.

use super::context::GameHandle;
use crate::runtime::wait_until;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuVariant {
    /// Title, rules and controls
    Full,
    /// "Play again" prompt
    Short,
}

impl MenuVariant {
    pub fn for_cycle(first_cycle: bool) -> Self {
        if first_cycle {
            MenuVariant::Full
        } else {
            MenuVariant::Short
        }
    }

    pub fn lines(self) -> &'static [&'static str] {
        match self {
            MenuVariant::Full => &[
                "SAMPLY",
                "Shoot the drones, grab the coins.",
                "Every 5 coins bolts another gun to your wings.",
                "Steer: arrows / WASD / left stick",
                "Press ENTER or START to fly",
            ],
            MenuVariant::Short => &["Shot down!", "Press ENTER or START to fly again"],
        }
    }
}

/// Put the menu on screen and wait for the player to start.
///
/// Start presses made before the menu appeared (e.g. while dying) are
/// discarded so a mashed button does not skip the menu.
pub async fn show_start_menu(handle: &GameHandle, variant: MenuVariant) {
    {
        let mut ctx = handle.ctx.borrow_mut();
        ctx.clear_start();
        ctx.menu = Some(variant);
    }
    tracing::debug!(?variant, "start menu shown");

    let ctx = handle.ctx.clone();
    wait_until(move || ctx.borrow_mut().take_start()).await;
}

pub fn dismiss(handle: &GameHandle) {
    handle.ctx.borrow_mut().menu = None;
    tracing::debug!("start menu dismissed");
}
