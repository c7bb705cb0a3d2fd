//! Reveal resolution
//!
//! Applies the effect of walking into a room. Loot rooms add to the hero's
//! supplies; monster rooms take a toll, paid from the cheapest tier the hero
//! can fully afford:
//!
//! 1. gear: `n` armour and `n` weapons
//! 2. allies: `n` allies
//! 3. lives: `n` lives, even if that leaves the hero below zero
//!
//! where `n` is the monster's strength (ogre 1, goblin 2).

use serde::{Deserialize, Serialize};

use super::hero::{Hero, MAX_LIVES, POTIONS_PER_HEAL};
use super::room::{Room, RoomKind};

/// Presentation class of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Safe,
    Battle,
    Death,
    Info,
}

/// What a fight cost the hero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toll {
    /// `n` armour and `n` weapons
    Gear(u32),
    Allies(u32),
    Lives(u32),
}

/// What a reveal did to the hero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Nothing,
    /// `healed` is set when the pickup completed a set of potions
    Potion { healed: bool },
    Armour,
    Weapon,
    Ally,
    Fight { toll: Toll },
}

/// Narrative result of one reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealEvent {
    pub kind: RoomKind,
    pub effect: Effect,
}

impl RevealEvent {
    pub fn severity(&self) -> Severity {
        match self.effect {
            Effect::Nothing => Severity::Info,
            Effect::Fight { toll: Toll::Lives(_) } => Severity::Death,
            Effect::Fight { .. } => Severity::Battle,
            _ => Severity::Safe,
        }
    }

    /// Log line for this event
    pub fn message(&self) -> String {
        match self.effect {
            Effect::Nothing => "An empty room...".to_string(),
            Effect::Potion { healed: false } => "Found potion!".to_string(),
            Effect::Potion { healed: true } => "Found potion! 3 potions used! +1 heart!".to_string(),
            Effect::Armour => "Found armour!".to_string(),
            Effect::Weapon => "Found weapon!".to_string(),
            Effect::Ally => "An ally joined!".to_string(),
            Effect::Fight { toll } => {
                let loss = match toll {
                    Toll::Gear(n) => format!("{} armour and {} {}", n, n, plural(n, "weapon", "weapons")),
                    Toll::Allies(n) => format!("{} {}", n, plural(n, "ally", "allies")),
                    Toll::Lives(n) => format!("{} {}", n, plural(n, "life", "lives")),
                };
                format!("{} defeated! Lost {}.", self.kind.name(), loss)
            }
        }
    }
}

fn plural(n: u32, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 { one } else { many }
}

/// Monster strength, or `None` for safe rooms
pub fn foe_strength(kind: RoomKind) -> Option<u32> {
    match kind {
        RoomKind::Ogre => Some(1),
        RoomKind::Goblin => Some(2),
        _ => None,
    }
}

/// Reveal `room` and apply its effect to a copy of `hero`.
///
/// The room must still be hidden; the run controller checks this before
/// calling. The reveal counter goes up before any kind-specific effect.
pub fn reveal(mut hero: Hero, room: &mut Room) -> (Hero, RevealEvent) {
    debug_assert!(!room.is_revealed(), "room revealed twice");

    room.mark_revealed();
    hero.revealed_count += 1;

    let kind = room.kind();
    let effect = match kind {
        RoomKind::Empty => Effect::Nothing,
        RoomKind::Potion => {
            hero.potions += 1;
            // One pickup adds one potion, so this fires at most once
            let healed = hero.potions >= POTIONS_PER_HEAL;
            if healed {
                hero.potions -= POTIONS_PER_HEAL;
                hero.lives = (hero.lives + 1).min(MAX_LIVES);
            }
            Effect::Potion { healed }
        }
        RoomKind::Armour => {
            hero.armour += 1;
            Effect::Armour
        }
        RoomKind::Weapon => {
            hero.weapons += 1;
            Effect::Weapon
        }
        RoomKind::Teammate => {
            hero.gain_ally();
            Effect::Ally
        }
        RoomKind::Ogre | RoomKind::Goblin => {
            let strength = foe_strength(kind).unwrap_or(1);
            Effect::Fight { toll: fight(&mut hero, strength) }
        }
    };

    (hero, RevealEvent { kind, effect })
}

fn fight(hero: &mut Hero, strength: u32) -> Toll {
    if hero.armour >= strength && hero.weapons >= strength {
        hero.armour -= strength;
        hero.weapons -= strength;
        Toll::Gear(strength)
    } else if hero.allies >= strength {
        hero.lose_allies(strength);
        Toll::Allies(strength)
    } else {
        hero.lives -= strength as i32;
        Toll::Lives(strength)
    }
}
