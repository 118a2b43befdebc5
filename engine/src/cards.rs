// ═══════════════════════════════════════════════════════════════════════
// Cards — drawing and the card each special order consumes
// ═══════════════════════════════════════════════════════════════════════

use crate::orders::Order;
use crate::types::*;
use rand::Rng;

/// Draw one card uniformly from the four kinds.
pub fn draw_card(rng: &mut impl Rng) -> Card {
    Card::ALL[rng.gen_range(0..Card::ALL.len())]
}

/// The card an order needs in hand, if any.
pub fn card_for(order: &Order) -> Option<Card> {
    match order {
        Order::Deploy { .. } | Order::Advance { .. } => None,
        Order::Bomb { .. } => Some(Card::Bomb),
        Order::Blockade { .. } => Some(Card::Blockade),
        Order::Airlift { .. } => Some(Card::Airlift),
        Order::Negotiate { .. } => Some(Card::Negotiate),
    }
}

/// Give `player` one random card for a conquest, unless they already got
/// one this round. Returns the card drawn.
pub fn award_conquest_card(state: &mut GameState, player: &str) -> Option<Card> {
    if state.player(player).map_or(true, |p| p.conquered_this_round) {
        return None;
    }
    let card = draw_card(&mut state.rng());
    let p = state.player_mut(player)?;
    p.conquered_this_round = true;
    p.cards.push(card);
    Some(card)
}
