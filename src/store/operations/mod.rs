pub mod cards;
pub mod decks;
pub mod owned_cards;
pub mod sessions;
pub mod users;
