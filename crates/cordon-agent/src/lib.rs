//! `cordon-agent` — the person model.
//!
//! A [`Person`] owns its full behavioral state: position, heading, infection
//! state, and a deterministic hash-chain RNG.  The surrounding world (grid
//! bounds, obstacles, neighbor positions) is passed *into* each tick rather
//! than referenced from the person, so persons can be cloned freely across
//! patch boundaries without carrying a context back-reference.
//!
//! | Module     | Contents                                    |
//! |------------|---------------------------------------------|
//! | [`person`] | `Person` — tick, infection, projection      |
//! | [`rng`]    | `HashChain` — SHA-256 chain random draws    |

pub mod person;
pub mod rng;


pub use person::Person;
pub use rng::HashChain;
