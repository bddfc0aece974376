pub mod game;
pub mod id;
pub mod paging;
pub mod player;
pub mod team;

pub use game::*;
pub use id::*;
pub use paging::*;
pub use player::*;
pub use team::*;
