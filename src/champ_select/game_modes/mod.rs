// Built-in game mode strategies

mod aram;
mod classic;

pub use aram::AramStrategy;
pub use classic::ClassicStrategy;
