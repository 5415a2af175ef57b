mod bully;
mod chaser;
mod random;
mod rdeep;

pub use bully::BullyBot;
pub use chaser::ChaserBot;
pub use random::RandBot;
pub use rdeep::RdeepBot;
