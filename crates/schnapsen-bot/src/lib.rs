pub mod bot;

pub use bot::{BullyBot, ChaserBot, RandBot, RdeepBot};
