mod creation;
mod preset;
mod user;
mod vote;

pub use creation::{now_millis, Creation, EditState, DEFAULT_TEXT};
pub use preset::{find_preset, preset_or_default, ColorPreset, Rgb, COLOR_PRESETS};
pub use user::{AuthSession, Viewer};
pub use vote::{Orientation, Vote, VoteChange, VoteTally};
