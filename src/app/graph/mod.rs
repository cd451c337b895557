mod build;
mod interaction;
mod view;

pub(super) use build::family_colors;
pub(super) use interaction::{GraphCommand, InteractionController};
