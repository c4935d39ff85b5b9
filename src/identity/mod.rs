//! Author identity: role classification and name coloring.

pub mod classify;
pub mod color;

pub use classify::classify;
pub use color::{
    MEMBER_HUE_BAND, MODERATOR_HUE_BAND, ROLE_MEMBER_COLOR, ROLE_MODERATOR_COLOR, assign_color,
    role_color,
};
