//! myteam-roles - account role transitions for the MY TEAM client
//!
//! A signed-in user becomes an organizer or a player by elevating the
//! account role and then creating the matching profile. The two steps are
//! separate backend calls; `transition` runs them as one unit with
//! compensation, so the account never silently ends up elevated without a
//! profile.

pub mod auth;
pub mod cli;
pub mod config;
pub mod observability;
pub mod profile;
pub mod remote;
pub mod transition;
