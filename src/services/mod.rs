pub mod api;
pub mod batch;
pub mod cover;
pub mod pages;
pub mod playback;
pub mod player;
pub mod refresh;
pub mod toast;
