pub mod constants;
pub mod frame_budget;
pub mod frame_loop;
pub mod input;
pub mod leaderboard;
pub mod session;
pub mod state;
pub mod systems;
pub mod world;
