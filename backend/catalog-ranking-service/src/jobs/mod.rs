pub mod ranking_refresh;

pub use ranking_refresh::start_ranking_refresher;
