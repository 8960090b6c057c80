pub mod api;
pub mod config;
pub mod feed;
pub mod games;
pub mod html;
pub mod http_client;
pub mod page;
pub mod state;
pub mod tally;
pub mod vote_flag;
