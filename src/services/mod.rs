pub mod chat_service;
pub mod controller;
pub mod news_service;
pub mod reveal;
pub mod search;
pub mod stock_service;
pub mod view_state;
