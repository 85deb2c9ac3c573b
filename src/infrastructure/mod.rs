// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod event_stream;
pub mod html_page;
pub mod http_orders_repository;
