// Application layer - use cases and the refresh loop
pub mod dashboard_service;
pub mod orders_repository;
pub mod refresh_controller;
