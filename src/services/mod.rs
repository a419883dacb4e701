pub mod backend;
pub mod registry;
pub mod result_mapper;
pub mod scheduler;
pub mod side_panel;
pub mod single_flight;
pub mod status_client;
pub mod tracker;
