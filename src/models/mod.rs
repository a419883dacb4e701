pub mod api;
pub mod job;
pub mod kind;
pub mod side_panel;
pub mod status;
pub mod track;
