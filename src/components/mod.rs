pub mod architecture_canvas;
pub mod mission_panel;
pub mod operations_panel;
pub mod palette;
pub mod report_log;
