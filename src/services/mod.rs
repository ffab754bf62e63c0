pub mod chart_service;
pub mod decoder;
pub mod feed_service;
pub mod pagination_service;
pub mod render_service;
pub mod scheduler;
