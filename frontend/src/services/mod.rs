pub mod api;
pub mod http_api;
pub mod mock_api;
