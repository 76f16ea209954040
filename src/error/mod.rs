mod app;
mod http;
mod validation;

pub use app::{AppError, AppResult};
pub use http::HttpError;
pub use validation::ValidationError;
