mod admin;
mod logging;

pub use self::admin::AdminGuard;
pub use self::logging::RequestLogging;
