pub mod subscription;
pub mod summary;
pub mod user;

pub use subscription::*;
pub use summary::*;
pub use user::*;
