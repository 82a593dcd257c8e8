mod dir;
mod name_uuid;
mod timing;

pub use self::dir::*;
pub use self::name_uuid::*;
pub use self::timing::*;
