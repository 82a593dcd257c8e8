mod error;
mod prefs;
mod utils;

pub use error::*;
pub use prefs::*;
pub use utils::*;
