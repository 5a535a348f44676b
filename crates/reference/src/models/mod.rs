mod lang;
mod reference;

pub use self::lang::{Language, LanguageInfo};
pub use self::reference::CanonicalReference;
