//! CLI Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// What failed, from the point of view of someone running the command.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open the device store")]
    Store,
    #[display("could not save the language preference")]
    Preference,
    #[display("could not reset the device seed")]
    Seed,
    #[display("could not write output")]
    Output,
}
