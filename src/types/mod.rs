mod error;
mod input;
mod instruction;
mod instructions;
mod term;
mod token;

pub(crate) use instruction::{contains_placeholder, PLACEHOLDER};

pub use error::{CompileError, InvalidTermError};
pub use input::Input;
pub use instruction::{BoostDirection, Instruction};
pub use instructions::{Instructions, Properties};
pub use term::Term;
pub use token::QueryToken;
