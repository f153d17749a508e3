//! Terminal escape sequence parser
//!
//! A stateful parser that converts bytes into terminal actions. Only the
//! practical subset a shell emits is recognized; anything else is absorbed.

mod action;
mod state;

pub use action::{Action, ControlCode, CsiAction, EscAction, Params, MAX_PARAMS};
pub use state::{Parser, ParserState, CSI_BUFFER_CAPACITY};
