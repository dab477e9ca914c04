pub mod classify;
pub mod parse;
pub mod run;
