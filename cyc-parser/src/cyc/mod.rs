//! Main module for cyc-parser functionality

pub mod ast;
pub mod lexing;
pub mod parsing;
pub mod rules;
pub mod testing;
pub mod token;
