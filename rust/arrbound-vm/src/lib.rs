//! arrbound VM — register machine that executes compiled LIR lambdas.

pub mod vm;
