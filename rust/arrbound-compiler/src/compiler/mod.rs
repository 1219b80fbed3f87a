pub mod ast;
pub mod lir;
pub mod lower;
pub mod regalloc;
pub mod typecheck;
