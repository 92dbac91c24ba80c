pub mod alu_instructions;
pub mod instruction;
pub mod mode;

#[allow(clippy::cast_possible_truncation)]
pub mod operations;
