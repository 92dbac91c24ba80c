#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_sign_loss)]
pub mod alu_instruction;
pub mod instructions;
pub mod mode;

#[allow(clippy::cast_possible_truncation)]
pub mod operations;
