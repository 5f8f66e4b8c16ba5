pub mod code;
pub mod export;
pub mod serve;
