pub mod canonical;
pub mod classify;
pub mod descriptor;
pub mod normalize;
pub mod properties;
pub mod tokens;
