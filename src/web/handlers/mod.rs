pub mod recommend;
pub mod titles;
