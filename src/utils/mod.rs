pub mod config;
pub mod moon;
pub mod packed;
pub mod time_utils;
pub mod vector_math;
