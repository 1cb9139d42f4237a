pub mod context;
pub mod images;
pub mod release;
pub mod serve;
