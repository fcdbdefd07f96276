pub mod lookup;
pub mod migrate;
pub mod serve;
