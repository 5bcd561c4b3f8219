//! One module per publishing platform; each exposes its spider, the
//! configuration record it is built from and the agencies it serves.

pub mod columbia_commission;
pub mod dalles;
pub mod hood_river;
pub mod skamania;
pub mod stevenson;
pub mod white_salmon;
