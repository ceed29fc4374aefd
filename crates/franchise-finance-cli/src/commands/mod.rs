pub mod financing;
pub mod investment;
pub mod roi;
pub mod royalty;
