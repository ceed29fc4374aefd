pub mod amortization;
pub mod options;
