pub mod clock;
pub mod report;
pub mod runner;
