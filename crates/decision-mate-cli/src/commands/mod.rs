pub mod business;
pub mod history;
pub mod personal;
