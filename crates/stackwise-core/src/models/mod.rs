pub mod disclaimer;
pub mod goal;
pub mod log;
pub mod page;
pub mod recommendation;
pub mod stack;
pub mod supplement;
