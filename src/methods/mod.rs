pub mod actors;
pub mod checklist;
pub mod lifecycle;
pub mod settlement;
pub mod signing;
pub mod standard_replies;
