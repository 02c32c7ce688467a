pub mod destination;
pub mod plan;
pub mod rich_content;
pub mod session;
pub mod slots;
