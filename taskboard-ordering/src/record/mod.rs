//! Record commands

mod add;
mod delete;
mod get;
mod list;
mod mv;

pub use add::AddRecord;
pub use delete::DeleteRecord;
pub use get::GetRecord;
pub use list::ListRecords;
pub use mv::MoveRecord;
