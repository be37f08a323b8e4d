//! Report aggregation services, one per dashboard topic, plus the
//! text-to-SQL assistant bridge.

pub mod inventory;
pub mod sales;
pub mod shortage;
pub mod summary;
pub mod text_to_sql;
