/// Identifies one accepted connection in logs.
pub type ID = uuid::Uuid;
