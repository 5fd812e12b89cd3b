pub mod estimate;
pub mod inventory;
pub mod job;
pub mod margin;
pub mod numeric;
pub mod settings;
