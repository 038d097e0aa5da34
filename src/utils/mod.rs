pub mod naming;
pub mod slots;
