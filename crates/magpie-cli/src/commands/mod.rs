pub mod collect;
pub mod doctor;
