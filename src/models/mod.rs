pub mod ride;
pub mod ride_form;
pub mod stats;
