mod blood_request;
mod blood_type;
mod clinic;
mod donor;
mod geo;
mod notification;

pub use blood_request::*;
pub use blood_type::*;
pub use clinic::*;
pub use donor::*;
pub use geo::*;
pub use notification::*;
