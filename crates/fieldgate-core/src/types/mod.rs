mod float64;
mod object_id;

pub use float64::Float64;
pub use object_id::{ObjectId, ObjectIdError};
