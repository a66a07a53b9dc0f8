// Decision logic and shared errors/models
pub mod scoring {
    pub use crate::scoring::*;
}

pub mod intent {
    pub use crate::intent::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
