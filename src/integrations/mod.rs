//! External service integrations.

pub mod llm_client {
    pub use crate::llm_client::*;
}

pub mod workflow_client {
    pub use crate::workflow_client::*;
}

pub mod knowledge {
    pub use crate::knowledge::*;
}
