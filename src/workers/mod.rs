pub mod token_cleanup;

pub use token_cleanup::{CleanupReport, TokenCleanupWorker};
