pub mod types;
pub mod env;
pub mod metrics;

pub mod utils {
    pub mod logging;
}
