pub mod error;
pub mod local_client;
pub mod service;
pub mod token;

pub use error::DomainError;
pub use local_client::DockerAuthLocalClient;
pub use service::Service;
