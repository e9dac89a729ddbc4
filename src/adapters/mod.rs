// Adapters layer: concrete implementations of the domain ports for the
// external systems (MySQL, S3, the upstream translator node).

pub mod mysql;
pub mod s3;
pub mod upstream;

pub use mysql::MySqlStore;
pub use s3::S3ObjectStore;
pub use upstream::NoopUpstreamSource;
