pub mod repository;

pub use repository::ChainRepository;
