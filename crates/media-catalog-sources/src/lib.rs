pub mod error;
pub mod factory;
pub mod file;
pub mod http;
pub mod query;
pub mod traits;

pub use error::{SourceError, SourceErrorKind};
pub use factory::{ProviderFactory, ProviderFactoryRegistry};
pub use file::FileCatalogProvider;
pub use http::HttpCatalogProvider;
pub use traits::CatalogProvider;
