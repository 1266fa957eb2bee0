//! SQLite storage implementation for portfolios.

mod model;
mod repository;

pub use model::PortfolioDB;
pub use repository::PortfolioRepository;
