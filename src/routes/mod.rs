pub(crate) mod crypto;
pub(crate) mod health;
pub(crate) mod portfolios;
pub(crate) mod stock;
