pub mod coingecko;
pub mod prices;
