//! Stock-trading side-channel.
//!
//! A synthetic index whose price follows a bounded multiplicative random
//! walk, advanced once per non-ending decision. The walk depends only on the
//! previous price and the injected random source, never on company metrics.
//! Trades move cash and shares atomically and never touch the turn pipeline.

use crate::{metrics::Metrics, rng::RandomSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const INITIAL_PRICE: f64 = 145.50;
pub const MIN_PRICE:     f64 = 10.0;
/// Maximum fractional move per step, either direction.
pub const VOLATILITY:    f64 = 0.03;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMarket {
    pub price: f64,
}

impl Default for StockMarket {
    fn default() -> Self {
        Self::new(INITIAL_PRICE)
    }
}

impl StockMarket {
    pub fn new(price: f64) -> Self {
        Self { price: price.max(MIN_PRICE) }
    }

    /// Advance the walk one step and return the new price.
    pub fn step(&mut self, rng: &mut dyn RandomSource) -> f64 {
        let change = 1.0 + rng.uniform(-VOLATILITY, VOLATILITY);
        self.price = (self.price * change).max(MIN_PRICE);
        self.price
    }

    pub fn portfolio_value(&self, shares_held: u64) -> f64 {
        shares_held as f64 * self.price
    }

    /// Largest whole number of shares the given cash can pay for.
    pub fn max_affordable(&self, cash: f64) -> u64 {
        if cash <= 0.0 {
            return 0;
        }
        (cash / self.price).floor() as u64
    }

    /// Cash-for-shares at the current price.
    pub fn buy(&self, metrics: &Metrics, shares: u64) -> Result<Trade, TradeRejection> {
        if shares == 0 {
            return Err(TradeRejection::ZeroShares);
        }
        let cost = shares as f64 * self.price;
        if cost > metrics.cash {
            return Err(TradeRejection::InsufficientCash { cost, cash: metrics.cash });
        }
        let mut after = metrics.clone();
        after.cash -= cost;
        after.shares_held += shares;
        Ok(Trade { side: TradeSide::Buy, shares, price: self.price, amount: cost, metrics: after })
    }

    /// Shares-for-cash at the current price.
    pub fn sell(&self, metrics: &Metrics, shares: u64) -> Result<Trade, TradeRejection> {
        if shares == 0 {
            return Err(TradeRejection::ZeroShares);
        }
        if shares > metrics.shares_held {
            return Err(TradeRejection::InsufficientShares { requested: shares, held: metrics.shares_held });
        }
        let proceeds = shares as f64 * self.price;
        let mut after = metrics.clone();
        after.cash += proceeds;
        after.shares_held -= shares;
        Ok(Trade { side: TradeSide::Sell, shares, price: self.price, amount: proceeds, metrics: after })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A settled trade and the metrics it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub side:    TradeSide,
    pub shares:  u64,
    pub price:   f64,
    pub amount:  f64,
    pub metrics: Metrics,
}

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TradeRejection {
    #[error("share quantity must be positive")]
    ZeroShares,

    #[error("cost {cost:.2} exceeds cash {cash:.2}")]
    InsufficientCash { cost: f64, cash: f64 },

    #[error("requested {requested} shares but only {held} held")]
    InsufficientShares { requested: u64, held: u64 },

    #[error("trading is closed outside of play")]
    MarketClosed,
}
