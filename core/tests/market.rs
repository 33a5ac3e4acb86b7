use proptest::prelude::*;
use titan_core::{
    market::{StockMarket, TradeRejection, TradeSide, INITIAL_PRICE, MIN_PRICE},
    metrics::Metrics,
    rng::{RngBank, RngSlot, ScriptedRng},
};

#[test]
fn step_stays_within_volatility_band() {
    let mut market = StockMarket::default();
    let price = market.step(&mut ScriptedRng::constant(0.0));
    assert!((price - INITIAL_PRICE * 0.97).abs() < 1e-9);

    let mut market = StockMarket::default();
    let price = market.step(&mut ScriptedRng::constant(0.5));
    assert!((price - INITIAL_PRICE).abs() < 1e-9);
}

#[test]
fn price_is_floored() {
    let mut market = StockMarket::new(10.1);
    for _ in 0..50 {
        market.step(&mut ScriptedRng::constant(0.0));
    }
    assert_eq!(market.price, MIN_PRICE);
}

#[test]
fn buy_moves_cash_into_shares() {
    let market = StockMarket::new(100.0);
    let trade = market.buy(&Metrics::default(), 1_000).unwrap();
    assert_eq!(trade.side, TradeSide::Buy);
    assert_eq!(trade.amount, 100_000.0);
    assert_eq!(trade.metrics.cash, 2_500_000_000.0 - 100_000.0);
    assert_eq!(trade.metrics.shares_held, 1_000);
    // Valuation and the rest of the company are untouched.
    assert_eq!(trade.metrics.valuation, Metrics::default().valuation);
}

#[test]
fn buy_beyond_cash_is_rejected() {
    let market = StockMarket::new(100.0);
    let metrics = Metrics { cash: 5_000.0, ..Metrics::default() };
    assert_eq!(market.max_affordable(metrics.cash), 50);
    assert!(market.buy(&metrics, 50).is_ok());
    assert!(matches!(
        market.buy(&metrics, 51),
        Err(TradeRejection::InsufficientCash { .. })
    ));
}

#[test]
fn sell_beyond_holdings_is_rejected() {
    let market = StockMarket::new(100.0);
    let metrics = Metrics { shares_held: 10, ..Metrics::default() };
    assert_eq!(
        market.sell(&metrics, 11),
        Err(TradeRejection::InsufficientShares { requested: 11, held: 10 })
    );
    let trade = market.sell(&metrics, 10).unwrap();
    assert_eq!(trade.metrics.shares_held, 0);
    assert_eq!(trade.metrics.cash, metrics.cash + 1_000.0);
}

#[test]
fn zero_share_trades_are_rejected() {
    let market = StockMarket::default();
    assert_eq!(market.buy(&Metrics::default(), 0), Err(TradeRejection::ZeroShares));
    assert_eq!(market.sell(&Metrics::default(), 0), Err(TradeRejection::ZeroShares));
}

#[test]
fn negative_cash_affords_nothing() {
    assert_eq!(StockMarket::default().max_affordable(-1.0), 0);
}

proptest! {
    #[test]
    fn walk_never_drops_below_floor(seed in any::<u64>(), steps in 1usize..500) {
        let mut rng = RngBank::new(seed).stream(RngSlot::Market);
        let mut market = StockMarket::new(12.0);
        for _ in 0..steps {
            let before = market.price;
            let after = market.step(&mut rng);
            prop_assert!(after >= MIN_PRICE);
            prop_assert!(after <= before * 1.03 + 1e-9);
        }
    }
}
