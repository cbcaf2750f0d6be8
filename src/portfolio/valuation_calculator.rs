use rust_decimal::Decimal;
use std::collections::HashMap;

use super::valuation_model::{
    AccountValuation, EnvelopeValuation, MonetaryValue, PositionValuation,
};
use crate::accounts::{AccountHoldings, Envelope};
use crate::constants::{DECIMAL_PRECISION, USD_CURRENCY};
use crate::market_data::SymbolQuote;
use crate::orders::{Order, OrderSide};

/// Running net-quantity / net-cost pair for one symbol. Accumulation is
/// commutative, so the order of the ledger does not matter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PositionAccumulator {
    pub currency: String,
    pub quantity: Decimal,
    pub total_cost: Decimal,
}

/// Groups one envelope's orders by normalized symbol and reduces each group
/// to its net quantity and net cost. Sells subtract from both sides, so the
/// running cost is a net accumulator, not a FIFO lot basis.
pub(crate) fn accumulate_positions(orders: &[Order]) -> HashMap<String, PositionAccumulator> {
    let mut groups: HashMap<String, PositionAccumulator> = HashMap::new();

    for order in orders {
        let symbol = order.symbol.trim().to_uppercase();
        let entry = groups.entry(symbol).or_insert_with(|| PositionAccumulator {
            currency: order.currency.clone(),
            quantity: Decimal::ZERO,
            total_cost: Decimal::ZERO,
        });

        let cost = order.quantity * order.price;
        match order.side {
            OrderSide::Buy => {
                entry.quantity += order.quantity;
                entry.total_cost += cost;
            }
            OrderSide::Sell => {
                entry.quantity -= order.quantity;
                entry.total_cost -= cost;
            }
        }
    }

    groups
}

fn fx_rate_for(currency: &str, usd_to_eur: Decimal) -> Decimal {
    if currency == USD_CURRENCY {
        usd_to_eur
    } else {
        Decimal::ONE
    }
}

fn build_position(
    symbol: String,
    accumulator: PositionAccumulator,
    quote: Option<&SymbolQuote>,
    usd_to_eur: Decimal,
) -> PositionValuation {
    let avg_price = accumulator.total_cost / accumulator.quantity;
    // Missing quote: substitute the average price so the position values at
    // cost and shows zero gain, without failing the rest of the envelope.
    let current_price = quote.map(|q| q.price).unwrap_or(avg_price);
    let current_value = current_price * accumulator.quantity;
    let diff_value = current_value - accumulator.total_cost;

    let diff_percent = if accumulator.total_cost.is_zero() {
        None
    } else {
        Some((diff_value / accumulator.total_cost * Decimal::ONE_HUNDRED).round_dp(DECIMAL_PRECISION))
    };

    let fx_rate = fx_rate_for(&accumulator.currency, usd_to_eur);

    let long_name = quote
        .and_then(|q| q.long_name.clone())
        .unwrap_or_else(|| symbol.clone());
    let short_name = quote
        .and_then(|q| q.short_name.clone())
        .unwrap_or_else(|| symbol.clone());

    PositionValuation {
        long_name,
        short_name,
        currency: accumulator.currency,
        quantity: accumulator.quantity,
        avg_price,
        current_price,
        cost_basis: MonetaryValue::new(accumulator.total_cost, fx_rate),
        market_value: MonetaryValue::new(current_value, fx_rate),
        diff_value: MonetaryValue::new(diff_value, fx_rate),
        diff_percent,
        fx_rate,
        symbol,
    }
}

/// Builds the valuation of one envelope from its cash balance and order
/// ledger. Totals are EUR; cash is already EUR.
pub fn build_envelope_valuation(
    envelope: &Envelope,
    orders: &[Order],
    quotes: &HashMap<String, SymbolQuote>,
    usd_to_eur: Decimal,
) -> EnvelopeValuation {
    let mut positions: Vec<PositionValuation> = accumulate_positions(orders)
        .into_iter()
        .filter(|(_, accumulator)| accumulator.quantity > Decimal::ZERO)
        .map(|(symbol, accumulator)| {
            let quote = quotes.get(&symbol);
            build_position(symbol, accumulator, quote, usd_to_eur)
        })
        .collect();
    positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let cash = envelope.cash;
    let total_value = cash
        + positions
            .iter()
            .map(|p| p.market_value.base)
            .sum::<Decimal>();
    let total_invested = positions.iter().map(|p| p.cost_basis.base).sum::<Decimal>();

    let diff_value = total_value - (total_invested + cash);
    let denominator = total_invested + cash;
    let diff_percent = if denominator.is_zero() {
        Decimal::ZERO
    } else {
        (diff_value / denominator * Decimal::ONE_HUNDRED).round_dp(DECIMAL_PRECISION)
    };

    EnvelopeValuation {
        account_type_id: envelope.account_type_id.clone(),
        name: envelope.type_name.clone(),
        cash,
        total_value,
        total_invested,
        diff_value,
        diff_percent,
        positions,
    }
}

/// Builds the valuation of one account by rolling up its envelopes.
pub fn build_account_valuation(
    holdings: &AccountHoldings,
    quotes: &HashMap<String, SymbolQuote>,
    usd_to_eur: Decimal,
) -> AccountValuation {
    let envelopes: Vec<EnvelopeValuation> = holdings
        .envelopes
        .iter()
        .map(|e| build_envelope_valuation(&e.envelope, &e.orders, quotes, usd_to_eur))
        .collect();

    let total_value = envelopes.iter().map(|e| e.total_value).sum();

    AccountValuation {
        id: holdings.account.id.clone(),
        name: holdings.account.name.clone(),
        total_value,
        envelopes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::Envelope;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn order(symbol: &str, side: OrderSide, quantity: Decimal, price: Decimal) -> Order {
        order_in(symbol, side, quantity, price, "EUR")
    }

    fn order_in(
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
        currency: &str,
    ) -> Order {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Order {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: "acc-1".to_string(),
            account_type_id: "pea".to_string(),
            symbol: symbol.to_string(),
            side,
            quantity,
            price,
            currency: currency.to_string(),
            order_date: date,
            created_at: date,
        }
    }

    fn envelope(cash: Decimal) -> Envelope {
        Envelope {
            account_id: "acc-1".to_string(),
            account_type_id: "pea".to_string(),
            type_name: "Plan d'Épargne en Actions (PEA)".to_string(),
            cash,
        }
    }

    fn quote(symbol: &str, price: Decimal) -> (String, SymbolQuote) {
        (
            symbol.to_string(),
            SymbolQuote {
                symbol: symbol.to_string(),
                long_name: Some(format!("{} Long", symbol)),
                short_name: Some(format!("{} Short", symbol)),
                price,
            },
        )
    }

    #[test]
    fn two_buys_average_out() {
        // buy 10 @ 100 then buy 5 @ 120 => qty 15, cost 1600, avg 106.67
        let orders = vec![
            order("X", OrderSide::Buy, dec!(10), dec!(100)),
            order("X", OrderSide::Buy, dec!(5), dec!(120)),
        ];
        let groups = accumulate_positions(&orders);
        let acc = groups.get("X").unwrap();

        assert_eq!(acc.quantity, dec!(15));
        assert_eq!(acc.total_cost, dec!(1600));
        assert_eq!(
            (acc.total_cost / acc.quantity).round_dp(2),
            dec!(106.67)
        );
    }

    #[test]
    fn accumulation_is_commutative() {
        let mut orders = vec![
            order("X", OrderSide::Buy, dec!(10), dec!(100)),
            order("X", OrderSide::Sell, dec!(4), dec!(150)),
            order("X", OrderSide::Buy, dec!(2), dec!(90)),
        ];
        let forward = accumulate_positions(&orders);
        orders.reverse();
        let backward = accumulate_positions(&orders);

        assert_eq!(forward.get("X"), backward.get("X"));
        assert_eq!(forward.get("X").unwrap().quantity, dec!(8));
    }

    #[test]
    fn symbols_group_case_insensitively() {
        let orders = vec![
            order(" aapl ", OrderSide::Buy, dec!(1), dec!(10)),
            order("AAPL", OrderSide::Buy, dec!(1), dec!(10)),
        ];
        let groups = accumulate_positions(&orders);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups.get("AAPL").unwrap().quantity, dec!(2));
    }

    #[test]
    fn fully_sold_position_is_excluded() {
        // buy 10 @ 100, sell 10 @ 150 => qty 0, excluded despite cost -500
        let orders = vec![
            order("X", OrderSide::Buy, dec!(10), dec!(100)),
            order("X", OrderSide::Sell, dec!(10), dec!(150)),
        ];
        let valuation =
            build_envelope_valuation(&envelope(dec!(0)), &orders, &HashMap::new(), dec!(0.93));

        assert!(valuation.positions.is_empty());
        assert_eq!(valuation.total_invested, dec!(0));
    }

    #[test]
    fn oversold_position_is_excluded() {
        let orders = vec![
            order("X", OrderSide::Buy, dec!(5), dec!(100)),
            order("X", OrderSide::Sell, dec!(8), dec!(100)),
        ];
        let valuation =
            build_envelope_valuation(&envelope(dec!(0)), &orders, &HashMap::new(), dec!(0.93));

        assert!(valuation.positions.is_empty());
    }

    #[test]
    fn avg_price_times_quantity_equals_cost() {
        let orders = vec![
            order("X", OrderSide::Buy, dec!(3), dec!(17.35)),
            order("X", OrderSide::Buy, dec!(7), dec!(19.10)),
            order("X", OrderSide::Sell, dec!(2), dec!(21.00)),
        ];
        let quotes: HashMap<_, _> = [quote("X", dec!(20))].into_iter().collect();
        let valuation =
            build_envelope_valuation(&envelope(dec!(0)), &orders, &quotes, dec!(0.93));
        let position = &valuation.positions[0];

        assert_eq!(
            (position.avg_price * position.quantity).round_dp(6),
            position.cost_basis.local.round_dp(6)
        );
    }

    #[test]
    fn envelope_total_is_cash_plus_position_values() {
        // cash 500, one position worth 1600 => 2100
        let orders = vec![order("X", OrderSide::Buy, dec!(10), dec!(100))];
        let quotes: HashMap<_, _> = [quote("X", dec!(160))].into_iter().collect();
        let valuation =
            build_envelope_valuation(&envelope(dec!(500)), &orders, &quotes, dec!(0.93));

        assert_eq!(valuation.positions[0].market_value.base, dec!(1600));
        assert_eq!(valuation.total_value, dec!(2100));
        assert_eq!(valuation.total_invested, dec!(1000));
        assert_eq!(valuation.diff_value, dec!(600));
        assert_eq!(valuation.diff_percent, dec!(40));
    }

    #[test]
    fn missing_quote_values_at_cost_with_zero_gain() {
        // quote gateway failed for Y (avg 50): price falls back to avg
        let orders = vec![order("Y", OrderSide::Buy, dec!(4), dec!(50))];
        let valuation =
            build_envelope_valuation(&envelope(dec!(0)), &orders, &HashMap::new(), dec!(0.93));
        let position = &valuation.positions[0];

        assert_eq!(position.current_price, dec!(50));
        assert_eq!(position.diff_value.local, dec!(0));
        assert_eq!(position.diff_percent, Some(dec!(0)));
        assert_eq!(position.long_name, "Y");
    }

    #[test]
    fn one_failed_quote_does_not_poison_the_others() {
        let orders = vec![
            order("X", OrderSide::Buy, dec!(10), dec!(100)),
            order("Y", OrderSide::Buy, dec!(4), dec!(50)),
        ];
        let quotes: HashMap<_, _> = [quote("X", dec!(120))].into_iter().collect();
        let valuation =
            build_envelope_valuation(&envelope(dec!(0)), &orders, &quotes, dec!(0.93));

        let x = valuation.positions.iter().find(|p| p.symbol == "X").unwrap();
        let y = valuation.positions.iter().find(|p| p.symbol == "Y").unwrap();

        assert_eq!(x.diff_value.local, dec!(200));
        assert_eq!(y.diff_value.local, dec!(0));
    }

    #[test]
    fn zero_cost_position_has_no_diff_percent() {
        // gift: buy 5 @ 100, sell 5 @ 100 leaves cost 0, then buy 5 more free-ish
        let orders = vec![
            order("X", OrderSide::Buy, dec!(10), dec!(100)),
            order("X", OrderSide::Sell, dec!(5), dec!(200)),
        ];
        // qty 5, cost 1000 - 1000 = 0
        let quotes: HashMap<_, _> = [quote("X", dec!(120))].into_iter().collect();
        let valuation =
            build_envelope_valuation(&envelope(dec!(0)), &orders, &quotes, dec!(0.93));
        let position = &valuation.positions[0];

        assert_eq!(position.cost_basis.local, dec!(0));
        assert_eq!(position.diff_percent, None);
        // envelope-level percent is defined as zero when nothing is invested
        assert_eq!(valuation.diff_percent, dec!(0));
    }

    #[test]
    fn usd_positions_convert_with_the_request_rate() {
        let orders = vec![order_in("MSFT", OrderSide::Buy, dec!(2), dec!(100), "USD")];
        let quotes: HashMap<_, _> = [quote("MSFT", dec!(150))].into_iter().collect();
        let valuation =
            build_envelope_valuation(&envelope(dec!(100)), &orders, &quotes, dec!(0.93));
        let position = &valuation.positions[0];

        assert_eq!(position.fx_rate, dec!(0.93));
        assert_eq!(position.market_value.local, dec!(300));
        assert_eq!(position.market_value.base, dec!(279.00));
        // totals are EUR: cash 100 + 279
        assert_eq!(valuation.total_value, dec!(379.00));
    }

    #[test]
    fn account_total_sums_envelopes() {
        let holdings = AccountHoldings {
            account: crate::accounts::Account {
                id: "acc-1".to_string(),
                name: "Boursorama".to_string(),
                ..Default::default()
            },
            envelopes: vec![
                crate::accounts::EnvelopeHoldings {
                    envelope: envelope(dec!(500)),
                    orders: vec![order("X", OrderSide::Buy, dec!(10), dec!(100))],
                },
                crate::accounts::EnvelopeHoldings {
                    envelope: Envelope {
                        account_type_id: "cto".to_string(),
                        ..envelope(dec!(50))
                    },
                    orders: vec![],
                },
            ],
        };
        let quotes: HashMap<_, _> = [quote("X", dec!(160))].into_iter().collect();
        let valuation = build_account_valuation(&holdings, &quotes, dec!(0.93));

        assert_eq!(valuation.envelopes.len(), 2);
        assert_eq!(valuation.total_value, dec!(2100) + dec!(50));
    }
}
