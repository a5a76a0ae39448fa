//! Request validation: the hard gate every placement and cancellation passes
//! before the store is touched.

use auctionbook_types::{constants, AuctionBookError, PlaceOrderRequest, Result};
use rust_decimal::Decimal;

/// Reject malformed requests.
///
/// # Errors
/// Returns `InvalidRequest` naming the first field that fails.
pub fn validate_request(request: &PlaceOrderRequest) -> Result<()> {
    if request.wallet.is_blank() {
        return Err(AuctionBookError::invalid("wallet is required"));
    }
    if request.mint.is_blank() {
        return Err(AuctionBookError::invalid("mint is required"));
    }
    if request.treasury_mint.is_blank() {
        return Err(AuctionBookError::invalid("treasury mint is required"));
    }
    if request.qty <= Decimal::ZERO {
        return Err(AuctionBookError::invalid(format!(
            "quantity must be positive, got {}",
            request.qty
        )));
    }
    if request.price < Decimal::ZERO {
        return Err(AuctionBookError::invalid(format!(
            "price must not be negative, got {}",
            request.price
        )));
    }
    check_precision("quantity", request.qty)?;
    check_precision("price", request.price)?;
    Ok(())
}

fn check_precision(field: &str, value: Decimal) -> Result<()> {
    let scale = value.normalize().scale();
    if scale > constants::PRICE_PRECISION {
        return Err(AuctionBookError::invalid(format!(
            "{field} {value} has {scale} decimal places, max {}",
            constants::PRICE_PRECISION
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use auctionbook_types::{Mint, Wallet};

    use super::*;

    fn ask(qty: Decimal, price: Decimal) -> PlaceOrderRequest {
        PlaceOrderRequest::ask(
            Wallet::new("seller"),
            Mint::new("nft"),
            Mint::native(),
            qty,
            price,
        )
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate_request(&ask(Decimal::ONE, Decimal::TEN)).is_ok());
    }

    #[test]
    fn zero_price_is_allowed() {
        assert!(validate_request(&ask(Decimal::ONE, Decimal::ZERO)).is_ok());
    }

    #[test]
    fn zero_quantity_rejected() {
        let err = validate_request(&ask(Decimal::ZERO, Decimal::TEN)).unwrap_err();
        assert!(matches!(err, AuctionBookError::InvalidRequest { .. }));
    }

    #[test]
    fn negative_price_rejected() {
        let err = validate_request(&ask(Decimal::ONE, Decimal::new(-1, 0))).unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn blank_fields_rejected() {
        let mut req = ask(Decimal::ONE, Decimal::ONE);
        req.wallet = Wallet::new("  ");
        assert!(validate_request(&req).is_err());

        let mut req = ask(Decimal::ONE, Decimal::ONE);
        req.mint = Mint::new("");
        assert!(validate_request(&req).is_err());

        let mut req = ask(Decimal::ONE, Decimal::ONE);
        req.treasury_mint = Mint::new("");
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn excess_precision_rejected() {
        // 10 decimal places
        let err = validate_request(&ask(Decimal::ONE, Decimal::new(1, 10))).unwrap_err();
        assert!(err.to_string().contains("decimal places"));
        // Trailing zeros do not count.
        assert!(validate_request(&ask(Decimal::new(10_000_000_000, 10), Decimal::ONE)).is_ok());
    }
}
