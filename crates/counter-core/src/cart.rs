//! # Cart Builder
//!
//! In-memory accumulation of selected products and quantities, bounded by
//! each product's available stock.
//!
//! ## Cart Rules
//! ```text
//! add_item(product)            already in cart? quantity + 1, capped at the
//!                              stock bound (silent no-op at the cap);
//!                              otherwise a new line with quantity 1
//!
//! change_quantity(id, delta)   applied only when the result stays inside
//!                              [1, stock bound]; out-of-range deltas leave
//!                              the quantity unchanged (a delta can never
//!                              remove a line via zero)
//!
//! remove_item(id)              unconditional removal
//!
//! total()                      Σ quantity × unit price snapshot
//! ```
//!
//! The cart holds no references to the catalog: each line freezes the
//! product's code, name, unit price, and stock bound at the moment it was
//! added. Checkout re-validates stock at the store boundary, so a stale
//! bound can only make the cart stricter or surface as an insufficient
//! stock error there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart.
///
/// `unit_price_cents` is the price snapshot: if the catalog price changes
/// after the product was added, this line keeps the original price, and the
/// sale records it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID (UUID), the line's identity within the cart.
    pub product_id: String,

    /// Business code at time of adding (frozen).
    pub code: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Stock available when the product was added; the upper quantity bound.
    pub stock_bound: i64,

    /// Quantity in cart. Invariant: 1 <= quantity <= stock_bound.
    pub quantity: i64,

    /// When this line was added.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id.clone(),
            code: product.code.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            stock_bound: product.stock_quantity,
            quantity: 1,
            added_at: Utc::now(),
        }
    }

    /// Line total (unit price snapshot × quantity).
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id`
/// - Every quantity stays inside `[1, stock bound]`
/// - No side effects outside local state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of a product.
    ///
    /// If the product is already in the cart its quantity grows by 1, unless
    /// that would exceed the stock bound, in which case nothing changes.
    /// A product that is not yet in the cart enters with quantity 1; a
    /// product with no stock at all is skipped, since the permitted range
    /// `[1, stock]` is empty.
    ///
    /// The caller passes a freshly read product so the stock bound reflects
    /// the catalog's current count.
    pub fn add_item(&mut self, product: &Product) {
        if let Some(line) = self.line_mut(&product.id) {
            if line.quantity + 1 <= line.stock_bound {
                line.quantity += 1;
            }
            return;
        }

        if product.stock_quantity >= 1 {
            self.lines.push(CartLine::from_product(product));
        }
    }

    /// Applies a signed quantity delta to a line.
    ///
    /// The delta is applied only when the resulting quantity stays inside
    /// the closed range `[1, stock bound]`; any out-of-range result leaves
    /// the quantity unchanged. Removing a line is always explicit via
    /// [`Cart::remove_item`], never a side effect of a delta.
    pub fn change_quantity(&mut self, product_id: &str, delta: i64) {
        if let Some(line) = self.line_mut(product_id) {
            let next = line.quantity + delta;
            if (1..=line.stock_bound).contains(&next) {
                line.quantity = next;
            }
        }
    }

    /// Removes a line unconditionally. Unknown ids are ignored.
    pub fn remove_item(&mut self, product_id: &str) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Cart total in cents: Σ quantity × unit price snapshot.
    pub fn total_cents(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total_cents).sum()
    }

    /// Cart total as Money.
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents())
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Read access to the lines, in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up a line by product id.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
