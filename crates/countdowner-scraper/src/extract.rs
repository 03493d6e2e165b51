//! Product detail page extraction.
//!
//! Pages are queried by structural role (title block, price markers, etc.).
//! A missing role never fails extraction: the matching field is simply left
//! absent, and a page that is not recognisable as a product page at all
//! yields a record carrying only the requested stock code.

use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime, SubsecRound};
use countdowner_core::ProductRecord;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::price::{discount_percentage, parse_labelled_price};

/// Structural roles on a product detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Hidden `stockcode` input present on every real product page.
    StockCodeInput,
    Title,
    Description,
    Size,
    SpecialPrice,
    WasPrice,
    ClubPrice,
    NonClubPrice,
    Price,
    UnitPrice,
}

impl Role {
    /// Declaration order, so `Role as usize` indexes into this array.
    const ALL: [Role; 10] = [
        Role::StockCodeInput,
        Role::Title,
        Role::Description,
        Role::Size,
        Role::SpecialPrice,
        Role::WasPrice,
        Role::ClubPrice,
        Role::NonClubPrice,
        Role::Price,
        Role::UnitPrice,
    ];

    fn css(self) -> &'static str {
        match self {
            Role::StockCodeInput => "input#stockcode",
            Role::Title => "div.product-title h1",
            Role::Description => "p.product-description-text",
            Role::Size => "span.volume-size",
            Role::SpecialPrice => "span.special-price",
            Role::WasPrice => "span.was-price",
            Role::ClubPrice => "span.club-price-wrapper",
            Role::NonClubPrice => "span.grid-non-club-price",
            Role::Price => "span.price",
            Role::UnitPrice => "div.cup-price",
        }
    }
}

/// Selectors indexed by `Role as usize`.
static SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    Role::ALL
        .iter()
        .map(|role| Selector::parse(role.css()).expect("valid role selector"))
        .collect()
});

const WAS_LABEL: &str = "was";
const NON_CLUB_LABEL: &str = "non club price";

/// A parsed product detail page.
struct ProductPage {
    doc: Html,
}

impl ProductPage {
    fn parse(markup: &str) -> Self {
        Self {
            doc: Html::parse_document(markup),
        }
    }

    fn first(&self, role: Role) -> Option<ElementRef<'_>> {
        let selector = SELECTORS.get(role as usize)?;
        self.doc.select(selector).next()
    }

    /// Full text of the first element in `role`, whitespace-collapsed.
    /// Empty text counts as absent.
    fn text(&self, role: Role) -> Option<String> {
        let element = self.first(role)?;
        let text = element.text().collect::<Vec<_>>().join(" ");
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!collapsed.is_empty()).then_some(collapsed)
    }

    /// First non-blank text node inside the first element in `role`.
    fn leading_text(&self, role: Role) -> Option<&str> {
        self.first(role)?
            .text()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    fn price(&self, role: Role, label: &str) -> Option<Decimal> {
        let raw = self.leading_text(role)?;
        match parse_labelled_price(raw, label) {
            Ok(price) => Some(price),
            Err(err) => {
                tracing::debug!(role = ?role, error = %err, "ignoring unreadable price");
                None
            }
        }
    }

    /// A page with none of these anchors is an error or interstitial page.
    fn is_product_page(&self) -> bool {
        [
            Role::StockCodeInput,
            Role::Title,
            Role::SpecialPrice,
            Role::ClubPrice,
            Role::Price,
        ]
        .into_iter()
        .any(|role| self.first(role).is_some())
    }
}

/// Prices as read off the page, before the sale invariants are applied.
#[derive(Debug, Default, PartialEq)]
struct ObservedPrices {
    regular: Option<Decimal>,
    sale: Option<Decimal>,
}

/// Sale detection, first marker present wins: special price, then club
/// price, then plain price.
fn observe_prices(page: &ProductPage) -> ObservedPrices {
    if page.first(Role::SpecialPrice).is_some() {
        ObservedPrices {
            sale: page.price(Role::SpecialPrice, ""),
            regular: page.price(Role::WasPrice, WAS_LABEL),
        }
    } else if page.first(Role::ClubPrice).is_some() {
        ObservedPrices {
            sale: page.price(Role::ClubPrice, ""),
            regular: page.price(Role::NonClubPrice, NON_CLUB_LABEL),
        }
    } else {
        ObservedPrices {
            sale: None,
            regular: page.price(Role::Price, ""),
        }
    }
}

/// Resolves observed prices to `(regular_price, sale_price, discount_percentage)`.
///
/// `regular_price` only ever comes from the regular or was-price marker. A
/// sale price is kept only when a non-zero regular price pairs with it, so
/// `sale_price` and `discount_percentage` are always both present or both
/// absent; an unpaired sale price is dropped.
fn resolve_prices(observed: ObservedPrices) -> (Option<Decimal>, Option<Decimal>, Option<f64>) {
    let Some(sale) = observed.sale else {
        return (observed.regular, None, None);
    };
    match observed
        .regular
        .and_then(|regular| discount_percentage(sale, regular))
    {
        Some(discount) => (observed.regular, Some(sale), Some(discount)),
        None => {
            tracing::debug!(
                sale = %sale,
                regular = ?observed.regular,
                "sale price has no usable regular price; dropping sale"
            );
            (observed.regular, None, None)
        }
    }
}

/// Current local wall-clock time, truncated to whole seconds.
fn now_local() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

/// Extracts a [`ProductRecord`] from one product detail page, stamping
/// `observed_at` with the current local time.
///
/// Never fails: unrecognised markup yields a record with only `stock_code`
/// set to `requested_stock_code`.
#[must_use]
pub fn extract(markup: &str, requested_stock_code: &str) -> ProductRecord {
    extract_at(markup, requested_stock_code, now_local())
}

/// Like [`extract`], with an explicit `observed_at`.
#[must_use]
pub fn extract_at(
    markup: &str,
    requested_stock_code: &str,
    observed_at: NaiveDateTime,
) -> ProductRecord {
    let mut record = ProductRecord::bare(requested_stock_code, observed_at);
    let page = ProductPage::parse(markup);

    if !page.is_product_page() {
        tracing::debug!(
            stock_code = requested_stock_code,
            "page has no product anchors; recording stock code only"
        );
        return record;
    }

    record.name = page.text(Role::Title);
    record.description = page.text(Role::Description);
    record.size = page.text(Role::Size);
    record.unit_price = page.text(Role::UnitPrice);

    let (regular, sale, discount) = resolve_prices(observe_prices(&page));
    record.regular_price = regular;
    record.sale_price = sale;
    record.discount_percentage = discount;

    record
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
