//! Checkout flow
//!
//! A linear three-step checkout: contact details, then a shipping address,
//! then review. Placing the order snapshots the cart into an
//! [`OrderConfirmation`], clears the cart through the same store handle and
//! hands back the confirmation for the order-success surface.

use std::fmt;

use thiserror::Error;

use crate::cart::{
    LineItem, Totals,
    store::{CartHandle, CartStoreError},
};

/// Route the storefront navigates to after a placed order.
pub const ORDER_SUCCESS_ROUTE: &str = "/order-success";

/// Errors raised while moving through checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The attempted action does not belong to the current step.
    #[error("This action is not available at the {0} step")]
    WrongStep(CheckoutStep),

    /// A required field was blank after trimming.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The email address failed the shape check.
    #[error("Email address looks invalid: {0}")]
    InvalidEmail(String),

    /// Orders need at least one line item.
    #[error("Cannot place an order with an empty cart")]
    EmptyCart,

    /// The cart store refused the read or the clear.
    #[error(transparent)]
    Store(#[from] CartStoreError),
}

/// The step the checkout flow is currently on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Collecting the customer's name and email.
    #[default]
    Contact,

    /// Collecting the delivery address.
    Shipping,

    /// Reviewing the order before placing it.
    Review,
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckoutStep::Contact => "contact",
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Review => "review",
        };

        f.write_str(label)
    }
}

/// Validated customer contact details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    full_name: String,
    email: String,
}

impl ContactDetails {
    /// Validate and trim contact details.
    ///
    /// # Errors
    ///
    /// Fails when either field is blank, or when the email does not look
    /// like `user@domain.tld`.
    pub fn new(full_name: &str, email: &str) -> Result<Self, CheckoutError> {
        Ok(ContactDetails {
            full_name: require_field("Full name", full_name)?,
            email: validate_email(require_field("Email", email)?)?,
        })
    }

    /// The customer's full name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The customer's email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Validated delivery address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    address: String,
    city: String,
    country: String,
}

impl ShippingAddress {
    /// Validate and trim a delivery address.
    ///
    /// # Errors
    ///
    /// Fails when any field is blank after trimming.
    pub fn new(address: &str, city: &str, country: &str) -> Result<Self, CheckoutError> {
        Ok(ShippingAddress {
            address: require_field("Address", address)?,
            city: require_field("City", city)?,
            country: require_field("Country", country)?,
        })
    }

    /// Street address line.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// City or town.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Destination country.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }
}

fn require_field(label: &'static str, value: &str) -> Result<String, CheckoutError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(CheckoutError::MissingField(label));
    }

    Ok(trimmed.to_string())
}

// A shape check, not an RFC parser: one user part, one domain with a dot.
fn validate_email(value: String) -> Result<String, CheckoutError> {
    let valid = value.split_once('@').is_some_and(|(user, domain)| {
        !user.is_empty()
            && !domain.contains('@')
            && domain
                .rsplit_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
    });

    if valid {
        Ok(value)
    } else {
        Err(CheckoutError::InvalidEmail(value))
    }
}

/// Snapshot of a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    contact: ContactDetails,
    shipping: ShippingAddress,
    lines: Vec<LineItem>,
    totals: Totals,
}

impl OrderConfirmation {
    /// Who placed the order.
    #[must_use]
    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    /// Where the order ships to.
    #[must_use]
    pub fn shipping(&self) -> &ShippingAddress {
        &self.shipping
    }

    /// The ordered line items, as they were at submission time.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Item count and subtotal at submission time.
    #[must_use]
    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Route the storefront should navigate to next.
    #[must_use]
    pub fn redirect_to(&self) -> &'static str {
        ORDER_SUCCESS_ROUTE
    }
}

/// The checkout state machine.
///
/// Steps advance only through validated submissions, so reaching the review
/// step guarantees both detail sets are present.
#[derive(Debug, Default)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    contact: Option<ContactDetails>,
    shipping: Option<ShippingAddress>,
}

impl CheckoutFlow {
    /// Start a fresh checkout at the contact step.
    #[must_use]
    pub fn new() -> Self {
        CheckoutFlow::default()
    }

    /// The current step.
    #[must_use]
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Contact details collected so far.
    #[must_use]
    pub fn contact(&self) -> Option<&ContactDetails> {
        self.contact.as_ref()
    }

    /// Shipping address collected so far.
    #[must_use]
    pub fn shipping(&self) -> Option<&ShippingAddress> {
        self.shipping.as_ref()
    }

    /// Submit contact details and advance to the shipping step.
    ///
    /// # Errors
    ///
    /// Fails when the flow is not at the contact step.
    pub fn submit_contact(&mut self, details: ContactDetails) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::Contact {
            return Err(CheckoutError::WrongStep(self.step));
        }

        self.contact = Some(details);
        self.step = CheckoutStep::Shipping;

        Ok(())
    }

    /// Submit the delivery address and advance to the review step.
    ///
    /// # Errors
    ///
    /// Fails when the flow is not at the shipping step.
    pub fn submit_shipping(&mut self, address: ShippingAddress) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::Shipping {
            return Err(CheckoutError::WrongStep(self.step));
        }

        self.shipping = Some(address);
        self.step = CheckoutStep::Review;

        Ok(())
    }

    /// Step backward, keeping anything already entered. A no-op at the
    /// contact step.
    pub fn back(&mut self) {
        self.step = match self.step {
            CheckoutStep::Contact | CheckoutStep::Shipping => CheckoutStep::Contact,
            CheckoutStep::Review => CheckoutStep::Shipping,
        };
    }

    /// Place the order from the review step.
    ///
    /// Snapshots the cart's lines and totals into an [`OrderConfirmation`],
    /// clears the cart through `handle` and resets the flow for the next
    /// checkout. The flow is left untouched when placing fails.
    ///
    /// # Errors
    ///
    /// Fails when the flow is not at the review step, when the cart is
    /// empty, or when the cart store refuses access.
    pub fn place_order(&mut self, handle: &CartHandle) -> Result<OrderConfirmation, CheckoutError> {
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::WrongStep(self.step));
        }

        let (Some(contact), Some(shipping)) = (self.contact.as_ref(), self.shipping.as_ref())
        else {
            return Err(CheckoutError::WrongStep(self.step));
        };

        let (lines, totals) = handle.read(|cart| (cart.items().to_vec(), cart.totals()))?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let confirmation = OrderConfirmation {
            contact: contact.clone(),
            shipping: shipping.clone(),
            lines,
            totals,
        };

        handle.clear()?;

        *self = CheckoutFlow::new();

        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::{
        cart::store::CartStore,
        products::{Product, ProductId},
        storage::MemoryStorage,
    };

    use super::*;

    fn product(id: u64, price: i64, sale_price: Option<i64>) -> Product {
        Product {
            id: ProductId(id),
            slug: format!("product-{id}"),
            title: format!("Product {id}"),
            price,
            sale_price,
            category: "tops".to_string(),
            thumb_url: format!("/images/{id}.jpg"),
            condition: "Gently used".to_string(),
            age_range: "3-5".to_string(),
            material: "Cotton".to_string(),
            stock: 5,
            size: "4T".to_string(),
            images: smallvec![],
        }
    }

    fn contact() -> Result<ContactDetails, CheckoutError> {
        ContactDetails::new("Wanjiku Kamau", "wanjiku@example.com")
    }

    fn shipping() -> Result<ShippingAddress, CheckoutError> {
        ShippingAddress::new("14 Riverside Drive", "Nairobi", "Kenya")
    }

    #[test]
    fn contact_details_are_trimmed() -> TestResult {
        let details = ContactDetails::new("  Wanjiku Kamau ", " wanjiku@example.com  ")?;

        assert_eq!(details.full_name(), "Wanjiku Kamau");
        assert_eq!(details.email(), "wanjiku@example.com");

        Ok(())
    }

    #[test]
    fn blank_contact_fields_are_rejected() {
        assert!(matches!(
            ContactDetails::new("   ", "wanjiku@example.com"),
            Err(CheckoutError::MissingField("Full name"))
        ));
        assert!(matches!(
            ContactDetails::new("Wanjiku Kamau", ""),
            Err(CheckoutError::MissingField("Email"))
        ));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in [
            "plainaddress",
            "user@nodot",
            "@missing-user.com",
            "user@.com",
            "user@host.",
            "user@@double.com",
        ] {
            assert!(
                matches!(
                    ContactDetails::new("Wanjiku Kamau", email),
                    Err(CheckoutError::InvalidEmail(_))
                ),
                "expected {email:?} to be rejected"
            );
        }
    }

    #[test]
    fn subdomained_emails_are_accepted() -> TestResult {
        let details = ContactDetails::new("Wanjiku Kamau", "wanjiku@mail.example.co.ke")?;

        assert_eq!(details.email(), "wanjiku@mail.example.co.ke");

        Ok(())
    }

    #[test]
    fn blank_address_fields_are_rejected() {
        assert!(matches!(
            ShippingAddress::new("", "Nairobi", "Kenya"),
            Err(CheckoutError::MissingField("Address"))
        ));
        assert!(matches!(
            ShippingAddress::new("14 Riverside Drive", "  ", "Kenya"),
            Err(CheckoutError::MissingField("City"))
        ));
        assert!(matches!(
            ShippingAddress::new("14 Riverside Drive", "Nairobi", "\t"),
            Err(CheckoutError::MissingField("Country"))
        ));
    }

    #[test]
    fn submissions_advance_the_steps_in_order() -> TestResult {
        let mut flow = CheckoutFlow::new();

        assert_eq!(flow.step(), CheckoutStep::Contact);

        flow.submit_contact(contact()?)?;

        assert_eq!(flow.step(), CheckoutStep::Shipping);

        flow.submit_shipping(shipping()?)?;

        assert_eq!(flow.step(), CheckoutStep::Review);

        Ok(())
    }

    #[test]
    fn wrong_step_submissions_are_rejected() -> TestResult {
        let mut flow = CheckoutFlow::new();

        assert!(matches!(
            flow.submit_shipping(shipping()?),
            Err(CheckoutError::WrongStep(CheckoutStep::Contact))
        ));

        flow.submit_contact(contact()?)?;

        assert!(matches!(
            flow.submit_contact(contact()?),
            Err(CheckoutError::WrongStep(CheckoutStep::Shipping))
        ));

        Ok(())
    }

    #[test]
    fn back_steps_toward_contact_and_stops_there() -> TestResult {
        let mut flow = CheckoutFlow::new();

        flow.submit_contact(contact()?)?;
        flow.submit_shipping(shipping()?)?;

        flow.back();
        assert_eq!(flow.step(), CheckoutStep::Shipping);

        flow.back();
        assert_eq!(flow.step(), CheckoutStep::Contact);

        flow.back();
        assert_eq!(flow.step(), CheckoutStep::Contact);

        // Earlier entries survive stepping back.
        assert!(flow.contact().is_some());
        assert!(flow.shipping().is_some());

        Ok(())
    }

    #[test]
    fn placing_an_order_snapshots_and_clears_the_cart() -> TestResult {
        let store = CartStore::restore(MemoryStorage::new());
        let handle = store.handle();

        handle.add_item(product(1, 45_000, None), 2)?;
        handle.add_item(product(2, 120_000, Some(90_000)), 1)?;

        let mut flow = CheckoutFlow::new();
        flow.submit_contact(contact()?)?;
        flow.submit_shipping(shipping()?)?;

        let confirmation = flow.place_order(&handle)?;

        assert_eq!(confirmation.lines().len(), 2);
        assert_eq!(confirmation.totals().count, 3);
        assert_eq!(confirmation.totals().subtotal, 2 * 45_000 + 90_000);
        assert_eq!(confirmation.contact().full_name(), "Wanjiku Kamau");
        assert_eq!(confirmation.shipping().city(), "Nairobi");
        assert_eq!(confirmation.redirect_to(), "/order-success");

        assert!(handle.is_empty()?);
        assert_eq!(flow.step(), CheckoutStep::Contact);
        assert!(flow.contact().is_none());

        Ok(())
    }

    #[test]
    fn orders_cannot_be_placed_early() -> TestResult {
        let store = CartStore::restore(MemoryStorage::new());
        let handle = store.handle();

        handle.add_item(product(1, 45_000, None), 1)?;

        let mut flow = CheckoutFlow::new();

        assert!(matches!(
            flow.place_order(&handle),
            Err(CheckoutError::WrongStep(CheckoutStep::Contact))
        ));
        assert_eq!(handle.totals()?.count, 1);

        Ok(())
    }

    #[test]
    fn empty_carts_cannot_be_ordered() -> TestResult {
        let store = CartStore::restore(MemoryStorage::new());
        let handle = store.handle();

        let mut flow = CheckoutFlow::new();
        flow.submit_contact(contact()?)?;
        flow.submit_shipping(shipping()?)?;

        assert!(matches!(
            flow.place_order(&handle),
            Err(CheckoutError::EmptyCart)
        ));

        // A failed order leaves the flow where it was.
        assert_eq!(flow.step(), CheckoutStep::Review);

        Ok(())
    }

    #[test]
    fn a_detached_store_fails_the_order_and_keeps_the_flow() -> TestResult {
        let store = CartStore::restore(MemoryStorage::new());
        let handle = store.handle();

        handle.add_item(product(1, 45_000, None), 1)?;

        let mut flow = CheckoutFlow::new();
        flow.submit_contact(contact()?)?;
        flow.submit_shipping(shipping()?)?;

        drop(store);

        assert!(matches!(
            flow.place_order(&handle),
            Err(CheckoutError::Store(CartStoreError::Detached))
        ));
        assert_eq!(flow.step(), CheckoutStep::Review);

        Ok(())
    }
}
