//! Shared fixtures for Orchard integration tests.
//!
//! Tests build a [`TestContext`] holding every service wired over one shared
//! in-memory store, with a [`RecordingMailer`] standing in for the SMTP
//! transport so email fan-out can be asserted (and failed on demand).

use std::sync::{Arc, Mutex, Once, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use orchard_commerce::db::{NewAddress, ProductRepository, UserRepository};
use orchard_commerce::services::email::{EmailError, Mailer};
use orchard_commerce::services::{
    Caller, CartService, CouponService, LiveChannel, NotificationDispatcher, OrderService,
    UserService,
};
use orchard_commerce::MemoryDb;
use orchard_core::{Email, Money, ProductId, Role};

static TRACING: Once = Once::new();

/// Install a test subscriber honoring `RUST_LOG`. Safe to call from every
/// test; only the first call wins.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// One email captured by the [`RecordingMailer`].
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// In-memory [`Mailer`] that records every message and can be switched to
/// refuse delivery.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
    failing: Mutex<bool>,
}

impl RecordingMailer {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Everything sent so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Toggle delivery failure for subsequent sends.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &Email, subject: &str, body: &str) -> Result<(), EmailError> {
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(EmailError::InvalidAddress(to.to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}

/// Every service wired over one shared store, plus pre-seeded identities.
pub struct TestContext {
    pub db: MemoryDb,
    pub mailer: Arc<RecordingMailer>,
    pub dispatcher: NotificationDispatcher,
    pub users: UserService,
    pub carts: CartService,
    pub orders: OrderService,
    pub coupons: CouponService,
    /// A registered customer with one address and one payment method.
    pub customer: Caller,
    /// A manager account for privileged operations.
    pub manager: Caller,
    /// A seeded catalog product priced 19.99.
    pub product_id: ProductId,
}

impl TestContext {
    /// Build a fully wired context with a customer, a manager, and one
    /// product.
    ///
    /// # Panics
    ///
    /// Panics if seeding fails; a fresh store cannot conflict.
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        let db = MemoryDb::new();
        let mailer = RecordingMailer::new();
        let dispatcher = NotificationDispatcher::new(
            db.clone(),
            LiveChannel::new(),
            Some(mailer.clone() as Arc<dyn Mailer>),
        );

        let users = UserService::new(db.clone(), dispatcher.clone());
        let carts = CartService::new(db.clone());
        let orders = OrderService::new(db.clone(), dispatcher.clone());
        let coupons = CouponService::new(db.clone());

        let customer_row = users.register("customer@example.com").expect("seed customer");
        let customer = Caller::new(customer_row.id, customer_row.role);
        let _ = users.add_address(
            customer,
            NewAddress {
                recipient: "Pat Customer".to_string(),
                line1: "1 Orchard Way".to_string(),
                city: "Springfield".to_string(),
                postal_code: "12345".to_string(),
                country: "US".to_string(),
            },
        );
        let _ = users.add_payment_method(customer, "visa", "4242");

        let manager_row = UserRepository::new(&db)
            .create(
                Email::parse("manager@example.com").expect("seed manager email"),
                Role::Manager,
                Utc::now(),
            )
            .expect("seed manager");
        let manager = Caller::new(manager_row.id, manager_row.role);

        let product = ProductRepository::new(&db).create("Ceramic Mug", Money::from_cents(1999));

        Self {
            db,
            mailer,
            dispatcher,
            users,
            carts,
            orders,
            coupons,
            customer,
            manager,
            product_id: product.id,
        }
    }

    /// Put `quantity` of the seeded product into the customer's cart,
    /// creating the cart if needed.
    ///
    /// # Panics
    ///
    /// Panics if the cart operations fail.
    pub fn fill_cart(&self, quantity: u32) {
        if self.carts.get_cart(self.customer).is_err() {
            let _ = self.carts.create_cart(self.customer).expect("create cart");
        }
        let _ = self
            .carts
            .add_item(self.customer, self.product_id, quantity)
            .expect("add item");
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
