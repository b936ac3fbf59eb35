//! Repository abstractions for data access.

pub mod customer;
pub mod debt;
pub mod pending_payment;
pub mod session;
pub mod site;
pub mod user;

pub use customer::CustomerRepository;
pub use debt::DebtRepository;
pub use pending_payment::PendingPaymentRepository;
pub use session::SessionRepository;
pub use site::SiteRepository;
pub use user::UserRepository;
