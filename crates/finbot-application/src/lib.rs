pub mod finance_service;
pub mod session;

pub use finance_service::FinanceService;
pub use session::{PendingReply, SessionController};
