//! The command sum type dispatched through the command-bus seam.
//!
//! Sagas issue these; the process wires a sender that routes each variant to
//! the matching service.

use crate::account::{CloseAccount, DepositFunds, OpenAccount, WithdrawFunds};
use crate::movement_type::RegisterMovementType;

/// Every command the wallet backend accepts.
#[derive(Debug, Clone)]
pub enum WalletCommand {
    OpenAccount(OpenAccount),
    DepositFunds(DepositFunds),
    WithdrawFunds(WithdrawFunds),
    CloseAccount(CloseAccount),
    RegisterMovementType(RegisterMovementType),
}
